//! Bearer-token caller extraction.
//!
//! Every authenticated handler takes a [`Caller`]: the extractor reads the
//! `Authorization` header, hands the token to the identity port, and yields
//! the resolved user. Handlers never see raw credentials.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, User, UserId};

use super::state::HttpState;

/// The authenticated caller of the current request.
#[derive(Debug, Clone)]
pub struct Caller(pub User);

impl Caller {
    /// The caller's internal id, threaded into every domain operation.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    if token.is_empty() {
        return Err(Error::unauthorized("missing bearer token"));
    }
    Ok(token.to_owned())
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("http state not configured"))?;
            let user = state.identity.resolve_bearer(&token?).await?;
            Ok(Self(user))
        })
    }
}
