//! Backend entry point: wires REST endpoints, health probes, and OpenAPI
//! docs.

use actix_web::{App, HttpServer, web};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use backend::ApiDoc;
use backend::Trace;
use backend::inbound::http;
use backend::inbound::http::health::{self, HealthState};
use backend::server::{self, AppConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let state = server::bootstrap(&config)
        .await
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();
    let state_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        #[cfg_attr(not(debug_assertions), expect(unused_mut, reason = "Swagger UI is debug-only"))]
        let mut app = App::new()
            .app_data(server_health_state.clone())
            .app_data(state_data.clone())
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(http::configure))
            .service(health::ready)
            .service(health::live);

        #[cfg(debug_assertions)]
        {
            app = app
                .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
        }

        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
