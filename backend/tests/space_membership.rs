//! End-to-end invite lifecycle and leave-space scenarios.

mod support;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use support::{email, http_state, token};

async fn spawn() -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(http_state()))
            .configure(backend::inbound::http::configure),
    )
    .await
}

async fn get<S>(app: &S, user: &str, uri: &str) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token(user))))
        .to_request();
    test::call_service(app, req).await
}

async fn post<S>(app: &S, user: &str, uri: &str, body: Option<Value>) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut req = test::TestRequest::post()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token(user))));
    if let Some(body) = body {
        req = req.set_json(body);
    }
    test::call_service(app, req.to_request()).await
}

async fn json_of(res: ServiceResponse) -> Value {
    test::read_body_json(res).await
}

async fn register<S>(app: &S, user: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    json_of(get(app, user, "/users/me").await).await["id"]
        .as_i64()
        .expect("user id")
}

async fn create_space<S>(app: &S, owner: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    json_of(
        post(app, owner, "/spaces", Some(json!({ "name": "release council" }))).await,
    )
    .await["id"]
        .as_i64()
        .expect("space id")
}

#[actix_web::test]
async fn requests_without_credentials_are_unauthorized() {
    let app = spawn().await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/spaces").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn first_sight_registers_with_claims_derived_name() {
    let app = spawn().await;
    let me = json_of(get(&app, "a", "/users/me").await).await;
    assert_eq!(me["name"], "A");
    assert_eq!(me["email"], "a@example.com");

    // The same token resolves to the same row, not a duplicate.
    let again = json_of(get(&app, "a", "/users/me").await).await;
    assert_eq!(me["id"], again["id"]);
}

#[actix_web::test]
async fn space_creation_makes_the_owner_an_approved_member() {
    let app = spawn().await;
    register(&app, "a").await;
    let space = create_space(&app, "a").await;

    let spaces = json_of(get(&app, "a", "/spaces").await).await;
    assert_eq!(spaces[0]["id"].as_i64(), Some(space));
    assert_eq!(spaces[0]["memberCount"], 1);

    let members = json_of(get(&app, "a", &format!("/spaces/{space}/members")).await).await;
    assert_eq!(members.as_array().expect("member array").len(), 1);
    assert_eq!(members[0]["role"], "creator");
}

#[actix_web::test]
async fn invite_lifecycle_rearms_rejected_rows_without_duplicates() {
    let app = spawn().await;
    register(&app, "a").await;
    register(&app, "b").await;
    let space = create_space(&app, "a").await;

    // Unknown address: nothing to invite.
    let res = post(
        &app,
        "a",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": "nobody@example.com" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = post(
        &app,
        "a",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": email("b") })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Inviting again while pending conflicts.
    let res = post(
        &app,
        "a",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": email("b") })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // B declines; a re-invite re-arms the same row.
    let invites = json_of(get(&app, "b", "/invites").await).await;
    let first_invite = invites[0]["id"].as_i64().expect("invite id");
    let res = post(&app, "b", &format!("/invites/{first_invite}/reject"), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    // Declining twice conflicts.
    let res = post(&app, "b", &format!("/invites/{first_invite}/reject"), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = post(
        &app,
        "a",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": email("b") })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let invites = json_of(get(&app, "b", "/invites").await).await;
    let rearmed = invites.as_array().expect("invite array");
    assert_eq!(rearmed.len(), 1, "re-invite must reuse the membership row");
    assert_eq!(rearmed[0]["id"].as_i64(), Some(first_invite));
    assert_eq!(rearmed[0]["status"], "PENDING");

    // Accepting joins the space; inviting a member conflicts.
    post(&app, "b", &format!("/invites/{first_invite}/accept"), None).await;
    let res = post(
        &app,
        "a",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": email("b") })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let space_view = json_of(get(&app, "a", &format!("/spaces/{space}")).await).await;
    assert_eq!(space_view["memberCount"], 2);
}

#[actix_web::test]
async fn only_members_can_invite() {
    let app = spawn().await;
    register(&app, "a").await;
    register(&app, "b").await;
    register(&app, "c").await;
    let space = create_space(&app, "a").await;

    let res = post(
        &app,
        "b",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": email("c") })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn someone_elses_invite_is_invisible() {
    let app = spawn().await;
    register(&app, "a").await;
    register(&app, "b").await;
    register(&app, "c").await;
    let space = create_space(&app, "a").await;

    post(
        &app,
        "a",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": email("b") })),
    )
    .await;
    let invites = json_of(get(&app, "b", "/invites").await).await;
    let invite_id = invites[0]["id"].as_i64().expect("invite id");

    // C cannot accept B's invite.
    let res = post(&app, "c", &format!("/invites/{invite_id}/accept"), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn owners_can_never_leave_even_without_open_reviews() {
    let app = spawn().await;
    register(&app, "a").await;
    register(&app, "b").await;
    let space = create_space(&app, "a").await;

    post(
        &app,
        "a",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": email("b") })),
    )
    .await;
    let invites = json_of(get(&app, "b", "/invites").await).await;
    let invite_id = invites[0]["id"].as_i64().expect("invite id");
    post(&app, "b", &format!("/invites/{invite_id}/accept"), None).await;

    // The owner holds a commitment in review: blocked for that reason too.
    let b = json_of(get(&app, "b", "/users/me").await).await["id"]
        .as_i64()
        .expect("user id");
    let record = json_of(
        post(
            &app,
            "a",
            &format!("/spaces/{space}/commitments"),
            Some(json!({ "title": "ship", "approverIds": [b] })),
        )
        .await,
    )
    .await;
    let commitment = record["id"].as_i64().expect("commitment id");
    post(&app, "a", &format!("/commitments/{commitment}/review"), None).await;

    let res = post(&app, "a", &format!("/spaces/{space}/leave"), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Round completes; the owner is still barred from leaving.
    post(&app, "a", &format!("/commitments/{commitment}/approve"), None).await;
    post(&app, "b", &format!("/commitments/{commitment}/approve"), None).await;
    let res = post(&app, "a", &format!("/spaces/{space}/leave"), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn members_with_open_reviews_must_see_them_through() {
    let app = spawn().await;
    register(&app, "a").await;
    register(&app, "b").await;
    let space = create_space(&app, "a").await;

    post(
        &app,
        "a",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": email("b") })),
    )
    .await;
    let invites = json_of(get(&app, "b", "/invites").await).await;
    let invite_id = invites[0]["id"].as_i64().expect("invite id");
    post(&app, "b", &format!("/invites/{invite_id}/accept"), None).await;

    let a = json_of(get(&app, "a", "/users/me").await).await["id"]
        .as_i64()
        .expect("user id");
    let record = json_of(
        post(
            &app,
            "b",
            &format!("/spaces/{space}/commitments"),
            Some(json!({ "title": "b's commitment", "approverIds": [a] })),
        )
        .await,
    )
    .await;
    let commitment = record["id"].as_i64().expect("commitment id");
    post(&app, "b", &format!("/commitments/{commitment}/review"), None).await;

    let res = post(&app, "b", &format!("/spaces/{space}/leave"), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // A rejection sends it back to draft; leaving is possible again.
    post(&app, "a", &format!("/commitments/{commitment}/reject"), None).await;
    let res = post(&app, "b", &format!("/spaces/{space}/leave"), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    // Gone means gone: the space is forbidden now.
    let res = get(&app, "b", &format!("/spaces/{space}/members")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // And leaving twice reports the missing membership.
    let res = post(&app, "b", &format!("/spaces/{space}/leave"), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn member_search_filters_by_name_and_email() {
    let app = spawn().await;
    register(&app, "ada").await;
    register(&app, "grace").await;
    let space = create_space(&app, "ada").await;

    post(
        &app,
        "ada",
        &format!("/spaces/{space}/invite"),
        Some(json!({ "email": email("grace") })),
    )
    .await;
    let invites = json_of(get(&app, "grace", "/invites").await).await;
    let invite_id = invites[0]["id"].as_i64().expect("invite id");
    post(&app, "grace", &format!("/invites/{invite_id}/accept"), None).await;

    let all = json_of(get(&app, "ada", &format!("/spaces/{space}/members/search")).await).await;
    assert_eq!(all.as_array().expect("member array").len(), 2);

    let hits =
        json_of(get(&app, "ada", &format!("/spaces/{space}/members/search?q=grace")).await).await;
    let hits = hits.as_array().expect("member array");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["email"], "grace@example.com");
}
