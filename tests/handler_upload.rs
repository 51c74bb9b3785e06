mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use sqlx::PgPool;
use marketplace::domain::entities::Role;

fn image_form(bytes: &'static [u8], mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes).file_name("logo.png").mime_type(mime),
    )
}

#[sqlx::test]
async fn test_admin_upload_returns_url(pool: PgPool) {
    let admin_id = common::seed_admin(&pool, "root@example.com", true).await;
    let state = common::create_test_state(pool);
    let token = common::token_for(&state, Role::Admin, admin_id).await;
    let dir = state.upload_service.dir().clone();
    let server = common::test_server(state);

    let response = server
        .post("/api/admin/uploads")
        .authorization_bearer(&token)
        .multipart(image_form(b"\x89PNG\r\n\x1a\n", "image/png"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let url = response.json::<serde_json::Value>()["url"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    let name = url.trim_start_matches("/uploads/");
    assert!(dir.join(name).exists());
}

#[sqlx::test]
async fn test_upload_rejects_unknown_type(pool: PgPool) {
    let module_id = common::seed_module(&pool, "Grocery").await;
    let vendor_id = common::seed_vendor(&pool, module_id, "shop@example.com").await;
    let state = common::create_test_state(pool);
    let token = common::token_for(&state, Role::Vendor, vendor_id).await;
    let server = common::test_server(state);

    server
        .post("/api/vendor/uploads")
        .authorization_bearer(&token)
        .multipart(image_form(b"plain text", "text/plain"))
        .await
        .assert_status_bad_request();
}

#[sqlx::test]
async fn test_upload_rejects_content_not_matching_type(pool: PgPool) {
    let module_id = common::seed_module(&pool, "Grocery").await;
    let vendor_id = common::seed_vendor(&pool, module_id, "shop@example.com").await;
    let state = common::create_test_state(pool);
    let token = common::token_for(&state, Role::Vendor, vendor_id).await;
    let server = common::test_server(state);

    let response = server
        .post("/api/vendor/uploads")
        .authorization_bearer(&token)
        .multipart(image_form(b"<svg onload=alert(1)>", "image/png"))
        .await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["details"]["declared"],
        "image/png"
    );
}

#[sqlx::test]
async fn test_upload_requires_back_office_role(pool: PgPool) {
    let user_id = common::seed_user(&pool, "+919876543210").await;
    let state = common::create_test_state(pool);
    let token = common::token_for(&state, Role::User, user_id).await;
    let server = common::test_server(state);

    server
        .post("/api/admin/uploads")
        .authorization_bearer(&token)
        .multipart(image_form(b"\x89PNG\r\n\x1a\n", "image/png"))
        .await
        .assert_status_forbidden();
}
