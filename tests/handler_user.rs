mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use sqlx::PgPool;
use marketplace::domain::entities::Role;

async fn user_server(pool: PgPool) -> (TestServer, String, i64) {
    let user_id = common::seed_user(&pool, "+919876543210").await;
    let state = common::create_test_state(pool);
    let token = common::token_for(&state, Role::User, user_id).await;
    (common::test_server(state), token, user_id)
}

fn address(label: &str) -> serde_json::Value {
    json!({
        "label": label,
        "line1": "12 Residency Road",
        "city": "Bengaluru",
        "state": "KA",
        "pincode": "560025",
        "latitude": common::LAT,
        "longitude": common::LNG
    })
}

async fn create(server: &TestServer, token: &str, label: &str) -> serde_json::Value {
    let response = server
        .post("/api/user/addresses")
        .authorization_bearer(token)
        .json(&address(label))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<serde_json::Value>()
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[sqlx::test]
async fn test_update_profile(pool: PgPool) {
    let (server, token, _user_id) = user_server(pool).await;

    let response = server
        .patch("/api/user/me")
        .authorization_bearer(&token)
        .json(&json!({ "name": " Asha ", "email": "Asha@Example.com" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["name"], "Asha");
    assert_eq!(body["email"], "asha@example.com");

    // Explicit null clears, absent keeps.
    let body = server
        .patch("/api/user/me")
        .authorization_bearer(&token)
        .json(&json!({ "email": null }))
        .await
        .json::<serde_json::Value>();
    assert_eq!(body["name"], "Asha");
    assert!(body["email"].is_null());
}

#[sqlx::test]
async fn test_update_profile_invalid_email(pool: PgPool) {
    let (server, token, _user_id) = user_server(pool).await;

    let response = server
        .patch("/api/user/me")
        .authorization_bearer(&token)
        .json(&json!({ "email": "nope" }))
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert!(body["error"]["details"]["fields"].get("email").is_some());
}

// ─── Addresses ───────────────────────────────────────────────────────────────

#[sqlx::test]
async fn test_first_address_becomes_default(pool: PgPool) {
    let (server, token, _user_id) = user_server(pool).await;

    let home = create(&server, &token, "Home").await;
    let work = create(&server, &token, "Work").await;

    assert_eq!(home["is_default"], true);
    assert_eq!(work["is_default"], false);
}

#[sqlx::test]
async fn test_set_default_moves_flag(pool: PgPool) {
    let (server, token, _user_id) = user_server(pool).await;

    let home = create(&server, &token, "Home").await;
    let work = create(&server, &token, "Work").await;

    server
        .post(&format!("/api/user/addresses/{}/default", work["id"]))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let list = server
        .get("/api/user/addresses")
        .authorization_bearer(&token)
        .await
        .json::<serde_json::Value>();
    let items = list["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], work["id"]);
    assert_eq!(items[0]["is_default"], true);
    assert_eq!(items[1]["id"], home["id"]);
    assert_eq!(items[1]["is_default"], false);
}

#[sqlx::test]
async fn test_deleting_default_promotes_another(pool: PgPool) {
    let (server, token, _user_id) = user_server(pool).await;

    let home = create(&server, &token, "Home").await;
    let work = create(&server, &token, "Work").await;

    server
        .delete(&format!("/api/user/addresses/{}", home["id"]))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let remaining = server
        .get(&format!("/api/user/addresses/{}", work["id"]))
        .authorization_bearer(&token)
        .await
        .json::<serde_json::Value>();
    assert_eq!(remaining["is_default"], true);
}

#[sqlx::test]
async fn test_update_address(pool: PgPool) {
    let (server, token, _user_id) = user_server(pool).await;
    let home = create(&server, &token, "Home").await;

    let response = server
        .patch(&format!("/api/user/addresses/{}", home["id"]))
        .authorization_bearer(&token)
        .json(&json!({ "line2": "Flat 4B", "pincode": "560001" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["line2"], "Flat 4B");
    assert_eq!(body["pincode"], "560001");
    assert_eq!(body["label"], "Home");
}

#[sqlx::test]
async fn test_invalid_pincode_rejected(pool: PgPool) {
    let (server, token, _user_id) = user_server(pool).await;

    let mut body = address("Home");
    body["pincode"] = json!("56-00");

    server
        .post("/api/user/addresses")
        .authorization_bearer(&token)
        .json(&body)
        .await
        .assert_status_bad_request();
}

#[sqlx::test]
async fn test_addresses_are_private(pool: PgPool) {
    let pool_handle = pool.clone();
    let (server, token, _user_id) = user_server(pool).await;
    let stranger = common::seed_user(&pool_handle, "+919000000000").await;
    let foreign = common::seed_address(&pool_handle, stranger).await;

    server
        .get(&format!("/api/user/addresses/{foreign}"))
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();

    server
        .delete(&format!("/api/user/addresses/{foreign}"))
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();

    server
        .post(&format!("/api/user/addresses/{foreign}/default"))
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();
}
