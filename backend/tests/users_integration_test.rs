//! Integration tests for login and the user endpoints

mod common;

use axum::http::StatusCode;
use common::{unique_name, TestApp};
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_user_lifecycle() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;
    let fullname = unique_name("Ana Pop");

    let (status, created) = app
        .post(
            "/users",
            json!({
                "fullname": fullname,
                "category": "prof",
                "commission": 0,
                "password": "secret1"
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);
    assert!(created.get("password").is_none());
    assert!(created.get("password_hash").is_none());

    let (status, fetched) = app.get(&format!("/users/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = app
        .put(
            &format!("/users/{}", id),
            json!({ "fullname": fullname, "category": "prof", "commission": 1.5 }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["commission"], 1.5);
    assert!(updated.get("password").is_none());

    // No password in the update: the old one still works
    let (status, _) = app.login(&fullname, "secret1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.delete(&format!("/users/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, body) = app.get(&format!("/users/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_issues_token_for_user() {
    let app = TestApp::new().await;
    let (id, token) = app.seed_user_and_login().await;

    let (status, body) = app.get(&format!("/users/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_failures_share_one_message() {
    let app = TestApp::new().await;
    let (id, token) = app.seed_user_and_login().await;
    let (_, user) = app.get(&format!("/users/{}", id), Some(&token)).await;
    let fullname = user["fullname"].as_str().unwrap().to_string();

    let (status, wrong_password) = app
        .post(
            "/login",
            json!({ "fullname": fullname, "password": "not-the-password" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = app
        .post(
            "/login",
            json!({ "fullname": unique_name("nobody"), "password": "whatever" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(unknown_user["error"], "Invalid credentials");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_legacy_bcrypt_hash_still_logs_in() {
    let app = TestApp::new().await;
    let fullname = unique_name("legacy");
    let hash = bcrypt::hash("legacy-pass", 4).unwrap();

    sqlx::query(
        "INSERT INTO users (fullname, category, commission, password_hash) \
         VALUES ($1, 'prof', 0, $2)",
    )
    .bind(&fullname)
    .bind(&hash)
    .execute(&app.pool)
    .await
    .unwrap();

    let (status, token) = app.login(&fullname, "legacy-pass").await;
    assert_eq!(status, StatusCode::OK);
    assert!(token.is_some());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_with_password_replaces_it() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;
    let fullname = unique_name("Ion Popescu");

    let (_, created) = app
        .post(
            "/users",
            json!({
                "fullname": fullname,
                "email": format!("{}@example.com", uuid::Uuid::new_v4()),
                "category": "lector",
                "commission": 2.0,
                "password": "old-password"
            }),
            Some(&token),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .put(
            &format!("/users/{}", id),
            json!({
                "fullname": fullname,
                "category": "lector",
                "commission": 2.0,
                "password": "new-password"
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    // Email was not sent, so the stored one is kept
    assert_eq!(updated["email"], created["email"]);

    let (status, _) = app.login(&fullname, "old-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.login(&fullname, "new-password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_with_empty_password_keeps_it() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;
    let fullname = unique_name("Maria Ionescu");

    let (_, created) = app
        .post(
            "/users",
            json!({
                "fullname": fullname,
                "category": "prof",
                "commission": 0,
                "password": "keep-me"
            }),
            Some(&token),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = app
        .put(
            &format!("/users/{}", id),
            json!({
                "fullname": fullname,
                "category": "conf",
                "commission": 0,
                "password": ""
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.login(&fullname, "keep-me").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_missing_user_returns_404() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;

    let (status, body) = app
        .put(
            "/users/999999999",
            json!({ "fullname": unique_name("ghost"), "category": "prof", "commission": 0 }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_missing_user_with_invalid_body_returns_404() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;

    let (status, body) = app
        .put(
            "/users/999999999",
            json!({ "fullname": "", "category": "prof", "commission": 0 }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_existing_user_with_invalid_body_returns_400() {
    let app = TestApp::new().await;
    let (id, token) = app.seed_user_and_login().await;

    let (status, _) = app
        .put(
            &format!("/users/{}", id),
            json!({ "fullname": "", "category": "prof", "commission": 0 }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_fullname_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;
    let body = json!({
        "fullname": unique_name("twin"),
        "category": "prof",
        "commission": 0,
        "password": "secret1"
    });

    let (status, _) = app.post("/users", body.clone(), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, response) = app.post("/users", body, Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].is_string());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_list_users_ordered_and_paginated() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;

    for name in ["first", "second", "third"] {
        let (status, _) = app
            .post(
                "/users",
                json!({
                    "fullname": unique_name(name),
                    "category": "prof",
                    "commission": 0,
                    "password": "secret1"
                }),
                Some(&token),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, all) = app.get("/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert!(ids.len() >= 4);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert!(all.as_array().unwrap().iter().all(|u| u.get("password_hash").is_none()));

    let (status, page) = app.get("/users?limit=2&offset=1", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let page_ids: Vec<i64> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(page_ids.len(), 2);
    assert!(page_ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_unlinks_analyses() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;

    let (_, created) = app
        .post(
            "/users",
            json!({
                "fullname": unique_name("with-analyses"),
                "category": "prof",
                "commission": 0,
                "password": "secret1"
            }),
            Some(&token),
        )
        .await;
    let id = created["id"].as_i64().unwrap();
    let first = app.insert_analysis(id).await;
    let second = app.insert_analysis(id).await;

    let (status, _) = app.delete(&format!("/users/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    assert!(!app.user_exists(id).await);
    assert_eq!(app.analysis_user(first).await, None);
    assert_eq!(app.analysis_user(second).await, None);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_missing_user_returns_404() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;

    let (status, body) = app.delete("/users/999999999", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_failed_delete_rolls_back_unlink() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user_and_login().await;

    // Each run gets its own trigger so parallel tests never share or drop it
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let function = format!("reject_delete_{}", suffix);
    let marked = unique_name("fail-delete");

    let (_, created) = app
        .post(
            "/users",
            json!({
                "fullname": marked,
                "category": "prof",
                "commission": 0,
                "password": "secret1"
            }),
            Some(&token),
        )
        .await;
    let id = created["id"].as_i64().unwrap();
    let analysis = app.insert_analysis(id).await;

    // Make the row delete fail after the analyses were unlinked
    sqlx::query(&format!(
        r#"
        CREATE FUNCTION {function}() RETURNS TRIGGER AS $$
        BEGIN
            IF OLD.id = {id} THEN
                RAISE EXCEPTION 'delete rejected for user %', OLD.id;
            END IF;
            RETURN OLD;
        END;
        $$ LANGUAGE plpgsql
        "#
    ))
    .execute(&app.pool)
    .await
    .unwrap();
    sqlx::query(&format!(
        "CREATE TRIGGER {function} BEFORE DELETE ON users \
         FOR EACH ROW EXECUTE FUNCTION {function}()"
    ))
    .execute(&app.pool)
    .await
    .unwrap();

    let (status, body) = app.delete(&format!("/users/{}", id), Some(&token)).await;
    let user_kept = app.user_exists(id).await;
    let analysis_user = app.analysis_user(analysis).await;

    // Clean up before asserting so a failure does not leave the trigger behind
    sqlx::query(&format!("DROP TRIGGER IF EXISTS {function} ON users"))
        .execute(&app.pool)
        .await
        .unwrap();
    sqlx::query(&format!("DROP FUNCTION IF EXISTS {function}()"))
        .execute(&app.pool)
        .await
        .unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(user_kept);
    assert_eq!(analysis_user, Some(id));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_requests_without_token_change_nothing() {
    let app = TestApp::new().await;
    let (id, _) = app.seed_user_and_login().await;

    let (status, _) = app
        .put(
            &format!("/users/{}", id),
            json!({ "fullname": "hijacked", "category": "x", "commission": 99 }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.delete(&format!("/users/{}", id), Some("bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let commission: f64 = sqlx::query_scalar("SELECT commission FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(commission, 0.0);
    assert!(app.user_exists(id).await);
}
