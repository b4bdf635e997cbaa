/// End-to-end router tests against PostgreSQL
///
/// Run with: `DATABASE_URL=... cargo test -p taskboard-api -- --ignored`

mod common;

use axum::http::StatusCode;
use common::{send, TestContext};
use serde_json::{json, Value};
use uuid::Uuid;

async fn create(ctx: &TestContext, title: &str, priority: i32) -> Value {
    let (status, body) = ctx
        .send(
            "POST",
            "/api/v1/task",
            Some(json!({ "title": title, "priority": priority })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

fn priorities(list: &Value) -> Vec<(String, i64)> {
    let mut out: Vec<(String, i64)> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| {
            (
                t["title"].as_str().unwrap().to_string(),
                t["priority"].as_i64().unwrap(),
            )
        })
        .collect();
    out.sort_by_key(|(_, p)| *p);
    out
}

#[tokio::test]
#[ignore]
async fn test_signup_login_and_logout() {
    let ctx = TestContext::new().await.unwrap();
    let username = format!("signup_{}", &Uuid::new_v4().simple().to_string()[..10]);

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({
            "username": username,
            "email": "someone@example.org",
            "password": "plum-orbit-42",
            "password_confirmation": "plum-orbit-42"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["token_type"], "Bearer");
    let user_id: Uuid = body["user_id"].as_str().unwrap().parse().unwrap();

    // duplicate username
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({
            "username": username,
            "email": "other@example.org",
            "password": "plum-orbit-42",
            "password_confirmation": "plum-orbit-42"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({ "username": username, "password": "plum-orbit-42" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap().to_string();
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    // signup schedules a digest
    let (status, settings) = send(&ctx.app, "GET", "/v1/settings/email", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["email_enable"], true);

    let (status, _) = send(&ctx.app, "POST", "/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&ctx.app, "GET", "/v1/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({ "username": username, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    taskboard_shared::models::user::User::delete(&ctx.db, user_id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_create_renumbers_contiguous_run() {
    let ctx = TestContext::new().await.unwrap();

    create(&ctx, "first task", 1).await;
    create(&ctx, "second task", 2).await;
    create(&ctx, "far task", 5).await;
    let newest = create(&ctx, "new head", 1).await;

    assert_eq!(newest["title"], "New head");
    assert_eq!(newest["priority"], 1);

    let (_, list) = ctx.send("GET", "/api/v1/task", None).await;
    assert_eq!(
        priorities(&list),
        vec![
            ("New head".to_string(), 1),
            ("First task".to_string(), 2),
            ("Second task".to_string(), 3),
            ("Far task".to_string(), 5),
        ]
    );

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_validation_errors() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/v1/task",
            Some(json!({ "title": "tiny", "priority": 0 })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"priority"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_patch_status_records_history() {
    let ctx = TestContext::new().await.unwrap();
    let task = create(&ctx, "tracked task", 1).await;
    let id = task["id"].as_str().unwrap();

    let (status, updated) = ctx
        .send(
            "PATCH",
            &format!("/api/v1/task/{}", id),
            Some(json!({ "status": "IN_PROGRESS" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "IN_PROGRESS");
    assert_eq!(updated["title"], "Tracked task");

    // same status again: no new entry
    ctx.send(
        "PATCH",
        &format!("/api/v1/task/{}", id),
        Some(json!({ "status": "IN_PROGRESS" })),
    )
    .await;

    let (status, history) = ctx
        .send("GET", &format!("/api/v1/task/{}/history", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["prev_status"], "PENDING");
    assert_eq!(entries[0]["updated_status"], "IN_PROGRESS");
    assert_eq!(entries[0]["task"]["id"], id);

    let entry_id = entries[0]["id"].as_str().unwrap();
    let (status, entry) = ctx
        .send(
            "GET",
            &format!("/api/v1/task/{}/history/{}", id, entry_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["id"], entry_id);

    let (_, filtered) = ctx
        .send(
            "GET",
            &format!("/api/v1/task/{}/history?updated_status=COMPLETED", id),
            None,
        )
        .await;
    assert!(filtered.as_array().unwrap().is_empty());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_soft_delete_hides_task() {
    let ctx = TestContext::new().await.unwrap();
    let task = create(&ctx, "short lived", 1).await;
    let id = task["id"].as_str().unwrap();

    let (status, _) = ctx.send("DELETE", &format!("/api/v1/task/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send("GET", &format!("/api/v1/task/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send("GET", &format!("/api/v1/task/{}/history", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send("DELETE", &format!("/api/v1/task/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, page) = ctx.send("GET", "/v1/tasks/all", None).await;
    assert_eq!(page["total_count"], 0);

    // the row is kept
    let deleted: bool = sqlx::query_scalar("SELECT deleted FROM tasks WHERE id = $1")
        .bind(id.parse::<Uuid>().unwrap())
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert!(deleted);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_other_users_tasks_are_invisible() {
    let owner = TestContext::new().await.unwrap();
    let other = TestContext::new().await.unwrap();

    let task = create(&owner, "private task", 1).await;
    let uri = format!("/api/v1/task/{}", task["id"].as_str().unwrap());

    let (status, _) = other.send("GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = other
        .send("PATCH", &uri, Some(json!({ "title": "Hijacked title" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = other.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = other.send("GET", "/api/v1/task", None).await;
    assert!(list.as_array().unwrap().is_empty());

    owner.cleanup().await.unwrap();
    other.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_app_surface_pagination_and_complete() {
    let ctx = TestContext::new().await.unwrap();

    let mut ids = Vec::new();
    for n in 1..=5 {
        let task = create(&ctx, &format!("paged task {}", n), n).await;
        ids.push(task["id"].as_str().unwrap().to_string());
    }

    let (status, page) = ctx.send("GET", "/v1/tasks?page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["tasks"].as_array().unwrap().len(), 1);

    let (status, _) = ctx.send("GET", "/v1/tasks?page=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, done) = ctx
        .send("POST", &format!("/v1/tasks/{}/complete", ids[0]), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["completed"], true);

    let (_, pending) = ctx.send("GET", "/v1/tasks", None).await;
    assert_eq!(pending["total_pages"], 1);
    assert_eq!(pending["completed_count"], 1);
    assert_eq!(pending["total_count"], 5);

    let (_, completed) = ctx.send("GET", "/v1/tasks/completed", None).await;
    assert_eq!(completed["tasks"][0]["id"], ids[0].as_str());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_email_settings_update() {
    let ctx = TestContext::new().await.unwrap();

    let (status, settings) = ctx
        .send(
            "PUT",
            "/v1/settings/email",
            Some(json!({ "email_time": "07:30:00", "email_enable": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["email_time"], "07:30:00");
    assert_eq!(settings["email_enable"], false);

    ctx.cleanup().await.unwrap();
}
