//! End-to-end tests against a running server (`cargo run`, port 3000).
//! Ignored by default since they need the server up, same as the perf
//! suite this crate started from.

use serde_json::json;

const BASE_URL: &str = "http://127.0.0.1:3000";

struct TestUser {
    id: String,
    email: String,
}

async fn register_user(client: &reqwest::Client, tag: &str) -> TestUser {
    let suffix = uuid::Uuid::new_v4().to_string();
    let username = format!("{}_{}", tag, &suffix[0..8]);
    let email = format!("{}@example.com", username);

    let resp = client
        .post(format!("{}/api/users", BASE_URL))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to register user");

    assert_eq!(resp.status(), 201);
    let user = resp.json::<serde_json::Value>().await.unwrap();
    assert!(user.get("password").is_none(), "password leaked: {:?}", user);

    TestUser {
        id: user["id"].as_str().unwrap().to_string(),
        email,
    }
}

async fn login(client: &reqwest::Client, email: &str) -> String {
    let resp = client
        .post(format!("{}/api/users/token", BASE_URL))
        .form(&[("username", email), ("password", "password123")])
        .send()
        .await
        .expect("Failed to login");

    assert_eq!(resp.status(), 200);
    let body = resp.json::<serde_json::Value>().await.unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_post(client: &reqwest::Client, token: &str, title: &str) -> String {
    let resp = client
        .post(format!("{}/api/posts", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"title": title, "content": "Some content"}))
        .send()
        .await
        .expect("Failed to create post");

    assert_eq!(resp.status(), 201);
    let post = resp.json::<serde_json::Value>().await.unwrap();
    post["id"].as_str().unwrap().to_string()
}

#[ignore]
#[tokio::test]
async fn test_register_and_login() {
    let client = reqwest::Client::new();
    let user = register_user(&client, "reg").await;
    let token = login(&client, &user.email).await;
    assert!(!token.is_empty());
}

#[ignore]
#[tokio::test]
async fn test_duplicate_username_and_email_conflict() {
    let client = reqwest::Client::new();
    let suffix = uuid::Uuid::new_v4().to_string();
    let username = format!("dup_{}", &suffix[0..8]);

    let first = client
        .post(format!("{}/api/users", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);

    // Same username, different email
    let resp = client
        .post(format!("{}/api/users", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("other_{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Same email, different username
    let resp = client
        .post(format!("{}/api/users", BASE_URL))
        .json(&json!({
            "username": format!("other_{}", &suffix[0..8]),
            "email": format!("{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[ignore]
#[tokio::test]
async fn test_register_validation_detail() {
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/users", BASE_URL))
        .json(&json!({"username": "ok_name"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 422);
    let body = resp.json::<serde_json::Value>().await.unwrap();
    let fields = body["fields"].as_array().unwrap();
    assert!(fields.iter().any(|f| f["field"] == "email"));
    assert!(fields.iter().any(|f| f["field"] == "password"));
}

#[ignore]
#[tokio::test]
async fn test_login_invalid_credentials() {
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/users/token", BASE_URL))
        .form(&[("username", "nobody@example.com"), ("password", "wrongpass")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[ignore]
#[tokio::test]
async fn test_posts_are_publicly_readable() {
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/posts", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.json::<serde_json::Value>().await.unwrap().is_array());
}

#[ignore]
#[tokio::test]
async fn test_create_post_requires_auth() {
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/posts", BASE_URL))
        .json(&json!({"title": "No auth", "content": "No auth"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[ignore]
#[tokio::test]
async fn test_post_ownership_flow() {
    let client = reqwest::Client::new();

    let u1 = register_user(&client, "owner").await;
    let u2 = register_user(&client, "intruder").await;
    let t1 = login(&client, &u1.email).await;
    let t2 = login(&client, &u2.email).await;

    let post_id = create_post(&client, &t1, "Original title").await;

    // U2 may not update U1's post
    let resp = client
        .put(format!("{}/api/posts/{}", BASE_URL, post_id))
        .header("Authorization", format!("Bearer {}", t2))
        .json(&json!({"title": "Hijacked", "content": "Hijacked"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // U1 updates their own post
    let resp = client
        .put(format!("{}/api/posts/{}", BASE_URL, post_id))
        .header("Authorization", format!("Bearer {}", t1))
        .json(&json!({"title": "New title", "content": "New content"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated = resp.json::<serde_json::Value>().await.unwrap();
    assert_eq!(updated["title"], "New title");

    // U2 may not delete it either
    let resp = client
        .delete(format!("{}/api/posts/{}", BASE_URL, post_id))
        .header("Authorization", format!("Bearer {}", t2))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // U1 deletes it
    let resp = client
        .delete(format!("{}/api/posts/{}", BASE_URL, post_id))
        .header("Authorization", format!("Bearer {}", t1))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    // Gone
    let resp = client
        .get(format!("{}/api/posts/{}", BASE_URL, post_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[ignore]
#[tokio::test]
async fn test_update_post_reassign_to_missing_owner() {
    let client = reqwest::Client::new();

    let u1 = register_user(&client, "reassign").await;
    let t1 = login(&client, &u1.email).await;
    let post_id = create_post(&client, &t1, "To be reassigned").await;

    let resp = client
        .put(format!("{}/api/posts/{}", BASE_URL, post_id))
        .header("Authorization", format!("Bearer {}", t1))
        .json(&json!({
            "title": "Still mine",
            "content": "Still mine",
            "user_id": uuid::Uuid::new_v4().to_string()
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[ignore]
#[tokio::test]
async fn test_delete_user_cascades_and_requires_self() {
    let client = reqwest::Client::new();

    let u1 = register_user(&client, "victim").await;
    let u2 = register_user(&client, "attacker").await;
    let t1 = login(&client, &u1.email).await;
    let t2 = login(&client, &u2.email).await;

    let post_id = create_post(&client, &t1, "Will be cascaded").await;

    // U2 may not delete U1's account
    let resp = client
        .delete(format!("{}/api/users/{}", BASE_URL, u1.id))
        .header("Authorization", format!("Bearer {}", t2))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // U1 deletes their own account
    let resp = client
        .delete(format!("{}/api/users/{}", BASE_URL, u1.id))
        .header("Authorization", format!("Bearer {}", t1))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    // Account gone
    let resp = client
        .get(format!("{}/api/users/{}", BASE_URL, u1.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Posts cascaded
    let resp = client
        .get(format!("{}/api/posts/{}", BASE_URL, post_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[ignore]
#[tokio::test]
async fn test_delete_unknown_user_is_forbidden() {
    // Authorization runs before the target lookup, so an unknown id that
    // is not your own reads as 403, not 404.
    let client = reqwest::Client::new();

    let u1 = register_user(&client, "probe").await;
    let t1 = login(&client, &u1.email).await;

    let resp = client
        .delete(format!("{}/api/users/{}", BASE_URL, uuid::Uuid::new_v4()))
        .header("Authorization", format!("Bearer {}", t1))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 403);
}
