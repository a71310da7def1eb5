//! Issue CRUD over HTTP.

use serde_json::{json, Value};

mod common;

async fn create(server: &common::TestServer, description: &str) -> Value {
    let res = server
        .client
        .post(server.url("/issues/create"))
        .json(&json!({
            "issueType": "technical",
            "description": description,
            "email": " Someone@Example.COM ",
            "bookingReference": "BK-1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    res.json::<Value>().await.unwrap()["issue"].clone()
}

#[tokio::test]
async fn test_issue_lifecycle() {
    let server = common::spawn_server().await;

    let issue = create(&server, "  Wifi down in lab 3 ").await;
    let id = issue["_id"].as_str().unwrap().to_string();
    assert_eq!(issue["description"], "Wifi down in lab 3");
    assert_eq!(issue["email"], "someone@example.com");
    assert_eq!(issue["status"], "pending");

    let fetched: Value = server
        .client
        .get(server.url(&format!("/issues/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["_id"], id.as_str());

    let res = server
        .client
        .put(server.url(&format!("/issues/update/{id}")))
        .json(&json!({ "description": "Wifi down in labs 3 and 4", "status": "resolved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["issue"]["status"], "resolved");
    assert_eq!(body["issue"]["description"], "Wifi down in labs 3 and 4");

    let res = server
        .client
        .delete(server.url(&format!("/issues/delete/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.json::<Value>().await.unwrap()["msg"].is_string());

    let res = server
        .client
        .get(server.url(&format!("/issues/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.json::<Value>().await.unwrap()["msg"], "Issue not found");
}

#[tokio::test]
async fn test_invalid_status_rejected_and_unchanged() {
    let server = common::spawn_server().await;
    let issue = create(&server, "Broken chair").await;
    let id = issue["_id"].as_str().unwrap();

    for body in [json!({ "status": "closed" }), json!({ "status": "Resolved" }), json!({})] {
        let res = server
            .client
            .patch(server.url(&format!("/issues/update-status/{id}")))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
    }

    let fetched: Value = server
        .client
        .get(server.url(&format!("/issues/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["status"], "pending");

    let res = server
        .client
        .patch(server.url(&format!("/issues/update-status/{id}")))
        .json(&json!({ "status": "in-progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap()["issue"]["status"], "in-progress");
}

#[tokio::test]
async fn test_create_requires_fields() {
    let server = common::spawn_server().await;

    let res = server
        .client
        .post(server.url("/issues/create"))
        .json(&json!({ "issueType": "other", "email": "a@b.c" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(res.json::<Value>().await.unwrap()["msg"], "description is required");

    let res = server
        .client
        .post(server.url("/issues/create"))
        .json(&json!({ "issueType": "hardware", "description": "x", "email": "a@b.c" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_missing_issue_routes_return_404() {
    let server = common::spawn_server().await;
    let missing = uuid::Uuid::new_v4();

    let res = server
        .client
        .put(server.url(&format!("/issues/update/{missing}")))
        .json(&json!({ "description": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = server
        .client
        .delete(server.url(&format!("/issues/delete/{missing}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_list_returns_every_issue() {
    let server = common::spawn_server().await;
    create(&server, "first").await;
    create(&server, "second").await;

    let all: Vec<Value> = server
        .client
        .get(server.url("/issues/all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}
