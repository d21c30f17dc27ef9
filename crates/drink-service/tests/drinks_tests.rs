//! Drink CRUD integration tests through the permission guards.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use drink_service::repositories::DrinkRepository;
use drink_test_utils::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

const ALL_PERMISSIONS: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

struct TestApp {
    server: TestDrinkServer,
    _jwks: MockJwksServer,
    token: String,
    client: reqwest::Client,
}

impl TestApp {
    async fn spawn() -> Result<Self> {
        let key = RsaTestKey::new("rsa-key-01");
        let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
        let server = TestDrinkServer::spawn(&jwks.jwks_url()).await?;
        let token = key.sign(
            &TestClaimsBuilder::new()
                .for_user("auth0|manager")
                .with_permissions(ALL_PERMISSIONS)
                .build(),
        );

        Ok(Self {
            server,
            _jwks: jwks,
            token,
            client: reqwest::Client::new(),
        })
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.server.url(), path))
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    async fn create(&self, title: &str) -> Result<Value> {
        let (status, body) = self
            .send(
                reqwest::Method::POST,
                "/drinks",
                Some(json!({
                    "title": title,
                    "recipe": [
                        {"name": "espresso", "color": "brown", "parts": 1},
                        {"name": "milk", "color": "white", "parts": 2}
                    ]
                })),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{body}");
        Ok(body["drinks"][0].clone())
    }
}

#[tokio::test]
async fn test_index() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body: Value = reqwest::get(format!("{}/", app.server.url()))
        .await?
        .json()
        .await?;

    assert_eq!(body, json!({"success": true, "message": "My Coffee shop"}));
    Ok(())
}

#[tokio::test]
async fn test_create_then_list_short_and_long() -> Result<()> {
    let app = TestApp::spawn().await?;
    let created = app.create("Flat white").await?;
    assert_eq!(created["title"], "Flat white");
    assert_eq!(created["recipe"][1]["name"], "milk");

    let public: Value = reqwest::get(format!("{}/drinks", app.server.url()))
        .await?
        .json()
        .await?;
    assert_eq!(
        public,
        json!({
            "success": true,
            "drinks": [{
                "id": created["id"],
                "title": "Flat white",
                "recipe": [
                    {"color": "brown", "parts": 1},
                    {"color": "white", "parts": 2}
                ]
            }]
        })
    );

    let (status, detail) = app
        .send(reqwest::Method::GET, "/drinks-detail", None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["drinks"][0], created);
    Ok(())
}

#[tokio::test]
async fn test_create_with_single_recipe_object() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app
        .send(
            reqwest::Method::POST,
            "/drinks",
            Some(json!({
                "title": "Water",
                "recipe": {"name": "water", "color": "blue", "parts": 1}
            })),
        )
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drinks"].as_array().unwrap().len(), 1);
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], "water");
    Ok(())
}

#[tokio::test]
async fn test_create_invalid_payloads_are_unprocessable() -> Result<()> {
    let app = TestApp::spawn().await?;

    for payload in [
        json!({"title": "Water"}),
        json!({"recipe": {"name": "water", "color": "blue", "parts": 1}}),
        json!({"title": "  ", "recipe": {"name": "water", "color": "blue", "parts": 1}}),
        json!({"title": "Water", "recipe": []}),
        json!({"title": "Water", "recipe": "water"}),
    ] {
        let (status, body) = app
            .send(reqwest::Method::POST, "/drinks", Some(payload.clone()))
            .await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{payload}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 422);
        assert_eq!(body["code"], "unprocessable");
    }
    Ok(())
}

#[tokio::test]
async fn test_create_duplicate_title_is_unprocessable() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.create("Mocha").await?;

    let (status, body) = app
        .send(
            reqwest::Method::POST,
            "/drinks",
            Some(json!({
                "title": "Mocha",
                "recipe": {"name": "chocolate", "color": "brown", "parts": 1}
            })),
        )
        .await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "unprocessable");
    Ok(())
}

#[tokio::test]
async fn test_patch_title_and_recipe() -> Result<()> {
    let app = TestApp::spawn().await?;
    let created = app.create("Cortado").await?;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            reqwest::Method::PATCH,
            &format!("/drinks/{id}"),
            Some(json!({"title": "Gibraltar"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drinks"][0]["title"], "Gibraltar");
    assert_eq!(body["drinks"][0]["recipe"], created["recipe"]);

    let (status, body) = app
        .send(
            reqwest::Method::PATCH,
            &format!("/drinks/{id}"),
            Some(json!({"recipe": {"name": "espresso", "color": "brown", "parts": 2}})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["drinks"][0]["recipe"],
        json!([{"name": "espresso", "color": "brown", "parts": 2}])
    );
    Ok(())
}

#[tokio::test]
async fn test_patch_rejects_empty_and_blank_updates() -> Result<()> {
    let app = TestApp::spawn().await?;
    let id = app.create("Cortado").await?["id"].as_i64().unwrap();

    for payload in [json!({}), json!({"title": ""})] {
        let (status, _) = app
            .send(
                reqwest::Method::PATCH,
                &format!("/drinks/{id}"),
                Some(payload.clone()),
            )
            .await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{payload}");
    }
    Ok(())
}

#[tokio::test]
async fn test_patch_and_delete_unknown_drink_are_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app
        .send(
            reqwest::Method::PATCH,
            "/drinks/404",
            Some(json!({"title": "Ghost"})),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    app.create("Espresso").await?;
    let (status, body) = app
        .send(
            reqwest::Method::PATCH,
            "/drinks/404",
            Some(json!({"title": "Espresso"})),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = app.send(reqwest::Method::DELETE, "/drinks/404", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(reqwest::Method::DELETE, "/drinks/not-a-number", None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_delete() -> Result<()> {
    let app = TestApp::spawn().await?;
    let id = app.create("Americano").await?["id"].as_i64().unwrap();

    let (status, body) = app
        .send(reqwest::Method::DELETE, &format!("/drinks/{id}"), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "delete": id}));

    assert!(app.server.repo().list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_each_route_requires_its_own_permission() -> Result<()> {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let server = TestDrinkServer::spawn(&jwks.jwks_url()).await?;
    let client = reqwest::Client::new();

    // Holds every permission except the one each route needs.
    let cases = [
        (reqwest::Method::GET, "/drinks-detail", "get:drinks-detail"),
        (reqwest::Method::POST, "/drinks", "post:drinks"),
        (reqwest::Method::PATCH, "/drinks/1", "patch:drinks"),
        (reqwest::Method::DELETE, "/drinks/1", "delete:drinks"),
    ];

    for (method, path, needed) in cases {
        let others: Vec<&str> = ALL_PERMISSIONS
            .iter()
            .copied()
            .filter(|p| *p != needed)
            .collect();
        let token = key.sign(&TestClaimsBuilder::new().with_permissions(&others).build());

        let response = client
            .request(method, format!("{}{}", server.url(), path))
            .bearer_auth(token)
            .json(&json!({"title": "x"}))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
    }
    Ok(())
}
