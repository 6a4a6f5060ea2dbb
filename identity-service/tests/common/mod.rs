use std::sync::Arc;

use auth::ExpiresIn;
use auth::JwtHandler;
use identity_service::domain::principal::service::PrincipalService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryPrincipalRepository;
use identity_service::outbound::BcryptCredentialHasher;
use serde_json::json;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let server_jwt_handler = Arc::new(JwtHandler::new(TEST_SECRET, ExpiresIn::default()));

        // Minimum bcrypt cost keeps the suite fast
        let principal_service = Arc::new(PrincipalService::new(
            Arc::new(InMemoryPrincipalRepository::new()),
            Arc::new(BcryptCredentialHasher::new(4)),
            Arc::clone(&server_jwt_handler),
        ));

        let router = create_router(principal_service, server_jwt_handler);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(TEST_SECRET, ExpiresIn::default()),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a principal and return the response body
    pub async fn register(&self, username: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "first_name": "John",
                "last_name": "Doe",
                "email": format!("{}@example.com", username),
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Sign in and return the raw response
    pub async fn sign_in(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/sign-in")
            .json(&json!({
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Sign in and return the access token
    pub async fn access_token(&self, username: &str, password: &str) -> String {
        let response = self.sign_in(username, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }
}
