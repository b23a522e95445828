//! Test helpers for integration tests
//!
//! Spawns the API on an ephemeral port and wraps the HTTP calls tests need.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use share_api::{create_app, create_app_state, AppState};
use share_common::AppConfig;
use share_core::Snowflake;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::Envelope;

/// Running server plus handles for seeding and token issuing
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    state: AppState,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server configured from the environment
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Pool used by the server, for seeding rows the API does not create
    pub fn pool(&self) -> Result<&PgPool> {
        self.state
            .service_context()
            .pool()
            .context("server runs without PostgreSQL")
    }

    /// Access token for `user_id`
    pub fn token(&self, user_id: Snowflake) -> Result<String> {
        Ok(self.state.jwt_service().issue_access_token(user_id)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// POST with a bearer token and an optional JSON body
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: Option<&T>,
    ) -> Result<Response> {
        let mut request = self.post(path).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.delete(path).bearer_auth(token).send().await?)
    }
}

/// Configuration from the environment (and `.env`)
pub fn test_config() -> Result<AppConfig> {
    AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// True when PostgreSQL and Redis are configured
pub fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    for var in ["DATABASE_URL", "REDIS_URL"] {
        if std::env::var(var).is_err() {
            eprintln!("Skipping test: {var} not set");
            return false;
        }
    }
    true
}

/// Assert the status and unwrap the success envelope
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    let envelope: Envelope<T> = response.json().await?;
    anyhow::ensure!(envelope.success, "success flag not set");
    Ok(envelope.data)
}

/// Assert the status and return the error code of a failure envelope
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    anyhow::ensure!(
        status == expected_status,
        "Expected status {expected_status}, got {status}. Body: {body}"
    );
    body["error"]["code"]
        .as_str()
        .map(str::to_owned)
        .context("missing error code")
}
