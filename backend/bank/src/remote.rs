//! # Hosted backend
//!
//! Speaks the PostgREST dialect for tables and the GoTrue dialect for auth,
//! which is what the hosted backend exposes under `/rest/v1` and `/auth/v1`.
//!
//! Every request carries the project API key in `apikey`. Table requests carry
//! the visitor's access token as a bearer so the backend's row level security
//! sees who is asking. Anonymous reads fall back to the API key itself.
//!
//! ## Commands
//!
//! Peek at the plan catalog.
//! ```sh
//! curl -H "apikey: $(cat /run/secrets/BACKEND_ANON_KEY)" "$BACKEND_URL/rest/v1/membership_plans?select=*"
//! ```
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    Backend, BankError, Row,
    models::{AuthSession, AuthUser, Role},
    rest::{Filter, Select, Table},
};

const TIMEOUT: Duration = Duration::from_secs(10);

pub struct RemoteBank {
    base: String,
    api_key: String,
    client: Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: RemoteUser,
}

#[derive(Deserialize)]
struct RemoteUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    app_metadata: AppMetadata,
}

#[derive(Deserialize, Default)]
struct AppMetadata {
    role: Option<String>,
}

/// Pulls the human readable part out of an auth or table error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(key)?.as_str().map(str::to_string))
}

async fn checked(response: Response) -> Result<Response, BankError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    warn!("Backend rejected request ({status}): {message}");

    Err(match status.as_u16() {
        401 => BankError::Unauthorized,
        code => BankError::Rejected {
            status: code,
            message,
        },
    })
}

fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::query_pair).collect()
}

impl RemoteBank {
    pub fn new(base: &str, api_key: &str) -> Result<Self, BankError> {
        let client = Client::builder().timeout(TIMEOUT).build()?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{table}", self.base)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base)
    }

    fn authorized(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(token.unwrap_or(&self.api_key))
    }
}

#[async_trait]
impl Backend for RemoteBank {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BankError> {
        let request = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email.trim(), "password": password }));

        let response = checked(self.authorized(request, None).send().await?).await?;
        let token: TokenResponse = response.json().await?;

        Ok(AuthSession {
            access_token: token.access_token,
            user: AuthUser {
                id: token.user.id,
                email: token.user.email.unwrap_or_else(|| email.trim().to_string()),
                role: Role::from_claim(token.user.app_metadata.role.as_deref()),
            },
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), BankError> {
        let request = self
            .client
            .post(self.auth_url("signup"))
            .json(&json!({ "email": email.trim(), "password": password }));

        checked(self.authorized(request, None).send().await?).await?;
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BankError> {
        let request = self.client.post(self.auth_url("logout"));

        checked(self.authorized(request, Some(access_token)).send().await?).await?;
        Ok(())
    }

    async fn select(&self, token: Option<&str>, query: &Select) -> Result<Vec<Row>, BankError> {
        let pairs = query.query_pairs();
        debug!("select {} {:?}", query.table, pairs);

        let request = self.client.get(self.table_url(query.table)).query(&pairs);
        let response = checked(self.authorized(request, token).send().await?).await?;

        Ok(response.json().await?)
    }

    async fn insert(&self, token: &str, table: Table, row: Value) -> Result<(), BankError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(&row);

        checked(self.authorized(request, Some(token)).send().await?).await?;
        Ok(())
    }

    async fn update(
        &self,
        token: &str,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<usize, BankError> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&filter_pairs(filters))
            .header("Prefer", "return=representation")
            .json(&patch);

        let response = checked(self.authorized(request, Some(token)).send().await?).await?;
        let rows: Vec<Value> = response.json().await?;

        Ok(rows.len())
    }
}
