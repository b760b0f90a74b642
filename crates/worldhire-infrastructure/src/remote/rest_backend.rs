//! HTTP client for the hosted backend's REST and auth endpoints.
//!
//! Tables live under `/rest/v1/<table>` and filters are sent as query
//! parameters (`col=eq.value`, `col=neq.value`, `col=in.(a,b)`). Accounts
//! live under `/auth/v1/`.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use worldhire_core::error::{Result, WorldhireError};
use worldhire_core::remote::Condition;
use worldhire_core::{Filter, RemoteAuth, RemoteBackend, RemoteConfig, RemoteUser, SelectQuery, SelectResponse};

#[derive(Debug, Clone, Deserialize)]
struct AuthTokens {
    access_token: String,
    refresh_token: String,
}

/// Talks to the hosted backend over HTTP.
///
/// Requests carry the project key as `apikey`; once a sign-up returns a
/// session its access token is used as the bearer token.
pub struct RestBackend {
    client: Client,
    base_url: String,
    api_key: String,
    tokens: Mutex<Option<AuthTokens>>,
}

impl RestBackend {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| WorldhireError::remote(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            tokens: Mutex::new(None),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn request(&self, method: Method, url: String) -> RequestBuilder {
        let bearer = match self.tokens.lock().await.as_ref() {
            Some(tokens) => tokens.access_token.clone(),
            None => self.api_key.clone(),
        };
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| WorldhireError::remote(format!("{} failed: {}", what, e)))?;

        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::debug!("[RestBackend] {} returned {}: {}", what, status, body);
        Err(WorldhireError::remote(format!(
            "{} returned {}: {}",
            what, status, body
        )))
    }

    async fn rows(response: Response, what: &str) -> Result<Vec<Value>> {
        let text = response
            .text()
            .await
            .map_err(|e| WorldhireError::remote(format!("{} body: {}", what, e)))?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str(&text)? {
            Value::Array(rows) => Ok(rows),
            other => Ok(vec![other]),
        }
    }

    async fn store_tokens(&self, body: &Value) {
        let session = body.get("session").unwrap_or(body);
        if let Ok(tokens) = serde_json::from_value::<AuthTokens>(session.clone()) {
            *self.tokens.lock().await = Some(tokens);
        }
    }
}

/// Renders one filter value in the query-string grammar.
fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Renders one member of an `in.(...)` list, quoting reserved characters.
fn encode_list_item(value: &Value) -> String {
    let raw = encode_value(value);
    if raw.contains([',', '(', ')', '"']) {
        format!("\"{}\"", raw.replace('"', "\\\""))
    } else {
        raw
    }
}

pub(crate) fn filter_params(filter: &Filter) -> Vec<(String, String)> {
    filter
        .conditions
        .iter()
        .map(|condition| match condition {
            Condition::Eq(column, Value::Null) => (column.clone(), "is.null".to_string()),
            Condition::Neq(column, Value::Null) => (column.clone(), "not.is.null".to_string()),
            Condition::Eq(column, value) => (column.clone(), format!("eq.{}", encode_value(value))),
            Condition::Neq(column, value) => {
                (column.clone(), format!("neq.{}", encode_value(value)))
            }
            Condition::In(column, values) => {
                let items: Vec<String> = values.iter().map(encode_list_item).collect();
                (column.clone(), format!("in.({})", items.join(",")))
            }
        })
        .collect()
}

/// Total from a `Content-Range` header such as `0-9/42` or `*/42`.
pub(crate) fn parse_content_range(header: &str) -> Option<usize> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl RemoteBackend for RestBackend {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<SelectResponse> {
        let method = if query.head { Method::HEAD } else { Method::GET };
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(filter_params(&query.filter));
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        let mut request = self.request(method, self.table_url(table)).await.query(&params);
        if query.count {
            request = request.header("Prefer", "count=exact");
        }
        let what = format!("select from '{}'", table);
        let response = self.send(request, &what).await?;

        let count = if query.count {
            response
                .headers()
                .get("content-range")
                .and_then(|value| value.to_str().ok())
                .and_then(parse_content_range)
        } else {
            None
        };
        let rows = if query.head {
            Vec::new()
        } else {
            Self::rows(response, &what).await?
        };
        Ok(SelectResponse { rows, count })
    }

    async fn insert(&self, table: &str, rows: Vec<Value>, returning: bool) -> Result<Vec<Value>> {
        let prefer = if returning {
            "return=representation"
        } else {
            "return=minimal"
        };
        let request = self
            .request(Method::POST, self.table_url(table))
            .await
            .header("Prefer", prefer)
            .json(&rows);
        let what = format!("insert into '{}'", table);
        let response = self.send(request, &what).await?;

        if returning {
            Self::rows(response, &what).await
        } else {
            Ok(Vec::new())
        }
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> Result<Vec<Value>> {
        let request = self
            .request(Method::PATCH, self.table_url(table))
            .await
            .query(&filter_params(filter))
            .header("Prefer", "return=representation")
            .json(&patch);
        let what = format!("update '{}'", table);
        let response = self.send(request, &what).await?;
        Self::rows(response, &what).await
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>> {
        let request = self
            .request(Method::POST, self.table_url(table))
            .await
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&rows);
        let what = format!("upsert into '{}'", table);
        let response = self.send(request, &what).await?;
        Self::rows(response, &what).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<usize> {
        let request = self
            .request(Method::DELETE, self.table_url(table))
            .await
            .query(&filter_params(filter))
            .header("Prefer", "return=representation");
        let what = format!("delete from '{}'", table);
        let response = self.send(request, &what).await?;
        Ok(Self::rows(response, &what).await?.len())
    }

    fn auth(&self) -> &dyn RemoteAuth {
        self
    }
}

#[async_trait]
impl RemoteAuth for RestBackend {
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<RemoteUser> {
        let request = self
            .request(Method::POST, self.auth_url("signup"))
            .await
            .json(&json!({"email": email, "password": password, "data": metadata}));
        let response = self.send(request, "sign up").await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| WorldhireError::remote(format!("sign up body: {}", e)))?;

        self.store_tokens(&body).await;
        let user = body.get("user").cloned().unwrap_or(body);
        Ok(serde_json::from_value(user)?)
    }

    async fn resend_verification(&self, email: &str) -> Result<()> {
        let request = self
            .request(Method::POST, self.auth_url("resend"))
            .await
            .json(&json!({"type": "signup", "email": email}));
        self.send(request, "resend verification").await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<RemoteUser>> {
        if self.tokens.lock().await.is_none() {
            return Ok(None);
        }
        let request = self.request(Method::GET, self.auth_url("user")).await;
        let response = self.send(request, "current user").await?;
        let user = response
            .json()
            .await
            .map_err(|e| WorldhireError::remote(format!("current user body: {}", e)))?;
        Ok(Some(user))
    }

    async fn refresh_session(&self) -> Result<()> {
        let refresh_token = match self.tokens.lock().await.as_ref() {
            Some(tokens) => tokens.refresh_token.clone(),
            None => return Err(WorldhireError::remote("No active session to refresh")),
        };
        let request = self
            .request(Method::POST, self.auth_url("token"))
            .await
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({"refresh_token": refresh_token}));
        let response = self.send(request, "refresh session").await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| WorldhireError::remote(format!("refresh body: {}", e)))?;
        self.store_tokens(&body).await;
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<()> {
        let request = self
            .request(Method::POST, self.auth_url("recover"))
            .await
            .json(&json!({"email": email}));
        self.send(request, "reset password").await?;
        Ok(())
    }
}
