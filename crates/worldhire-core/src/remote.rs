//! The hosted backend as seen by the seeder.
//!
//! The kernel never implements the backend itself; it only depends on this
//! table-level surface plus an auth sub-interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A single column predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Eq(String, Value),
    Neq(String, Value),
    In(String, Vec<Value>),
}

impl Condition {
    pub fn column(&self) -> &str {
        match self {
            Condition::Eq(column, _) | Condition::Neq(column, _) | Condition::In(column, _) => {
                column
            }
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        let cell = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Condition::Eq(_, value) => cell == value,
            Condition::Neq(_, value) => cell != value,
            Condition::In(_, values) => values.contains(cell),
        }
    }
}

/// A conjunction of column predicates. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(column.into(), value.into()));
        self
    }

    pub fn neq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Neq(column.into(), value.into()));
        self
    }

    pub fn in_list<V: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::In(
            column.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|condition| condition.matches(row))
    }
}

/// Parameters of a `select` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub filter: Filter,
    pub limit: Option<usize>,
    /// Request an exact row count alongside the rows.
    pub count: bool,
    /// Return only the count, no rows.
    pub head: bool,
}

impl SelectQuery {
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Exact count of matching rows without fetching them.
    pub fn count_only(filter: Filter) -> Self {
        Self {
            filter,
            limit: None,
            count: true,
            head: true,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectResponse {
    pub rows: Vec<Value>,
    pub count: Option<usize>,
}

impl SelectResponse {
    /// The exact count when one was requested, the row count otherwise.
    pub fn total(&self) -> usize {
        self.count.unwrap_or(self.rows.len())
    }
}

/// An account as returned by the backend's auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

/// Table-level operations exposed by the hosted backend.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<SelectResponse>;

    /// Inserts one or more rows. With `returning`, the stored rows are
    /// returned (including backend-generated ids); otherwise the result is
    /// empty.
    async fn insert(&self, table: &str, rows: Vec<Value>, returning: bool) -> Result<Vec<Value>>;

    /// Shallow-merges `patch` into every matching row and returns them.
    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> Result<Vec<Value>>;

    /// Inserts rows, merging into existing rows that share `on_conflict`.
    async fn upsert(&self, table: &str, rows: Vec<Value>, on_conflict: &str)
    -> Result<Vec<Value>>;

    /// Deletes matching rows and returns how many were removed.
    async fn delete(&self, table: &str, filter: &Filter) -> Result<usize>;

    fn auth(&self) -> &dyn RemoteAuth;
}

/// The backend's account service.
#[async_trait]
pub trait RemoteAuth: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<RemoteUser>;

    async fn resend_verification(&self, email: &str) -> Result<()>;

    async fn current_user(&self) -> Result<Option<RemoteUser>>;

    async fn refresh_session(&self) -> Result<()>;

    async fn reset_password(&self, email: &str) -> Result<()>;
}
