//! In-process implementation of the hosted backend surface.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use worldhire_core::error::{Result, WorldhireError};
use worldhire_core::{Filter, RemoteAuth, RemoteBackend, RemoteUser, SelectQuery, SelectResponse};

/// Table written by `sign_up`, standing in for the hosted profile trigger.
pub const PROFILES_TABLE: &str = "profiles";

#[derive(Default)]
struct BackendState {
    tables: HashMap<String, Vec<Value>>,
    accounts: Vec<(RemoteUser, String)>,
    current: Option<RemoteUser>,
    failing_tables: HashSet<String>,
    failing_signups: HashSet<String>,
}

/// A table store that behaves like the hosted backend for demos and tests.
///
/// Rows without an `id` get a UUID on insert. Signing up also writes a
/// `profiles` row (`id`, `email`, `full_name`, `role`) from the metadata.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<BackendState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows of `table`, in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .lock()
            .await
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn row_count(&self, table: &str) -> usize {
        self.state
            .lock()
            .await
            .tables
            .get(table)
            .map_or(0, Vec::len)
    }

    pub async fn account_count(&self) -> usize {
        self.state.lock().await.accounts.len()
    }

    /// Makes every write to `table` fail.
    pub async fn fail_writes_to(&self, table: &str) {
        self.state.lock().await.failing_tables.insert(table.to_string());
    }

    /// Makes signing up `email` fail.
    pub async fn fail_sign_up_for(&self, email: &str) {
        self.state.lock().await.failing_signups.insert(email.to_string());
    }

    fn check_writable(state: &BackendState, table: &str) -> Result<()> {
        if state.failing_tables.contains(table) {
            return Err(WorldhireError::remote(format!(
                "simulated write failure on '{}'",
                table
            )));
        }
        Ok(())
    }

    fn with_id(row: Value) -> Result<Value> {
        let Value::Object(mut object) = row else {
            return Err(WorldhireError::remote("rows must be JSON objects"));
        };
        if !object.contains_key("id") {
            object.insert(
                "id".to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
        Ok(Value::Object(object))
    }
}

fn merge_into(target: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(object) = target {
        for (key, value) in patch {
            object.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl RemoteBackend for MemoryBackend {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<SelectResponse> {
        let state = self.state.lock().await;
        let matching: Vec<Value> = state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let count = query.count.then_some(matching.len());
        let rows = if query.head {
            Vec::new()
        } else {
            let limit = query.limit.unwrap_or(usize::MAX);
            matching.into_iter().take(limit).collect()
        };
        Ok(SelectResponse { rows, count })
    }

    async fn insert(&self, table: &str, rows: Vec<Value>, returning: bool) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        Self::check_writable(&state, table)?;

        let rows = rows
            .into_iter()
            .map(Self::with_id)
            .collect::<Result<Vec<_>>>()?;
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows.iter().cloned());

        Ok(if returning { rows } else { Vec::new() })
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        Self::check_writable(&state, table)?;
        let Value::Object(patch) = patch else {
            return Err(WorldhireError::remote("update patch must be a JSON object"));
        };

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| filter.matches(row)) {
                merge_into(row, &patch);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        Self::check_writable(&state, table)?;

        let keys: Vec<&str> = on_conflict.split(',').map(str::trim).collect();
        let existing = state.tables.entry(table.to_string()).or_default();
        let mut written = Vec::new();

        for row in rows {
            let Value::Object(patch) = &row else {
                return Err(WorldhireError::remote("rows must be JSON objects"));
            };
            let conflict = existing.iter_mut().find(|candidate| {
                keys.iter()
                    .all(|key| candidate.get(*key).is_some() && candidate.get(*key) == patch.get(*key))
            });
            match conflict {
                Some(current) => {
                    merge_into(current, patch);
                    written.push(current.clone());
                }
                None => {
                    let row = Self::with_id(row)?;
                    existing.push(row.clone());
                    written.push(row);
                }
            }
        }
        Ok(written)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<usize> {
        let mut state = self.state.lock().await;
        Self::check_writable(&state, table)?;

        let Some(rows) = state.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !filter.matches(row));
        Ok(before - rows.len())
    }

    fn auth(&self) -> &dyn RemoteAuth {
        self
    }
}

#[async_trait]
impl RemoteAuth for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<RemoteUser> {
        let mut state = self.state.lock().await;
        if state.failing_signups.contains(email) {
            return Err(WorldhireError::remote(format!(
                "simulated sign-up failure for {}",
                email
            )));
        }
        if state
            .accounts
            .iter()
            .any(|(account, _)| account.email.as_deref() == Some(email))
        {
            return Err(WorldhireError::remote("User already registered"));
        }

        let user = RemoteUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            user_metadata: metadata.clone(),
        };

        let mut profile = Map::new();
        profile.insert("id".to_string(), Value::String(user.id.clone()));
        profile.insert("email".to_string(), Value::String(email.to_string()));
        for field in ["full_name", "role", "phone"] {
            if let Some(value) = metadata.get(field) {
                profile.insert(field.to_string(), value.clone());
            }
        }
        state
            .tables
            .entry(PROFILES_TABLE.to_string())
            .or_default()
            .push(Value::Object(profile));

        state.accounts.push((user.clone(), password.to_string()));
        state.current = Some(user.clone());
        Ok(user)
    }

    async fn resend_verification(&self, email: &str) -> Result<()> {
        let state = self.state.lock().await;
        if state
            .accounts
            .iter()
            .any(|(account, _)| account.email.as_deref() == Some(email))
        {
            Ok(())
        } else {
            Err(WorldhireError::remote(format!("No account for {}", email)))
        }
    }

    async fn current_user(&self) -> Result<Option<RemoteUser>> {
        Ok(self.state.lock().await.current.clone())
    }

    async fn refresh_session(&self) -> Result<()> {
        if self.state.lock().await.current.is_some() {
            Ok(())
        } else {
            Err(WorldhireError::remote("No active session to refresh"))
        }
    }

    async fn reset_password(&self, _email: &str) -> Result<()> {
        Ok(())
    }
}
