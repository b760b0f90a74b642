//! Mock session authenticator over the demo `users` collection.

use std::sync::Arc;

use tokio::sync::RwLock;
use worldhire_core::error::{Result, WorldhireError};
use worldhire_core::{Clock, KernelConfig, PersistentSlot, Record, Role, Session, SignupRequest, User};
use worldhire_infrastructure::DemoDataService;

/// Issues and tracks the single demo session.
///
/// The session lives in memory and in its own persistent slot, separate from
/// the dataset store. Expiry is lazy: every read compares `expires_at` with
/// the clock instead of trusting cached state.
///
/// Credentials are compared in plaintext. This is a demo stand-in, not an
/// authentication system.
pub struct SessionAuthenticator {
    data: DemoDataService,
    slots: Arc<dyn PersistentSlot>,
    clock: Arc<dyn Clock>,
    session_key: String,
    token_prefix: String,
    otp_code: String,
    ttl_hours: i64,
    session: RwLock<Option<Session>>,
}

impl SessionAuthenticator {
    /// Creates the authenticator and restores a persisted session.
    ///
    /// An expired or unreadable persisted session is purged from storage.
    pub async fn new(
        data: DemoDataService,
        slots: Arc<dyn PersistentSlot>,
        clock: Arc<dyn Clock>,
        config: &KernelConfig,
    ) -> Self {
        let restored = Self::restore(slots.as_ref(), clock.as_ref(), &config.session_key).await;
        Self {
            data,
            slots,
            clock,
            session_key: config.session_key.clone(),
            token_prefix: config.token_prefix.clone(),
            otp_code: config.otp_code.clone(),
            ttl_hours: config.session_ttl_hours,
            session: RwLock::new(restored),
        }
    }

    async fn restore(slots: &dyn PersistentSlot, clock: &dyn Clock, key: &str) -> Option<Session> {
        let value = slots.load(key).await?;

        let session = match serde_json::from_value::<Session>(value) {
            Ok(session) if session.is_valid_at(clock.now()) => {
                tracing::debug!("Restored session for {}", session.user.email);
                return Some(session);
            }
            Ok(session) => {
                tracing::info!("Persisted session for {} has expired", session.user.email);
                session
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable session '{}': {}", key, e);
                if let Err(e) = slots.clear(key).await {
                    tracing::warn!("Failed to purge session '{}': {}", key, e);
                }
                return None;
            }
        };

        if let Err(e) = slots.clear(key).await {
            tracing::warn!("Failed to purge expired session for {}: {}", session.user.email, e);
        }
        None
    }

    /// Logs in with plaintext credentials and persists a fresh session.
    ///
    /// # Errors
    ///
    /// `UserNotFound` when no user has `email`, `InvalidCredentials` on a
    /// password mismatch, `Config` when the session lifetime is out of range.
    /// Dataset and storage failures propagate.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        self.data.initialize().await?;

        let record = self
            .data
            .users()
            .get_by_email(email)
            .await?
            .ok_or_else(|| WorldhireError::user_not_found(email))?;
        let user: User = record.to_entity()?;

        if user.password_hash != password {
            tracing::debug!("Password mismatch for {}", email);
            return Err(WorldhireError::InvalidCredentials);
        }

        let ttl = KernelConfig::ttl_from_hours(self.ttl_hours)?;
        let session = Session::issue(user.clone(), &self.token_prefix, self.clock.now(), ttl)?;
        self.slots
            .save(&self.session_key, &serde_json::to_value(&session)?)
            .await?;
        *self.session.write().await = Some(session);

        tracing::info!("Logged in {} as {}", user.email, user.role);
        Ok(user)
    }

    /// Creates a user and logs them in.
    ///
    /// # Errors
    ///
    /// `EmailTaken` when a user with the same email exists.
    pub async fn signup(&self, request: SignupRequest) -> Result<User> {
        self.data.initialize().await?;
        let users = self.data.users();

        if users.get_by_email(&request.email).await?.is_some() {
            return Err(WorldhireError::email_taken(&request.email));
        }

        let now = self.clock.now();
        let user = User {
            id: self.next_user_id(now.timestamp_millis()).await?,
            email: request.email,
            password_hash: request.password,
            role: request.role,
            name: request.full_name,
            phone: request.phone,
            created_at: Some(now),
        };
        users.create(Record::from_entity(&user)?).await?;
        tracing::info!("Signed up {} ({})", user.email, user.id);

        self.login(&user.email, &user.password_hash).await
    }

    /// `user-<millis>`, suffixed with `-<n>` when that id is already taken.
    async fn next_user_id(&self, millis: i64) -> Result<String> {
        let users = self.data.users();
        let base = format!("user-{}", millis);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while users.get_by_id(&candidate).await?.is_some() {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        Ok(candidate)
    }

    /// Accepts only the configured fixed code. Nothing is consumed.
    pub fn verify_otp(&self, code: &str) -> Result<()> {
        if code == self.otp_code {
            Ok(())
        } else {
            Err(WorldhireError::InvalidOtp)
        }
    }

    /// Ends the session. Logging out without a session is not an error.
    pub async fn logout(&self) -> Result<()> {
        if let Some(session) = self.session.write().await.take() {
            tracing::info!("Logged out {}", session.user.email);
        }
        self.slots.clear(&self.session_key).await
    }

    /// The current session, if it has not expired.
    pub async fn session(&self) -> Option<Session> {
        let now = self.clock.now();
        self.session
            .read()
            .await
            .as_ref()
            .filter(|session| session.is_valid_at(now))
            .cloned()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session().await.map(|session| session.user)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session().await.is_some()
    }

    pub async fn has_role(&self, role: Role) -> bool {
        self.session()
            .await
            .is_some_and(|session| session.user.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;
    use worldhire_core::{CollectionName, ManualClock};
    use worldhire_infrastructure::{MemorySlotStore, StaticSeedSource};

    fn seeds() -> StaticSeedSource {
        StaticSeedSource::empty().with_collection(
            CollectionName::Users,
            json!([
                {
                    "id": "user-employer",
                    "email": "employer@demo.com",
                    "passwordHash": "demo123",
                    "role": "employer",
                    "name": "Demo Employer"
                }
            ]),
        )
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
    }

    async fn authenticator(
        slots: Arc<MemorySlotStore>,
        clock: ManualClock,
    ) -> SessionAuthenticator {
        let config = KernelConfig::default();
        let data = DemoDataService::new(slots.clone(), Arc::new(seeds()), &config);
        SessionAuthenticator::new(data, slots, Arc::new(clock), &config).await
    }

    #[tokio::test]
    async fn test_login_initializes_dataset_and_persists_session() {
        let slots = Arc::new(MemorySlotStore::new());
        let auth = authenticator(slots.clone(), clock()).await;

        let user = auth.login("employer@demo.com", "demo123").await.unwrap();
        assert_eq!(user.role, Role::Employer);
        assert!(auth.has_role(Role::Employer).await);
        assert!(!auth.has_role(Role::Admin).await);

        let stored: Session =
            serde_json::from_value(slots.load("worldhire_session").await.unwrap()).unwrap();
        assert!(stored.token.starts_with("mock_token_user-employer_"));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let auth = authenticator(Arc::new(MemorySlotStore::new()), clock()).await;

        assert!(matches!(
            auth.login("ghost@demo.com", "x").await,
            Err(WorldhireError::UserNotFound { .. })
        ));
        assert!(matches!(
            auth.login("employer@demo.com", "wrong").await,
            Err(WorldhireError::InvalidCredentials)
        ));
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_email() {
        let auth = authenticator(Arc::new(MemorySlotStore::new()), clock()).await;
        let request = SignupRequest::new("employer@demo.com", "pw", "Again", Role::Employer);

        let err = auth.signup(request).await.unwrap_err();
        assert!(matches!(err, WorldhireError::EmailTaken { .. }));
    }

    #[tokio::test]
    async fn test_signups_in_same_millisecond_get_distinct_ids() {
        let slots = Arc::new(MemorySlotStore::new());
        let config = KernelConfig::default();
        let data = DemoDataService::new(slots.clone(), Arc::new(seeds()), &config);
        let auth = SessionAuthenticator::new(data.clone(), slots, Arc::new(clock()), &config).await;

        let a = auth
            .signup(SignupRequest::new("a@test.com", "pw", "A", Role::Worker))
            .await
            .unwrap();
        let b = auth
            .signup(SignupRequest::new("b@test.com", "pw", "B", Role::Worker))
            .await
            .unwrap();
        let c = auth
            .signup(SignupRequest::new("c@test.com", "pw", "C", Role::Worker))
            .await
            .unwrap();

        assert_eq!(b.id, format!("{}-1", a.id));
        assert_eq!(c.id, format!("{}-2", a.id));

        let users = data.users();
        for user in [&a, &b, &c] {
            let stored: User = users.get_by_id(&user.id).await.unwrap().unwrap().to_entity().unwrap();
            assert_eq!(stored.email, user.email);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_fails_login_without_panicking() {
        let slots = Arc::new(MemorySlotStore::new());
        let config = KernelConfig {
            session_ttl_hours: i64::MAX,
            ..KernelConfig::default()
        };
        let data = DemoDataService::new(slots.clone(), Arc::new(seeds()), &config);
        let auth = SessionAuthenticator::new(data, slots.clone(), Arc::new(clock()), &config).await;

        let err = auth.login("employer@demo.com", "demo123").await.unwrap_err();
        assert!(matches!(err, WorldhireError::Config(_)));
        assert!(!auth.is_authenticated().await);
        assert!(!slots.contains("worldhire_session").await);
    }

    #[tokio::test]
    async fn test_verify_otp() {
        let auth = authenticator(Arc::new(MemorySlotStore::new()), clock()).await;

        assert!(auth.verify_otp("000000").is_ok());
        assert!(auth.verify_otp("000000").is_ok());
        assert!(matches!(auth.verify_otp("123456"), Err(WorldhireError::InvalidOtp)));
    }

    #[tokio::test]
    async fn test_expiry_is_checked_on_every_read() {
        let slots = Arc::new(MemorySlotStore::new());
        let clock = clock();
        let auth = authenticator(slots, clock.clone()).await;
        auth.login("employer@demo.com", "demo123").await.unwrap();

        clock.advance(Duration::hours(24) - Duration::milliseconds(1));
        assert!(auth.is_authenticated().await);

        clock.advance(Duration::milliseconds(1));
        assert!(!auth.is_authenticated().await);
        assert!(auth.current_user().await.is_none());
        assert!(!auth.has_role(Role::Employer).await);
    }

    #[tokio::test]
    async fn test_restart_restores_valid_session() {
        let slots = Arc::new(MemorySlotStore::new());
        let clock = clock();
        authenticator(slots.clone(), clock.clone())
            .await
            .login("employer@demo.com", "demo123")
            .await
            .unwrap();

        clock.advance(Duration::hours(1));
        let restarted = authenticator(slots, clock).await;
        assert_eq!(
            restarted.current_user().await.map(|user| user.email),
            Some("employer@demo.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_restart_purges_expired_session() {
        let slots = Arc::new(MemorySlotStore::new());
        let clock = clock();
        authenticator(slots.clone(), clock.clone())
            .await
            .login("employer@demo.com", "demo123")
            .await
            .unwrap();

        clock.advance(Duration::hours(25));
        let restarted = authenticator(slots.clone(), clock).await;
        assert!(!restarted.is_authenticated().await);
        assert!(!slots.contains("worldhire_session").await);
    }

    #[tokio::test]
    async fn test_restart_purges_unreadable_session() {
        let slots = Arc::new(MemorySlotStore::new());
        slots.insert_raw("worldhire_session", "{\"token\": 1}").await;

        let auth = authenticator(slots.clone(), clock()).await;
        assert!(!auth.is_authenticated().await);
        assert!(!slots.contains("worldhire_session").await);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let auth = authenticator(Arc::new(MemorySlotStore::new()), clock()).await;

        auth.logout().await.unwrap();
        auth.login("employer@demo.com", "demo123").await.unwrap();
        auth.logout().await.unwrap();
        auth.logout().await.unwrap();
        assert!(!auth.is_authenticated().await);
    }
}
