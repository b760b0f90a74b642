use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;
use worldhire_application::SessionAuthenticator;
use worldhire_core::{
    AuthOutcome, Clock, CollectionName, KernelConfig, ManualClock, PersistentSlot, Role, SignupRequest,
};
use worldhire_infrastructure::{DemoDataService, FileSlotStore, StaticSeedSource};

fn seeds() -> Arc<StaticSeedSource> {
    Arc::new(StaticSeedSource::empty().with_collection(
        CollectionName::Users,
        json!([
            {
                "id": "user-worker",
                "email": "worker@demo.com",
                "passwordHash": "demo123",
                "role": "worker",
                "name": "Demo Worker"
            }
        ]),
    ))
}

async fn open(dir: &TempDir, clock: &ManualClock) -> (DemoDataService, SessionAuthenticator) {
    let config = KernelConfig::default();
    let slots: Arc<dyn PersistentSlot> = Arc::new(FileSlotStore::new(dir.path()));
    let data = DemoDataService::new(slots.clone(), seeds(), &config);
    let auth = SessionAuthenticator::new(data.clone(), slots, Arc::new(clock.clone()), &config).await;
    (data, auth)
}

#[tokio::test]
async fn test_signup_login_logout_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    let (data, auth) = open(&temp_dir, &clock).await;

    let request = SignupRequest::new("w@test.com", "pw123", "W", Role::Worker).with_phone("+1");
    let outcome = AuthOutcome::from(auth.signup(request).await);
    assert!(outcome.success, "signup failed: {:?}", outcome.error);

    let user = auth.current_user().await.expect("signed-up user is logged in");
    assert_eq!(user.email, "w@test.com");
    assert_eq!(user.phone.as_deref(), Some("+1"));
    assert!(auth.is_authenticated().await);
    assert!(auth.has_role(Role::Worker).await);

    let stored = data.users().get_by_email("w@test.com").await.unwrap().unwrap();
    assert_eq!(stored.id(), format!("user-{}", clock.now().timestamp_millis()));

    auth.logout().await.unwrap();
    assert!(!auth.is_authenticated().await);
    assert!(auth.current_user().await.is_none());

    let outcome = AuthOutcome::from(auth.login("w@test.com", "wrong").await);
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_session_and_users_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    {
        let (_, auth) = open(&temp_dir, &clock).await;
        auth.signup(SignupRequest::new("new@test.com", "pw", "New", Role::Employer))
            .await
            .unwrap();
    }

    clock.advance(Duration::hours(2));
    let (data, auth) = open(&temp_dir, &clock).await;
    assert_eq!(
        auth.current_user().await.map(|user| user.email),
        Some("new@test.com".to_string())
    );

    data.initialize().await.unwrap();
    assert_eq!(data.users().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_expiry_boundary() {
    let temp_dir = TempDir::new().unwrap();
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    let (_, auth) = open(&temp_dir, &clock).await;

    auth.login("worker@demo.com", "demo123").await.unwrap();
    let expires_at = auth.session().await.unwrap().expires_at;
    assert_eq!(expires_at, start + Duration::hours(24));

    clock.set(expires_at - Duration::seconds(1));
    assert!(auth.is_authenticated().await);

    clock.set(expires_at);
    assert!(!auth.is_authenticated().await);

    clock.set(expires_at + Duration::days(3));
    assert!(!auth.is_authenticated().await);
}
