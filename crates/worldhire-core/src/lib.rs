//! Domain types and collaborator traits for the Worldhire demo kernel.

pub mod clock;
pub mod collection;
pub mod config;
pub mod error;
pub mod record;
pub mod remote;
pub mod seed;
pub mod session;
pub mod store;
pub mod user;

// Re-export common types
pub use clock::{Clock, ManualClock, SystemClock};
pub use collection::CollectionName;
pub use config::{KernelConfig, RemoteConfig, SeedConfig};
pub use error::{Result, WorldhireError};
pub use record::Record;
pub use remote::{Filter, RemoteAuth, RemoteBackend, RemoteUser, SelectQuery, SelectResponse};
pub use seed::SeedResult;
pub use session::{AuthOutcome, Session};
pub use store::{PersistentSlot, SeedSource, Store};
pub use user::{Role, SignupRequest, User};
