//! Application layer for the Worldhire demo kernel.
//!
//! Coordinates the demo dataset with the mock session authenticator and
//! provisions demo content in the hosted backend.

pub mod auth_service;
pub mod seed;
pub mod telemetry;

pub use auth_service::SessionAuthenticator;
pub use seed::SeedService;
pub use telemetry::init_tracing;
