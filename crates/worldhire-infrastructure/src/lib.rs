//! Storage, loading and remote plumbing for the Worldhire demo kernel.

pub mod collection_repository;
pub mod config_service;
pub mod dataset_loader;
pub mod demo_data_service;
pub mod paths;
pub mod remote;
pub mod seed_source;
pub mod storage;

pub use collection_repository::CollectionRepository;
pub use config_service::ConfigService;
pub use dataset_loader::DatasetLoader;
pub use demo_data_service::DemoDataService;
pub use paths::{PathError, WorldhirePaths};
pub use remote::{MemoryBackend, RestBackend};
pub use seed_source::{DirSeedSource, StaticSeedSource};
pub use storage::{AtomicJsonError, AtomicJsonFile, FileSlotStore, MemorySlotStore};
