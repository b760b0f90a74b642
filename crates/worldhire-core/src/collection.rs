//! Named collections held by the demo store.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Every collection the demo store knows about.
///
/// The first ten ship with static seed documents. The remaining ones were
/// added to the schema after the seed files were authored and always start
/// empty.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CollectionName {
    Users,
    WorkerProfiles,
    Companies,
    Factories,
    Skills,
    WorkerSkills,
    Certifications,
    MediaAssets,
    Jobs,
    Applications,
    Trainings,
    Contracts,
    TravelDocuments,
    InsurancePolicies,
    Remittances,
}

impl CollectionName {
    /// All collections, in declaration order.
    pub fn all() -> impl Iterator<Item = CollectionName> {
        Self::iter()
    }

    /// Collections that have a static seed document.
    pub fn seeded() -> impl Iterator<Item = CollectionName> {
        Self::iter().filter(|name| name.is_seeded())
    }

    pub fn is_seeded(&self) -> bool {
        !matches!(
            self,
            Self::Trainings
                | Self::Contracts
                | Self::TravelDocuments
                | Self::InsurancePolicies
                | Self::Remittances
        )
    }

    /// File name of the static seed document for this collection.
    pub fn seed_file(&self) -> &'static str {
        match self {
            Self::Users => "users.json",
            Self::WorkerProfiles => "worker_profiles.json",
            Self::Companies => "companies.json",
            Self::Factories => "factories.json",
            Self::Skills => "skills.json",
            Self::WorkerSkills => "worker_skills.json",
            Self::Certifications => "certifications.json",
            Self::MediaAssets => "media_assets.json",
            Self::Jobs => "jobs.json",
            Self::Applications => "applications.json",
            Self::Trainings => "trainings.json",
            Self::Contracts => "contracts.json",
            Self::TravelDocuments => "travel_documents.json",
            Self::InsurancePolicies => "insurance_policies.json",
            Self::Remittances => "remittances.json",
        }
    }
}
