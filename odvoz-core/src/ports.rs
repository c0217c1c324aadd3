//! Traits describing the external collaborators of the engine.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{MunicipalityId, MunicipalityMeta, RawPickup, Settings};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to a schedule backend.
///
/// A failed fetch is always distinguishable from a legitimately empty
/// schedule, which is reported as `Ok(vec![])`.
pub enum ProviderError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The backend does not know the requested municipality.
    #[error("Unknown municipality: {0}")]
    UnknownMunicipality(String),
    /// The backend response could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while loading or saving persisted settings.
pub enum SettingsError {
    /// Underlying storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored settings could not be decoded.
    #[error("Malformed settings: {0}")]
    Decode(String),
}

#[async_trait]
/// Trait for backends that deliver raw pickup schedules.
pub trait ScheduleProvider: Send + Sync {
    /// Fetch the raw pickup records for a municipality.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the backend request fails; an
    /// empty schedule is not an error.
    async fn fetch_schedule(
        &self,
        municipality: &MunicipalityId,
    ) -> Result<Vec<RawPickup>, ProviderError>;
}

#[async_trait]
/// Trait for backends that list the municipalities available for selection.
pub trait MunicipalityDirectory: Send + Sync {
    /// List all known municipalities with their display names.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the backend request fails.
    async fn list_municipalities(&self) -> Result<Vec<MunicipalityMeta>, ProviderError>;
}

/// Trait for persisting the user's municipality choice and notification
/// preferences.
pub trait SettingsStore {
    /// Load the persisted settings, falling back to defaults when nothing
    /// has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when the store exists but cannot be
    /// read or decoded.
    fn load(&self) -> Result<Settings, SettingsError>;

    /// Persist the given settings wholesale.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when the store cannot be written.
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}
