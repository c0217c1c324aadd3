//! Provider implementation for the City Waste API.
//!
//! The API is a small JSON service: `GET /cities` lists the known
//! municipalities, `GET /cities/{id}` returns the city together with its
//! pickup dates. Records are passed through as raw strings; validation,
//! canonicalization, and category mapping are the engine's job.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use odvoz_core::{
    model::{MunicipalityId, MunicipalityMeta, RawPickup},
    ports::{MunicipalityDirectory, ProviderError, ScheduleProvider},
};

const BASE_URL: &str = "https://city-waste-api.vercel.app";

/// Municipality entry from `GET /cities`.
#[derive(Debug, Deserialize)]
struct CityEntry {
    id: String,
    name: String,
}

/// City detail from `GET /cities/{id}`.
///
/// The payload carries more fields than we need; `dates` is all the
/// engine consumes, and each entry decodes straight into [`RawPickup`].
#[derive(Debug, Deserialize)]
struct CityDetail {
    #[serde(default)]
    dates: Vec<RawPickup>,
}

/// Municipality listing backed by the City Waste API.
pub struct CityApiDirectory {
    client: Client,
}

impl CityApiDirectory {
    /// Create a new directory bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MunicipalityDirectory for CityApiDirectory {
    async fn list_municipalities(&self) -> Result<Vec<MunicipalityMeta>, ProviderError> {
        let entries =
            fetch_json::<Vec<CityEntry>>(self.client.get(format!("{BASE_URL}/cities"))).await?;
        debug!(municipalities = entries.len(), "listed municipalities");

        Ok(entries
            .into_iter()
            .map(|entry| MunicipalityMeta {
                id: MunicipalityId(entry.id),
                name: entry.name,
            })
            .collect())
    }
}

/// Schedule fetching backed by the City Waste API.
pub struct CityApiScheduleProvider {
    client: Client,
}

impl CityApiScheduleProvider {
    /// Create a new schedule provider bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScheduleProvider for CityApiScheduleProvider {
    async fn fetch_schedule(
        &self,
        municipality: &MunicipalityId,
    ) -> Result<Vec<RawPickup>, ProviderError> {
        let response = self
            .client
            .get(format!("{BASE_URL}/cities/{municipality}"))
            .send()
            .await
            .map_err(ProviderError::from)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ProviderError::UnknownMunicipality(
                municipality.to_string(),
            ));
        }

        let detail: CityDetail = response
            .error_for_status()
            .map_err(ProviderError::from)?
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        debug!(
            municipality = %municipality,
            records = detail.dates.len(),
            "fetched schedule"
        );

        Ok(detail.dates)
    }
}

/// Bundle of ports implementing the City Waste API backend.
pub struct CityApi {
    /// Municipality listing for selection UIs.
    pub directory: Arc<dyn MunicipalityDirectory>,
    /// Raw schedule fetching for the engine.
    pub schedules: Arc<dyn ScheduleProvider>,
}

/// Build the port bundle for the City Waste API.
#[must_use]
pub fn connect(client: Client) -> CityApi {
    CityApi {
        directory: Arc::new(CityApiDirectory::new(client.clone())),
        schedules: Arc::new(CityApiScheduleProvider::new(client)),
    }
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ProviderError> {
    req.send()
        .await
        .map_err(ProviderError::from)?
        .error_for_status()
        .map_err(ProviderError::from)?
        .json()
        .await
        .map_err(|err| ProviderError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{CityDetail, CityEntry};
    use odvoz_core::model::RawPickup;

    #[test]
    fn city_listing_decodes() {
        let payload = r#"[
            {"id": "zgb", "name": "Zagreb"},
            {"id": "st", "name": "Split"}
        ]"#;
        let entries: Vec<CityEntry> = serde_json::from_str(payload).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.first().unwrap().name, "Zagreb");
    }

    #[test]
    fn city_detail_decodes_dates_verbatim() {
        let payload = r#"{
            "id": "zgb",
            "name": "Zagreb",
            "dates": [
                {"date": "2024-05-01T00:00:00.000Z", "waste_type": "Papir"},
                {"date": "2024-05-03", "waste_type": "Bio"}
            ]
        }"#;
        let detail: CityDetail = serde_json::from_str(payload).unwrap();
        assert_eq!(
            detail.dates,
            vec![
                RawPickup::new("2024-05-01T00:00:00.000Z", "Papir"),
                RawPickup::new("2024-05-03", "Bio"),
            ]
        );
    }

    #[test]
    fn city_detail_tolerates_missing_dates() {
        let payload = r#"{"id": "zgb", "name": "Zagreb"}"#;
        let detail: CityDetail = serde_json::from_str(payload).unwrap();
        assert!(detail.dates.is_empty());
    }
}
