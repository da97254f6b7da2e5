//! Location directory lookups (divisions, districts, upazilas).

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::protocol::{DirectoryEnvelope, DistrictEntry, DivisionEntry, UpazilaEntry};
use tracing::debug;
use url::Url;

use crate::error::DirectoryError;

#[async_trait]
pub trait LocationDirectory: Send + Sync {
    async fn list_divisions(&self) -> Result<Vec<String>, DirectoryError>;
    async fn list_districts(&self, division: &str) -> Result<Vec<String>, DirectoryError>;
    async fn list_upazilas(&self, district: &str) -> Result<Vec<String>, DirectoryError>;
}

/// HTTP client for the directory service. No caching: every call is one GET.
pub struct HttpLocationDirectory {
    http: Client,
    base_url: Url,
}

impl HttpLocationDirectory {
    pub fn new(base_url: &str) -> Result<Self, DirectoryError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, DirectoryError> {
        let base_url =
            Url::parse(base_url).map_err(|_| DirectoryError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| DirectoryError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, DirectoryError> {
        debug!(%url, "directory lookup");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
            });
        }
        let envelope: DirectoryEnvelope<T> = response
            .json()
            .await
            .map_err(|err| DirectoryError::Decode(err.to_string()))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl LocationDirectory for HttpLocationDirectory {
    async fn list_divisions(&self) -> Result<Vec<String>, DirectoryError> {
        let rows: Vec<DivisionEntry> = self.fetch(self.endpoint(&["divisions"])?).await?;
        Ok(rows.into_iter().map(|row| row.division).collect())
    }

    async fn list_districts(&self, division: &str) -> Result<Vec<String>, DirectoryError> {
        let rows: Vec<DistrictEntry> = self.fetch(self.endpoint(&["division", division])?).await?;
        Ok(rows.into_iter().map(|row| row.district).collect())
    }

    async fn list_upazilas(&self, district: &str) -> Result<Vec<String>, DirectoryError> {
        let rows: Vec<UpazilaEntry> = self.fetch(self.endpoint(&["district", district])?).await?;
        // Only the first row carries the list.
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.upazillas)
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
