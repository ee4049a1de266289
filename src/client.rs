// Hydrology open-data API client
// Query building and bearer attachment; all token logic lives in the auth
// module

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::Authenticator;
use crate::error::{ApiError, ApiResult};
use crate::models::{BasinInfo, CountyInfo, RiverStationInfo, TownInfo, UswgStationInfo};

/// Query parameter accepted by `river/stations`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiverStationParam {
    CountyName,
    TownName,
    CountyCode,
    TownCode,
    BasinName,
    BasinCode,
}

impl RiverStationParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiverStationParam::CountyName => "countyName",
            RiverStationParam::TownName => "townName",
            RiverStationParam::CountyCode => "countyCode",
            RiverStationParam::TownCode => "townCode",
            RiverStationParam::BasinName => "basinName",
            RiverStationParam::BasinCode => "basinCode",
        }
    }
}

/// Query parameter accepted by `uswg/stations`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UswgStationParam {
    CountyName,
    TownName,
    CountyCode,
    TownCode,
}

impl UswgStationParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            UswgStationParam::CountyName => "countyName",
            UswgStationParam::TownName => "townName",
            UswgStationParam::CountyCode => "countyCode",
            UswgStationParam::TownCode => "townCode",
        }
    }
}

/// Client for the hydrology open-data API.
///
/// Obtains a bearer token from the shared [`Authenticator`] before every
/// request. When no token is available the request fails client-side and is
/// never sent unauthenticated.
pub struct HodApiClient {
    client: Client,
    base_url: Url,
    authenticator: Arc<Authenticator>,
}

impl HodApiClient {
    pub fn new(base_url: &str, authenticator: Arc<Authenticator>) -> ApiResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            authenticator,
        })
    }

    /// County codes from `adminDivisions/county`
    pub async fn counties(&self) -> ApiResult<Vec<CountyInfo>> {
        self.get("adminDivisions/county", &[]).await
    }

    /// Town codes from `adminDivisions/town`
    pub async fn towns(&self) -> ApiResult<Vec<TownInfo>> {
        self.get("adminDivisions/town", &[]).await
    }

    /// River-basin codes from `river/basins`
    pub async fn river_basins(&self) -> ApiResult<Vec<BasinInfo>> {
        self.get("river/basins", &[]).await
    }

    /// River water-level stations matching one query parameter
    pub async fn river_stations(
        &self,
        param: RiverStationParam,
        value: &str,
    ) -> ApiResult<Vec<RiverStationInfo>> {
        self.get("river/stations", &[(param.as_str(), value.to_string())])
            .await
    }

    /// River water-level stations within `radius` meters of a WGS84 center
    pub async fn river_stations_within(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> ApiResult<Vec<RiverStationInfo>> {
        self.get("river/stations", &spatial_query(latitude, longitude, radius))
            .await
    }

    /// Urban flood-sensing stations matching one query parameter
    pub async fn uswg_stations(
        &self,
        param: UswgStationParam,
        value: &str,
    ) -> ApiResult<Vec<UswgStationInfo>> {
        self.get("uswg/stations", &[(param.as_str(), value.to_string())])
            .await
    }

    /// Urban flood-sensing stations within `radius` meters of a WGS84 center
    pub async fn uswg_stations_within(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> ApiResult<Vec<UswgStationInfo>> {
        self.get("uswg/stations", &spatial_query(latitude, longitude, radius))
            .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let token = self.authenticator.get_access_token(false).await?;

        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid endpoint {path}: {e}")))?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }

        tracing::debug!(url = %url, "Fetching");
        let response = self
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "API request failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

fn spatial_query(latitude: f64, longitude: f64, radius: f64) -> [(&'static str, String); 3] {
    [
        ("centerLat", latitude.to_string()),
        ("centerLong", longitude.to_string()),
        ("radius", radius.to_string()),
    ]
}

fn parse_base_url(base_url: &str) -> ApiResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ApiError::Transport(format!("invalid base url {base_url}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
