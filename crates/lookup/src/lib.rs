//! Place-search collaborator: geocode a free-text location, then query
//! nearby facilities of the requested category.
//!
//! The trait boundary is deliberately infallible: every failure mode
//! (missing key, network error, non-OK payload status, malformed body) is
//! logged and surfaced to the orchestrator as zero records, never as an
//! error that could escape the turn.

use std::time::Duration;

use care_core::{FacilityCategory, FacilityRecord};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const SEARCH_RADIUS_METERS: u32 = 10_000;
const MAX_RESULTS: usize = 8;

pub trait FacilitySearch: Send + Sync {
    async fn find_facilities(
        &self,
        location: &str,
        category: FacilityCategory,
    ) -> Vec<FacilityRecord>;
}

#[derive(Debug, Error)]
enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("geocoding returned status {0}")]
    GeocodingStatus(String),
    #[error("no geocoding results for location")]
    GeocodingEmpty,
    #[error("places search returned status {0}")]
    PlacesStatus(String),
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: Option<String>,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    opening_hours: Option<OpeningHours>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
}

/// Google-Maps-backed facility search.
#[derive(Debug, Clone)]
pub struct GoogleMapsSearch {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleMapsSearch {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, api_key })
    }

    async fn search(
        &self,
        location: &str,
        category: FacilityCategory,
    ) -> Result<Vec<FacilityRecord>, LookupError> {
        let geocode: GeocodeResponse = self
            .client
            .get(GEOCODING_URL)
            .query(&[("address", location), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if geocode.status != "OK" {
            return Err(LookupError::GeocodingStatus(geocode.status));
        }
        let coords = geocode
            .results
            .first()
            .map(|result| &result.geometry.location)
            .ok_or(LookupError::GeocodingEmpty)?;

        let places: PlacesResponse = self
            .client
            .get(NEARBY_SEARCH_URL)
            .query(&[
                ("location", format!("{},{}", coords.lat, coords.lng)),
                ("radius", SEARCH_RADIUS_METERS.to_string()),
                ("type", category.as_code().to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if places.status != "OK" {
            return Err(LookupError::PlacesStatus(places.status));
        }

        let records = places
            .results
            .into_iter()
            .take(MAX_RESULTS)
            .map(|place| FacilityRecord {
                name: place.name.unwrap_or_else(|| "Unknown".to_string()),
                address: place.vicinity.or(place.formatted_address),
                rating: place.rating.unwrap_or(0.0),
                rating_count: place.user_ratings_total.unwrap_or(0),
                open_now: place.opening_hours.and_then(|hours| hours.open_now),
                tags: place.types,
            })
            .collect();

        Ok(records)
    }
}

impl FacilitySearch for GoogleMapsSearch {
    async fn find_facilities(
        &self,
        location: &str,
        category: FacilityCategory,
    ) -> Vec<FacilityRecord> {
        match self.search(location, category).await {
            Ok(records) => records,
            Err(error) => {
                warn!(
                    category = category.as_code(),
                    error = %error,
                    "facility search degraded to zero records"
                );
                Vec::new()
            }
        }
    }
}

/// Stand-in used when no maps API key is configured; the no-results reply
/// branch handles it downstream.
#[derive(Debug, Clone, Default)]
pub struct DisabledSearch;

impl FacilitySearch for DisabledSearch {
    async fn find_facilities(
        &self,
        _location: &str,
        _category: FacilityCategory,
    ) -> Vec<FacilityRecord> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub enum Search {
    Google(GoogleMapsSearch),
    Disabled(DisabledSearch),
}

impl Search {
    /// Google-backed when a key is present, disabled otherwise.
    pub fn from_api_key(api_key: Option<String>) -> anyhow::Result<Self> {
        match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => Ok(Self::Google(GoogleMapsSearch::new(key)?)),
            None => Ok(Self::Disabled(DisabledSearch)),
        }
    }
}

impl FacilitySearch for Search {
    async fn find_facilities(
        &self,
        location: &str,
        category: FacilityCategory,
    ) -> Vec<FacilityRecord> {
        match self {
            Search::Google(search) => search.find_facilities(location, category).await,
            Search::Disabled(search) => search.find_facilities(location, category).await,
        }
    }
}
