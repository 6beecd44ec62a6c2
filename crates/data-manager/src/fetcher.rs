//! HTTP access to the results API
//!
//! Failures never escape as errors: callers receive [`Fetched::NoData`] with
//! the reason, and render an empty state from it.

use config_system::{KeyValueStore, SettingsStore};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared_types::{ChangePoint, TimeSeriesPoint};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Transport-level failures, mapped to [`NoDataReason`] at the API boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Why a fetch produced no data
#[derive(Debug, Clone, PartialEq)]
pub enum NoDataReason {
    Status(u16),
    Network(String),
    Malformed(String),
}

impl From<FetchError> for NoDataReason {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status(code) => NoDataReason::Status(code),
            FetchError::Transport(msg) | FetchError::InvalidUrl(msg) => NoDataReason::Network(msg),
            FetchError::Decode(msg) => NoDataReason::Malformed(msg),
        }
    }
}

impl std::fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoDataReason::Status(404) => write!(f, "Not found"),
            NoDataReason::Status(code) => write!(f, "HTTP {code}"),
            NoDataReason::Network(msg) => write!(f, "Network error: {msg}"),
            NoDataReason::Malformed(msg) => write!(f, "Malformed response: {msg}"),
        }
    }
}

/// Outcome of one API call
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Data(T),
    NoData(NoDataReason),
}

impl<T> Fetched<T> {
    pub fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => Fetched::Data(data),
            Err(e) => Fetched::NoData(e.into()),
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Fetched::Data(_))
    }

    pub fn data(self) -> Option<T> {
        match self {
            Fetched::Data(data) => Some(data),
            Fetched::NoData(_) => None,
        }
    }
}

/// Source of results and change points for a test
///
/// Futures are not `Send`: everything runs on the page's event loop.
#[allow(async_fn_in_trait)]
pub trait SeriesApi {
    async fn fetch_series(&self, test_name: &str) -> Fetched<Vec<TimeSeriesPoint>>;
    async fn fetch_changes(&self, test_name: &str) -> Fetched<Vec<ChangePoint>>;
}

/// The changes endpoint answers either with a list or keyed by test name
#[derive(Deserialize)]
#[serde(untagged)]
enum ChangesPayload {
    List(Vec<ChangePoint>),
    ByTest(BTreeMap<String, Vec<ChangePoint>>),
}

impl ChangesPayload {
    fn into_changes(self, test_name: &str) -> Vec<ChangePoint> {
        match self {
            ChangesPayload::List(changes) => changes,
            ChangesPayload::ByTest(mut by_test) => by_test.remove(test_name).unwrap_or_default(),
        }
    }
}

/// [`SeriesApi`] over HTTP
pub struct HttpSeriesApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpSeriesApi {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token: None,
        })
    }

    /// Client for the configured endpoint, authenticated with the stored token
    pub fn from_settings<S: KeyValueStore>(settings: &SettingsStore<S>) -> Result<Self, FetchError> {
        Ok(Self::new(&settings.settings().api.base_url)?.with_token(settings.token()))
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// `{base}/api/v0/result/{test...}`, each test-name segment encoded on its own
    pub fn series_url(&self, test_name: &str) -> Result<Url, FetchError> {
        self.result_url(test_name, None)
    }

    /// `{base}/api/v0/result/{test...}/changes`
    pub fn changes_url(&self, test_name: &str) -> Result<Url, FetchError> {
        self.result_url(test_name, Some("changes"))
    }

    fn result_url(&self, test_name: &str, suffix: Option<&str>) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(["api", "v0", "result"]);
            segments.extend(test_name.split('/').filter(|s| !s.is_empty()));
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl SeriesApi for HttpSeriesApi {
    async fn fetch_series(&self, test_name: &str) -> Fetched<Vec<TimeSeriesPoint>> {
        let result = match self.series_url(test_name) {
            Ok(url) => self.get_json::<Vec<TimeSeriesPoint>>(url).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            log::warn!("[HttpSeriesApi] Series fetch for {test_name} failed: {e}");
        }
        Fetched::from_result(result)
    }

    async fn fetch_changes(&self, test_name: &str) -> Fetched<Vec<ChangePoint>> {
        let result = match self.changes_url(test_name) {
            Ok(url) => self
                .get_json::<ChangesPayload>(url)
                .await
                .map(|payload| payload.into_changes(test_name)),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            log::warn!("[HttpSeriesApi] Changes fetch for {test_name} failed: {e}");
        }
        Fetched::from_result(result)
    }
}
