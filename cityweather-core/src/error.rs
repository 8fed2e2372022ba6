//! Failure types for the per-area fetch/decode pipeline.
//!
//! Missing sub-fields in an otherwise valid payload are not errors: the
//! normalizer leaves them empty. Only transport and decoding problems are
//! represented here.

use thiserror::Error;

/// Upstream transport failure for a single area.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Upstream payload could not be turned into forecast documents.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid forecast JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response contained no forecast documents")]
    Empty,
}

/// Failure at the per-area boundary. The display text ends up in
/// `CityWeather::error` and `Snapshot::last_error`.
#[derive(Debug, Error)]
pub enum AreaError {
    #[error("fetch failed (area {area_code}): {source}")]
    Fetch {
        area_code: String,
        #[source]
        source: FetchError,
    },

    #[error("decode failed (area {area_code}): {source}")]
    Decode {
        area_code: String,
        #[source]
        source: DecodeError,
    },
}

impl AreaError {
    pub fn fetch(area_code: &str, source: FetchError) -> Self {
        Self::Fetch { area_code: area_code.to_string(), source }
    }

    pub fn decode(area_code: &str, source: DecodeError) -> Self {
        Self::Decode { area_code: area_code.to_string(), source }
    }

    pub fn area_code(&self) -> &str {
        match self {
            Self::Fetch { area_code, .. } | Self::Decode { area_code, .. } => area_code,
        }
    }
}
