//! Raw JMA forecast documents.
//!
//! A response for one area is a JSON array: index 0 is the short-range
//! document (today/tomorrow), index 1, when present, the extended-range one.
//! Every data array on a sub-area is optional and its meaning depends on the
//! block it sits in, so nothing here interprets positions. See `normalize`.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::error::DecodeError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDocument {
    #[serde(default)]
    pub publishing_office: Option<String>,
    #[serde(default)]
    pub report_datetime: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub time_defines: Vec<String>,
    #[serde(default)]
    pub areas: Vec<SubArea>,
}

impl TimeSeries {
    /// The sub-area the extraction rules read from.
    pub fn first_area(&self) -> Option<&SubArea> {
        self.areas.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AreaRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubArea {
    #[serde(default)]
    pub area: AreaRef,
    pub weather_codes: Option<Vec<String>>,
    pub weathers: Option<Vec<String>>,
    pub winds: Option<Vec<String>>,
    pub waves: Option<Vec<String>>,
    pub pops: Option<Vec<String>>,
    pub temps: Option<Vec<String>>,
    pub temps_min: Option<Vec<String>>,
    pub temps_max: Option<Vec<String>>,
    pub reliabilities: Option<Vec<String>>,
}

impl SubArea {
    pub fn weather_codes(&self) -> &[String] {
        self.weather_codes.as_deref().unwrap_or_default()
    }

    pub fn weathers(&self) -> &[String] {
        self.weathers.as_deref().unwrap_or_default()
    }

    pub fn winds(&self) -> &[String] {
        self.winds.as_deref().unwrap_or_default()
    }

    pub fn pops(&self) -> &[String] {
        self.pops.as_deref().unwrap_or_default()
    }

    pub fn temps(&self) -> &[String] {
        self.temps.as_deref().unwrap_or_default()
    }

    pub fn temps_min(&self) -> &[String] {
        self.temps_min.as_deref().unwrap_or_default()
    }

    pub fn temps_max(&self) -> &[String] {
        self.temps_max.as_deref().unwrap_or_default()
    }

    pub fn reliabilities(&self) -> &[String] {
        self.reliabilities.as_deref().unwrap_or_default()
    }
}

/// Decode a provider response into its forecast documents.
///
/// The top level must be an array of objects. An empty array is rejected
/// since there is no short-range document to normalize.
pub fn parse_documents(bytes: &[u8]) -> Result<Vec<ForecastDocument>, DecodeError> {
    let documents: Vec<ForecastDocument> = serde_json::from_slice(bytes)?;

    if documents.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(documents)
}
