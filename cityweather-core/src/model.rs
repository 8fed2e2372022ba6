use serde::{Deserialize, Serialize};

/// One calendar day of the extended-range forecast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyWeather {
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<String>,
    /// Forecast reliability grade (A, B, C).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<String>,
}

impl WeeklyWeather {
    pub fn new(date: impl Into<String>) -> Self {
        Self { date: date.into(), ..Self::default() }
    }
}

/// Normalized forecast for one configured area.
///
/// Values are kept as the provider's strings; anything the provider omitted
/// stays `None` (or an empty list for `pops`/`winds`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityWeather {
    /// Area code used for the request, not the one echoed in the document.
    pub area_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tomorrow_weather: Option<String>,
    /// Name of the observation point the temperatures belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_area_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_today_high: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_tmrw_low: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_tmrw_high: Option<String>,
    #[serde(rename = "Pops", default)]
    pub pops: Vec<String>,
    #[serde(rename = "Winds", default)]
    pub winds: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_forecast: Option<Vec<WeeklyWeather>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CityWeather {
    pub fn new(area_code: impl Into<String>) -> Self {
        Self { area_code: area_code.into(), ..Self::default() }
    }

    /// Record for an area whose fetch or decode failed.
    pub fn failed(area_code: impl Into<String>, error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::new(area_code) }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of one aggregation cycle. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub city_weather: Vec<CityWeather>,
    /// Last failure seen during the cycle, for reference only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Snapshot {
    pub fn succeeded(&self) -> usize {
        self.city_weather.iter().filter(|c| !c.is_error()).count()
    }
}
