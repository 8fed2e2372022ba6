use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::AreaError,
    forecast::parse_documents,
    model::{CityWeather, Snapshot},
    normalize::normalize,
    provider::ForecastSource,
};

/// Runs fetch, parse and normalize for every configured area and builds a
/// [`Snapshot`]. Failures stay inside their area.
#[derive(Debug, Clone)]
pub struct Aggregator {
    source: Arc<dyn ForecastSource>,
    area_codes: Vec<String>,
}

impl Aggregator {
    pub fn new(source: Arc<dyn ForecastSource>, area_codes: Vec<String>) -> Self {
        Self { source, area_codes }
    }

    /// One full pass over the configured areas, in configured order.
    pub async fn run(&self) -> Snapshot {
        info!(areas = self.area_codes.len(), "refreshing city weather");

        let mut city_weather = Vec::with_capacity(self.area_codes.len());
        let mut last_error = None;

        for area_code in &self.area_codes {
            match self.area(area_code).await {
                Ok(city) => {
                    info!(area_code = %area_code, area_name = ?city.area_name, "area refreshed");
                    city_weather.push(city);
                }
                Err(err) => {
                    let message = err.to_string();
                    warn!(area_code = err.area_code(), error = %message, "area refresh failed");
                    city_weather.push(CityWeather::failed(area_code.as_str(), message.clone()));
                    last_error = Some(message);
                }
            }
        }

        let snapshot = Snapshot { city_weather, last_error };
        info!(
            succeeded = snapshot.succeeded(),
            total = self.area_codes.len(),
            "city weather refresh finished"
        );
        snapshot
    }

    async fn area(&self, area_code: &str) -> Result<CityWeather, AreaError> {
        let body = self
            .source
            .fetch(area_code)
            .await
            .map_err(|e| AreaError::fetch(area_code, e))?;

        let documents = parse_documents(&body).map_err(|e| AreaError::decode(area_code, e))?;

        Ok(normalize(area_code, &documents))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory source keyed by area code. Unknown codes answer 404.
    #[derive(Debug, Default)]
    pub(crate) struct FakeSource {
        bodies: HashMap<String, Vec<u8>>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        pub(crate) fn with(mut self, area_code: &str, body: &str) -> Self {
            self.bodies.insert(area_code.to_string(), body.as_bytes().to_vec());
            self
        }
    }

    #[async_trait]
    impl ForecastSource for FakeSource {
        async fn fetch(&self, area_code: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.lock().push(area_code.to_string());
            self.bodies.get(area_code).cloned().ok_or(FetchError::Status(404))
        }
    }

    pub(crate) fn body_for(name: &str) -> String {
        format!(
            r#"[{{
                "reportDatetime": "2025-04-01T11:00:00+09:00",
                "timeSeries": [
                    {{ "timeDefines": ["2025-04-01T11:00:00+09:00"],
                       "areas": [{{ "area": {{"name": "{name}", "code": "0"}}, "weathers": ["晴れ", "くもり"] }}] }}
                ]
            }}]"#
        )
    }

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn keeps_configured_order() {
        let source = FakeSource::default()
            .with("130000", &body_for("東京地方"))
            .with("270000", &body_for("大阪府"))
            .with("016000", &body_for("石狩地方"));
        let aggregator = Aggregator::new(Arc::new(source), codes(&["270000", "016000", "130000"]));

        let snapshot = aggregator.run().await;

        let order: Vec<_> = snapshot.city_weather.iter().map(|c| c.area_code.as_str()).collect();
        assert_eq!(order, vec!["270000", "016000", "130000"]);
        assert_eq!(snapshot.city_weather[0].area_name.as_deref(), Some("大阪府"));
        assert!(snapshot.last_error.is_none());
        assert_eq!(snapshot.succeeded(), 3);
    }

    #[tokio::test]
    async fn failed_area_does_not_stop_the_rest() {
        let source = FakeSource::default()
            .with("130000", &body_for("東京地方"))
            .with("400000", &body_for("福岡地方"));
        let aggregator = Aggregator::new(Arc::new(source), codes(&["130000", "999999", "400000"]));

        let snapshot = aggregator.run().await;

        assert_eq!(snapshot.city_weather.len(), 3);
        let failed = &snapshot.city_weather[1];
        assert_eq!(failed.area_code, "999999");
        assert!(failed.today_weather.is_none());
        assert!(failed.temp_today_high.is_none());
        assert!(failed.pops.is_empty());
        assert!(failed.error.as_deref().unwrap().contains("unexpected status 404"));
        assert_eq!(snapshot.city_weather[2].today_weather.as_deref(), Some("晴れ"));
        assert_eq!(snapshot.last_error, failed.error);
    }

    #[tokio::test]
    async fn last_error_is_the_latest_failure() {
        let source = FakeSource::default().with("270000", "not json");
        let aggregator = Aggregator::new(Arc::new(source), codes(&["130000", "270000"]));

        let snapshot = aggregator.run().await;

        assert_eq!(snapshot.succeeded(), 0);
        let last = snapshot.last_error.unwrap();
        assert!(last.starts_with("decode failed (area 270000)"));
    }

    #[tokio::test]
    async fn empty_document_list_is_a_decode_failure() {
        let source = FakeSource::default().with("130000", "[]");
        let aggregator = Aggregator::new(Arc::new(source), codes(&["130000"]));

        let snapshot = aggregator.run().await;

        assert!(snapshot.city_weather[0].is_error());
        assert!(snapshot.last_error.unwrap().contains("no forecast documents"));
    }

    #[tokio::test]
    async fn fetches_each_area_once_in_order() {
        let source = Arc::new(FakeSource::default());
        let aggregator = Aggregator::new(source.clone(), codes(&["130000", "270000"]));

        aggregator.run().await;

        assert_eq!(*source.calls.lock(), vec!["130000", "270000"]);
    }
}
