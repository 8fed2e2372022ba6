use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::instrument;

use crate::{
    config::{self, Config},
    error::FetchError,
};

use super::ForecastSource;

/// HTTP client for the JMA forecast endpoint.
#[derive(Debug, Clone)]
pub struct JmaClient {
    base_url: String,
    http: Client,
}

impl JmaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Request)?;

        Ok(Self { base_url: base_url.into(), http })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    pub fn area_url(&self, area_code: &str) -> String {
        config::area_url(&self.base_url, area_code)
    }
}

#[async_trait]
impl ForecastSource for JmaClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, area_code: &str) -> Result<Vec<u8>, FetchError> {
        let res = self
            .http
            .get(self.area_url(area_code))
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = res.bytes().await.map_err(FetchError::Body)?;

        Ok(body.to_vec())
    }
}
