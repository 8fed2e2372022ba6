use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::FetchError;

pub mod jma;

pub use jma::JmaClient;

/// Source of raw forecast payloads, one request per area code.
///
/// Implementations do not retry; a failed area is picked up again on the
/// next refresh cycle.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, area_code: &str) -> Result<Vec<u8>, FetchError>;
}
