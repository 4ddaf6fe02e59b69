pub mod csv_file;
pub mod openweathermap;
pub mod weatherapi;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;
use crate::ingest::types::WeatherRecord;

/// An HTTP vendor that answers for one city at a time.
#[async_trait]
pub trait CityProvider: Send + Sync {
    async fn fetch_one_city(&self, client: &Client, city: &str)
        -> Result<WeatherRecord, FetchError>;
    fn name(&self) -> &'static str;
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
