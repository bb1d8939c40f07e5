// src/ingest/types.rs
use crate::error::FetchError;
use crate::model::{RawReading, SourceKind};

/// The single fixed location this tool rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: &'static str,
}

pub const KAIKOURA: Location = Location {
    name: "Kaikoura",
    latitude: -42.4,
    longitude: 173.7,
    timezone: "Pacific/Auckland",
};

/// One upstream service. A provider may cover several source kinds (Open-Meteo
/// gives both swell and wind) and may report a per-kind error inside `Ok`.
/// `Err` means nothing usable came back at all.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn kinds(&self) -> &'static [SourceKind];
    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError>;
}
