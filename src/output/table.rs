//! Normalized output table rows

use crate::bars::Bar;
use rust_decimal::Decimal;
use serde::Serialize;

/// Security type written for every instrument
pub const DEFAULT_SECURITY_TYPE: &str = "Common stock";

/// Per-symbol metadata columns attached to every row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentMetadata {
    pub mnemonic: String,
    pub isin: String,
    pub security_desc: String,
    pub security_type: String,
    pub currency: String,
    pub security_id: String,
    pub number_of_trades: u32,
}

impl InstrumentMetadata {
    /// Metadata for a symbol with no reference data beyond its ticker
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            mnemonic: symbol.into(),
            isin: String::new(),
            security_desc: String::new(),
            security_type: DEFAULT_SECURITY_TYPE.to_string(),
            currency: String::new(),
            security_id: String::new(),
            number_of_trades: 1,
        }
    }
}

/// One row of the output CSV
///
/// Field order is the column order of the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "DateTime")]
    pub date_time: String,
    #[serde(rename = "StartPrice")]
    pub start_price: Decimal,
    #[serde(rename = "MinPrice")]
    pub min_price: Decimal,
    #[serde(rename = "MaxPrice")]
    pub max_price: Decimal,
    #[serde(rename = "EndPrice")]
    pub end_price: Decimal,
    #[serde(rename = "TradedVolume")]
    pub traded_volume: u64,
    #[serde(rename = "Mnemonic")]
    pub mnemonic: String,
    #[serde(rename = "ISIN")]
    pub isin: String,
    #[serde(rename = "SecurityDesc")]
    pub security_desc: String,
    #[serde(rename = "SecurityType")]
    pub security_type: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "SecurityID")]
    pub security_id: String,
    #[serde(rename = "NumberOfTrades")]
    pub number_of_trades: u32,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Date")]
    pub date: String,
}

impl OutputRow {
    pub fn from_bar(bar: &Bar, meta: &InstrumentMetadata) -> Self {
        Self {
            date_time: bar.timestamp.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            start_price: bar.open,
            min_price: bar.low,
            max_price: bar.high,
            end_price: bar.close,
            traded_volume: bar.volume,
            mnemonic: meta.mnemonic.clone(),
            isin: meta.isin.clone(),
            security_desc: meta.security_desc.clone(),
            security_type: meta.security_type.clone(),
            currency: meta.currency.clone(),
            security_id: meta.security_id.clone(),
            number_of_trades: meta.number_of_trades,
            time: bar.time().format("%H:%M:%S%.f").to_string(),
            date: bar.date().format("%Y-%m-%d").to_string(),
        }
    }
}
