//! Request and response bodies for the data-license job operations.
//!
//! Field names follow the service's own vocabulary (`daterange`,
//! `histCrncy`, `fieldmacro`). The wire rendition is JSON.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::state_machine::StatusCode;

/// Market sector ("yellow key") attached to each instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketSector {
    Equity,
    Govt,
    Corp,
    Mtge,
    Muni,
    Pfd,
    Comdty,
    Index,
    Curncy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub yellowkey: MarketSector,
}

impl Instrument {
    pub fn equity(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            yellowkey: MarketSector::Equity,
        }
    }
}

/// Tags every ticker as an equity instrument.
pub fn equity_instruments(tickers: &[String]) -> Vec<Instrument> {
    tickers.iter().map(Instrument::equity).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub period: Period,
}

impl DateRange {
    /// `months` calendar months back from `end`, up to `end`.
    pub fn trailing_months(end: DateTime<Utc>, months: u32) -> Self {
        let start = end.checked_sub_months(Months::new(months)).unwrap_or(end);
        Self {
            period: Period { start, end },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHistoryHeaders {
    pub daterange: DateRange,
    pub hist_crncy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetHistoryRequest {
    pub headers: GetHistoryHeaders,
    pub fields: Vec<String>,
    pub instruments: Vec<Instrument>,
}

impl GetHistoryRequest {
    pub fn new(
        fields: Vec<String>,
        instruments: Vec<Instrument>,
        daterange: DateRange,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            headers: GetHistoryHeaders {
                daterange,
                hist_crncy: currency.into(),
            },
            fields,
            instruments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDataHeaders {
    pub secmaster: bool,
    pub closingvalues: bool,
    pub derived: bool,
}

impl Default for GetDataHeaders {
    fn default() -> Self {
        Self {
            secmaster: true,
            closingvalues: true,
            derived: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BvalFieldMacro {
    BvalAll,
    BvalScore,
}

/// Field selector for an evaluated-pricing snapshot on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BvalFieldSet {
    pub date: NaiveDate,
    pub fieldmacro: BvalFieldMacro,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDataRequest {
    pub headers: GetDataHeaders,
    pub fieldsets: Vec<BvalFieldSet>,
    pub fields: Vec<String>,
    pub instruments: Vec<Instrument>,
}

impl GetDataRequest {
    /// A data request with all header flags set and one `BVAL_ALL` field set for `date`.
    pub fn new(fields: Vec<String>, instruments: Vec<Instrument>, date: NaiveDate) -> Self {
        Self {
            headers: GetDataHeaders::default(),
            fieldsets: vec![BvalFieldSet {
                date,
                fieldmacro: BvalFieldMacro::BvalAll,
            }],
            fields,
            instruments,
        }
    }
}

/// Reply to a job submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub status_code: StatusCode,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub response_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveRequest {
    pub response_id: String,
}

/// Reply to a status check. `payload` is opaque until the job is retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Retrieval {
    pub status_code: StatusCode,
    #[serde(default)]
    pub response_id: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}
