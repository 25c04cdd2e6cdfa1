//! Instrument and field lists for new submissions.
//!
//! Both lists are plain text, one entry per line. Blank lines and lines
//! starting with `#` are skipped. Built-in defaults are compiled into the
//! binary; [`FileInputProvider`] can point either list at a file instead.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::DatalicError;

const DEFAULT_TICKERS: &str = include_str!("../resources/tickerlist.txt");
const DEFAULT_FIELDS: &str = include_str!("../resources/fields.txt");

/// Supplies the instruments and fields a submission asks for.
pub trait InputProvider {
    fn instruments(&self) -> Result<Vec<String>, DatalicError>;

    /// Fields read from `source`, or the provider's default list when `None`.
    fn fields(&self, source: Option<&Path>) -> Result<Vec<String>, DatalicError>;
}

#[derive(Debug, Clone, Default)]
pub struct FileInputProvider {
    ticker_list: Option<PathBuf>,
    field_list: Option<PathBuf>,
}

impl FileInputProvider {
    pub fn new(ticker_list: Option<PathBuf>, field_list: Option<PathBuf>) -> Self {
        Self {
            ticker_list,
            field_list,
        }
    }
}

impl InputProvider for FileInputProvider {
    fn instruments(&self) -> Result<Vec<String>, DatalicError> {
        info!("Loading ticker list.");
        match &self.ticker_list {
            Some(path) => read_list(path),
            None => Ok(parse_list(DEFAULT_TICKERS)),
        }
    }

    fn fields(&self, source: Option<&Path>) -> Result<Vec<String>, DatalicError> {
        match source.or(self.field_list.as_deref()) {
            Some(path) => {
                info!(path = %path.display(), "Reading fields");
                read_list(path)
            }
            None => {
                info!("No field file specified, loading default field list.");
                Ok(parse_list(DEFAULT_FIELDS))
            }
        }
    }
}

fn read_list(path: &Path) -> Result<Vec<String>, DatalicError> {
    let contents = std::fs::read_to_string(path).map_err(|source| DatalicError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_list(&contents))
}

fn parse_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
