//! Configuração do datalic carregada a partir de `datalic.toml`.
//!
//! A struct [`DatalicConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `DATALIC_ENDPOINT` tem precedência sobre o arquivo;
//! flags da CLI têm precedência sobre ambos.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::controller::SubmissionSettings;
use crate::dlws::DEFAULT_ENDPOINT;
use crate::input::FileInputProvider;
use crate::state_machine::retry::DEFAULT_RETRY_WAIT_SECS;

pub const DEFAULT_CONFIG_FILE: &str = "datalic.toml";
pub const ENDPOINT_ENV: &str = "DATALIC_ENDPOINT";

/// Configuração de nível superior carregada de `datalic.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatalicConfig {
    /// URL base do serviço de jobs.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Segundos de espera entre rodadas de consulta (mínimo 5).
    #[serde(default = "default_retry_wait_secs")]
    pub retry_wait_secs: i64,

    /// Timeout de cada requisição HTTP, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Lista de tickers; usa a lista embutida quando ausente.
    #[serde(default)]
    pub ticker_list: Option<PathBuf>,

    /// Lista de campos padrão para o job de dados.
    #[serde(default)]
    pub field_list: Option<PathBuf>,

    /// Campos pedidos no job de histórico.
    #[serde(default = "default_history_fields")]
    pub history_fields: Vec<String>,

    /// Moeda do histórico.
    #[serde(default = "default_history_currency")]
    pub history_currency: String,

    /// Quantos meses para trás o histórico cobre.
    #[serde(default = "default_history_lookback_months")]
    pub history_lookback_months: u32,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_retry_wait_secs() -> i64 {
    DEFAULT_RETRY_WAIT_SECS
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_history_fields() -> Vec<String> {
    vec!["PX_LAST".to_string()]
}

fn default_history_currency() -> String {
    "USD".to_string()
}

fn default_history_lookback_months() -> u32 {
    1
}

impl Default for DatalicConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            retry_wait_secs: default_retry_wait_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            ticker_list: None,
            field_list: None,
            history_fields: default_history_fields(),
            history_currency: default_history_currency(),
            history_lookback_months: default_history_lookback_months(),
        }
    }
}

impl DatalicConfig {
    /// Carrega a configuração do caminho informado.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<DatalicConfig>(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_endpoint_override(std::env::var(ENDPOINT_ENV).ok());
        Ok(config)
    }

    // Variável de ambiente vazia não sobrescreve o arquivo.
    fn apply_endpoint_override(&mut self, value: Option<String>) {
        if let Some(endpoint) = value.filter(|v| !v.is_empty()) {
            self.endpoint = endpoint;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn submission_settings(&self) -> SubmissionSettings {
        SubmissionSettings {
            history_fields: self.history_fields.clone(),
            history_currency: self.history_currency.clone(),
            history_lookback_months: self.history_lookback_months,
        }
    }

    pub fn input_provider(&self) -> FileInputProvider {
        FileInputProvider::new(self.ticker_list.clone(), self.field_list.clone())
    }
}
