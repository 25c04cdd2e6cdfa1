//! Interface de linha de comando do datalic baseada em clap.
//!
//! Define a struct [`Cli`] com as flags de retomada por tipo de job
//! (`--history-response-id`, `--data-response-id`), o arquivo de campos,
//! o intervalo de retentativa e as flags globais (--verbose, --json).

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_CONFIG_FILE, DatalicConfig};

/// datalic — submete e acompanha jobs de histórico e de dados.
#[derive(Debug, Parser)]
#[command(name = "datalic", version, about)]
pub struct Cli {
    /// Response id de uma execução anterior do job de histórico. Use 0 para pular o job.
    #[arg(long, short = 'H', value_name = "ID", alias = "historyresponseid")]
    pub history_response_id: Option<String>,

    /// Response id de uma execução anterior do job de dados. Use 0 para pular o job.
    #[arg(long, short = 'D', value_name = "ID", alias = "dataresponseid")]
    pub data_response_id: Option<String>,

    /// Arquivo com a lista de campos do job de dados (somente para novas submissões).
    #[arg(long, short, value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Segundos de espera entre retentativas. Valores abaixo de 5 (inclusive negativos) viram 5.
    #[arg(long, short, value_name = "SECONDS", allow_negative_numbers = true)]
    pub retry_wait: Option<i64>,

    /// URL base do serviço; sobrescreve o arquivo de configuração.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Caminho do arquivo de configuração.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Registra o corpo de cada requisição e resposta (nível debug).
    #[arg(long, default_value_t = false)]
    pub trace_payloads: bool,

    /// Imprime o resumo final em JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Aplica as flags da CLI por cima da configuração carregada.
    pub fn apply_to(&self, config: &mut DatalicConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(secs) = self.retry_wait {
            config.retry_wait_secs = secs;
        }
    }
}
