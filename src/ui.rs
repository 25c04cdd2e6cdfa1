//! Interface de terminal do datalic — spinner de espera e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner entre rodadas de consulta e
//! `console` para estilização com cores. O [`ConsoleReporter`] é o
//! [`Reporter`] injetado no controlador pela CLI.

use std::sync::Mutex;
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::controller::Reporter;
use crate::dlws::Submission;
use crate::error::DatalicError;
use crate::state_machine::{Job, JobKind, JobReport, JobStatus, RunSummary};

/// Reporter de terminal: ids de resposta e resultado final no stdout,
/// falhas no stderr.
pub struct ConsoleReporter {
    // Spinner ativo durante a espera entre rodadas.
    spinner: Mutex<Option<ProgressBar>>,
    // Imprime o resumo em JSON em vez da tabela.
    json: bool,
    green: Style,
    red: Style,
    yellow: Style,
}

impl ConsoleReporter {
    pub fn new(json: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            json,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    fn start_spinner(&self, message: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(pb);
        }
    }

    fn clear_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn print_summary(&self, summary: &RunSummary) {
        if self.json {
            println!("{}", serde_json::to_string_pretty(summary).unwrap_or_default());
            return;
        }

        println!();
        let style = if summary.is_success() { &self.green } else { &self.yellow };
        println!("{}", style.apply_to("─── Run Summary ───"));
        for report in &summary.jobs {
            println!("  {}", self.job_line(report));
        }
        println!(
            "  rounds: {}  retries: {}  elapsed: {}ms",
            summary.rounds, summary.retry_attempts, summary.duration_ms
        );
    }

    fn job_line(&self, report: &JobReport) -> String {
        let mark = match report.status {
            JobStatus::Retrieved => self.green.apply_to("✓"),
            JobStatus::Failed => self.red.apply_to("✗"),
            JobStatus::Pending => self.yellow.apply_to("…"),
        };
        let status = report
            .last_status
            .as_ref()
            .map(|s| format!(" ({s})"))
            .unwrap_or_default();
        format!("{mark} {:<7} {}{status} {}", report.kind.to_string(), report.status, report.response_id)
    }
}

impl Reporter for ConsoleReporter {
    /// Imprime o id de resposta na forma da flag que retoma o job.
    fn submitted(&self, kind: JobKind, submission: &Submission) {
        println!("{} {}", kind.resume_flag(), submission.response_id);
    }

    fn checked(&self, job: &Job) {
        self.clear_spinner();
        if job.status() == JobStatus::Retrieved {
            println!(
                "  {} {} request successful.",
                self.green.apply_to("✓"),
                job.kind()
            );
        }
    }

    fn retrying(&self, attempt: u32, wait: Duration) {
        println!("Retrying ... attempt = {attempt}");
        self.start_spinner(format!(
            "Waiting {}s before attempt {attempt}",
            wait.as_secs()
        ));
    }

    fn finished(&self, summary: &RunSummary) {
        self.clear_spinner();
        for report in summary.failures() {
            if let Some(status) = &report.last_status {
                let err = DatalicError::RemoteFailureStatus {
                    kind: report.kind,
                    status: status.clone(),
                };
                eprintln!("  {} {err}", self.red.apply_to("✗"));
            }
        }
        self.print_summary(summary);
        println!("Finished.");
    }

    /// Limpa o spinner para que as dicas de retomada não fiquem embaralhadas.
    fn aborted(&self, _error: &DatalicError) {
        self.clear_spinner();
    }
}
