use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use datalic::cli::Cli;
use datalic::config::DatalicConfig;
use datalic::controller::{self, JobController};
use datalic::dlws::{DlwsClient, TracingTap};
use datalic::error::DatalicError;
use datalic::shutdown::ShutdownCoordinator;
use datalic::state_machine::RetryScheduler;
use datalic::ui::ConsoleReporter;

/// Logs go to stderr so stdout only carries response ids and the summary.
/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` overrides the filter.
fn init_tracing(verbose: bool) {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let default_filter = if verbose { "datalic=debug" } else { "datalic=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(?cli, "Started execution");

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => match err.downcast_ref::<DatalicError>() {
            Some(DatalicError::NoOpConfiguration) => {
                warn!("{err} Quitting instead ...");
                0
            }
            Some(DatalicError::InvalidConfiguration(_)) => {
                eprintln!("{err}");
                1
            }
            Some(known) => {
                error!("{err:#}");
                known.exit_code()
            }
            None => {
                error!("{err:#}");
                1
            }
        },
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = DatalicConfig::load_from(&cli.config)?;
    cli.apply_to(&mut config);

    let mut jobs = controller::resolve(
        cli.history_response_id.as_deref(),
        cli.data_response_id.as_deref(),
        cli.input_file.clone(),
    )?;

    let mut client = DlwsClient::with_timeout(config.endpoint.clone(), config.request_timeout())?;
    if cli.trace_payloads {
        debug!("Enabling payload tracing ...");
        client = client.with_tap(TracingTap);
    }
    info!(endpoint = client.base_url(), "Starting ...");

    let shutdown = ShutdownCoordinator::shared();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Ctrl+C received - stopping before the next retry");
                shutdown.request_shutdown();
            }
        }
    });

    let inputs = config.input_provider();
    let reporter = ConsoleReporter::new(cli.json);
    let controller =
        JobController::new(&client, &inputs, &reporter).with_settings(config.submission_settings());
    let mut scheduler = RetryScheduler::new(config.retry_wait_secs);

    let result = controller.run(&mut jobs, &mut scheduler, &shutdown).await;
    if let Err(DatalicError::WaitInterrupted { .. }) = &result {
        for job in jobs.iter().filter(|job| job.is_pending()) {
            eprintln!(
                "Resume {} later with: {} {}",
                job.kind(),
                job.kind().resume_flag(),
                job.response_id()
            );
        }
    }
    result?;
    Ok(())
}
