use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::dlws::types::{DateRange, equity_instruments};
use crate::dlws::{GetDataRequest, GetHistoryRequest, RemoteError, RemoteJobClient, Submission};
use crate::error::DatalicError;
use crate::input::InputProvider;
use crate::shutdown::ShutdownCoordinator;
use crate::state_machine::{Job, JobKind, JobMode, JobSet, JobStatus, RetryScheduler, RunSummary};

/// Receives progress events from the controller.
///
/// Every method has an empty default so implementors pick what they show.
pub trait Reporter {
    fn submitted(&self, _kind: JobKind, _submission: &Submission) {}

    fn checked(&self, _job: &Job) {}

    fn retrying(&self, _attempt: u32, _wait: Duration) {}

    fn finished(&self, _summary: &RunSummary) {}

    /// The run stopped early; `finished` will not follow.
    fn aborted(&self, _error: &DatalicError) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Payload choices for fresh history submissions.
#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub history_fields: Vec<String>,
    pub history_currency: String,
    pub history_lookback_months: u32,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            history_fields: vec!["PX_LAST".to_string()],
            history_currency: "USD".to_string(),
            history_lookback_months: 1,
        }
    }
}

/// Turns the two resume flags and the optional input file into a job set.
///
/// A missing flag submits a new job, `"0"` skips the job, any other value
/// resumes it. Skipping both jobs is a no-op configuration. An input file is
/// refused when either job resumes, since resumed jobs were already
/// submitted with their inputs. A blank resume id is refused as well, so
/// nothing is submitted for the other job.
pub fn resolve(
    history_flag: Option<&str>,
    data_flag: Option<&str>,
    input_file: Option<PathBuf>,
) -> Result<JobSet, DatalicError> {
    let jobs = JobSet::new(
        Job::from_flag(JobKind::History, history_flag),
        Job::from_flag(JobKind::Data, data_flag),
    );

    for job in jobs.iter().filter(|job| !job.response_id().trim().is_empty()) {
        info!(
            kind = %job.kind(),
            response_id = job.response_id(),
            "Resuming retrieval with existing response id"
        );
    }

    if jobs.all_disabled() {
        return Err(DatalicError::NoOpConfiguration);
    }

    if let Some(job) = jobs
        .iter()
        .find(|job| job.mode() == JobMode::Resume && job.response_id().trim().is_empty())
    {
        return Err(DatalicError::InvalidConfiguration(format!(
            "{} needs a response id to resume, or 0 to skip",
            job.kind().resume_flag()
        )));
    }

    if let Some(path) = &input_file {
        if jobs.has_resume() {
            return Err(DatalicError::InvalidConfiguration(format!(
                "input file {} is not used when resuming a job",
                path.display()
            )));
        }
        debug!(path = %path.display(), "Using input file");
    } else if jobs.data.needs_submission() {
        info!("No input file specified.");
    }

    Ok(jobs.with_input_file(input_file))
}

/// Payload for a fresh submission.
enum PreparedRequest {
    History(GetHistoryRequest),
    Data(GetDataRequest),
}

/// Drives the history and data jobs from submission to a terminal status.
pub struct JobController<'a, C, I, R> {
    client: &'a C,
    inputs: &'a I,
    reporter: &'a R,
    settings: SubmissionSettings,
}

impl<'a, C, I, R> JobController<'a, C, I, R>
where
    C: RemoteJobClient,
    I: InputProvider,
    R: Reporter,
{
    pub fn new(client: &'a C, inputs: &'a I, reporter: &'a R) -> Self {
        Self {
            client,
            inputs,
            reporter,
            settings: SubmissionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SubmissionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Submits a new job and stores its response id.
    ///
    /// Jobs that are disabled, resumed or already submitted are left alone.
    /// A failed submission is never retried.
    pub async fn submit(&self, job: &mut Job, input_file: Option<&Path>) -> Result<(), DatalicError> {
        if !job.needs_submission() {
            return Ok(());
        }
        let request = self.prepare(job.kind(), input_file)?;
        self.send(job, request).await
    }

    /// Builds the payload for a fresh submission from the configured inputs.
    fn prepare(&self, kind: JobKind, input_file: Option<&Path>) -> Result<PreparedRequest, DatalicError> {
        Ok(match kind {
            JobKind::History => PreparedRequest::History(self.history_request()?),
            JobKind::Data => PreparedRequest::Data(self.data_request(input_file)?),
        })
    }

    async fn send(&self, job: &mut Job, request: PreparedRequest) -> Result<(), DatalicError> {
        let kind = job.kind();
        info!(%kind, "Submitting request ...");
        let submission = match &request {
            PreparedRequest::History(request) => self.client.submit_history(request).await,
            PreparedRequest::Data(request) => self.client.submit_data(request).await,
        }
        .map_err(|source| DatalicError::Submission { kind, source })?;

        info!(
            %kind,
            code = submission.status_code.code,
            description = %submission.status_code.description,
            request_id = %submission.request_id,
            response_id = %submission.response_id,
            "Submission accepted"
        );

        if submission.response_id.is_empty() {
            return Err(DatalicError::Submission {
                kind,
                source: RemoteError::Protocol(format!(
                    "no response id returned (status {})",
                    submission.status_code
                )),
            });
        }

        job.assign_response_id(submission.response_id.clone());
        self.reporter.submitted(kind, &submission);
        Ok(())
    }

    /// Polls the remote side once and folds the answer into the job.
    ///
    /// Terminal or disabled jobs are not polled.
    pub async fn check_status(&self, job: &mut Job) -> Result<JobStatus, DatalicError> {
        if !job.is_pending() {
            return Ok(job.status());
        }

        let kind = job.kind();
        if job.response_id().is_empty() {
            return Err(DatalicError::PollFault {
                kind,
                source: RemoteError::Protocol("job has no response id".to_string()),
            });
        }

        let retrieval = match kind {
            JobKind::History => self.client.retrieve_history(job.response_id()).await,
            JobKind::Data => self.client.retrieve_data(job.response_id()).await,
        }
        .map_err(|source| DatalicError::PollFault { kind, source })?;

        info!(
            %kind,
            code = retrieval.status_code.code,
            description = %retrieval.status_code.description,
            "Status checked"
        );

        let status = job.record(retrieval.status_code);
        if status == JobStatus::Failed {
            if let Some(last) = job.last_status() {
                warn!(
                    "{}",
                    DatalicError::RemoteFailureStatus {
                        kind,
                        status: last.clone(),
                    }
                );
            }
        }
        self.reporter.checked(job);
        Ok(status)
    }

    /// Submits what needs submitting, then polls until no enabled job is pending.
    pub async fn run(
        &self,
        jobs: &mut JobSet,
        scheduler: &mut RetryScheduler,
        shutdown: &ShutdownCoordinator,
    ) -> Result<RunSummary, DatalicError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        self.run_inner(run_id, jobs, scheduler, shutdown)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        jobs: &mut JobSet,
        scheduler: &mut RetryScheduler,
        shutdown: &ShutdownCoordinator,
    ) -> Result<RunSummary, DatalicError> {
        let started_at = Utc::now();

        if jobs.all_disabled() {
            info!("No enabled jobs, nothing to poll");
            let summary = RunSummary::from_jobs(run_id, started_at, jobs, 0, 0);
            self.reporter.finished(&summary);
            return Ok(summary);
        }

        // Every input is read before the first submission goes out.
        let input_file = jobs.input_file();
        let mut requests = Vec::new();
        for job in jobs.iter().filter(|job| job.needs_submission()) {
            requests.push(self.prepare(job.kind(), input_file)?);
        }
        let mut requests = requests.into_iter();
        for job in jobs.iter_mut().filter(|job| job.needs_submission()) {
            if let Some(request) = requests.next() {
                self.send(job, request).await?;
            }
        }

        self.check_round(jobs).await?;
        let mut rounds = 1;

        while jobs.any_pending() {
            let attempt = scheduler.next_attempt();
            self.reporter.retrying(attempt, scheduler.wait_duration());
            if let Err(err) = scheduler.wait(shutdown).await {
                self.reporter.aborted(&err);
                return Err(err);
            }
            self.check_round(jobs).await?;
            rounds += 1;
        }

        let summary = RunSummary::from_jobs(run_id, started_at, jobs, rounds, scheduler.attempt());
        info!(
            rounds = summary.rounds,
            retry_attempts = summary.retry_attempts,
            success = summary.is_success(),
            "All enabled jobs reached a terminal status"
        );
        self.reporter.finished(&summary);
        Ok(summary)
    }

    async fn check_round(&self, jobs: &mut JobSet) -> Result<(), DatalicError> {
        for job in jobs.iter_mut() {
            self.check_status(job).await?;
        }
        Ok(())
    }

    fn history_request(&self) -> Result<GetHistoryRequest, DatalicError> {
        let tickers = self.inputs.instruments()?;
        Ok(GetHistoryRequest::new(
            self.settings.history_fields.clone(),
            equity_instruments(&tickers),
            DateRange::trailing_months(Utc::now(), self.settings.history_lookback_months),
            self.settings.history_currency.clone(),
        ))
    }

    fn data_request(&self, input_file: Option<&Path>) -> Result<GetDataRequest, DatalicError> {
        let fields = self.inputs.fields(input_file)?;
        let tickers = self.inputs.instruments()?;
        Ok(GetDataRequest::new(
            fields,
            equity_instruments(&tickers),
            Utc::now().date_naive(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dlws::types::Retrieval;
    use crate::input::FileInputProvider;
    use crate::state_machine::status::{DATA_NOT_AVAILABLE, REQUEST_ERROR, SUCCESS};
    use crate::state_machine::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    // --- Scripted remote client ---

    #[derive(Default)]
    struct ScriptedClient {
        history_submit: Option<&'static str>,
        data_submit: Option<&'static str>,
        history_statuses: Mutex<VecDeque<i32>>,
        data_statuses: Mutex<VecDeque<i32>>,
        fault_on_data_check: bool,
        calls: Mutex<Vec<String>>,
        data_requests: Mutex<Vec<GetDataRequest>>,
    }

    impl ScriptedClient {
        fn new() -> Self {
            Self {
                history_submit: Some("H-1"),
                data_submit: Some("D-1"),
                ..Default::default()
            }
        }

        /// `None` makes the submission fail with a transport fault.
        fn history_submit(mut self, response_id: Option<&'static str>) -> Self {
            self.history_submit = response_id;
            self
        }

        fn history_statuses(self, codes: &[i32]) -> Self {
            *self.history_statuses.lock().unwrap() = codes.iter().copied().collect();
            self
        }

        fn data_statuses(self, codes: &[i32]) -> Self {
            *self.data_statuses.lock().unwrap() = codes.iter().copied().collect();
            self
        }

        fn fault_on_data_check(mut self) -> Self {
            self.fault_on_data_check = true;
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, call: &str) -> usize {
            self.calls().iter().filter(|c| c.as_str() == call).count()
        }

        fn log(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn submission(response_id: Option<&str>) -> Result<Submission, RemoteError> {
            match response_id {
                Some(id) => Ok(Submission {
                    status_code: StatusCode::new(SUCCESS, "Success"),
                    request_id: "req".to_string(),
                    response_id: id.to_string(),
                }),
                None => Err(RemoteError::Http {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
            }
        }

        fn retrieval(queue: &Mutex<VecDeque<i32>>, response_id: &str) -> Result<Retrieval, RemoteError> {
            let code = queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| RemoteError::Protocol("script exhausted".to_string()))?;
            Ok(Retrieval {
                status_code: StatusCode::new(code, format!("code {code}")),
                response_id: response_id.to_string(),
                payload: serde_json::Value::Null,
            })
        }
    }

    impl RemoteJobClient for ScriptedClient {
        async fn submit_history(&self, _request: &GetHistoryRequest) -> Result<Submission, RemoteError> {
            self.log("submit_history");
            Self::submission(self.history_submit)
        }

        async fn submit_data(&self, request: &GetDataRequest) -> Result<Submission, RemoteError> {
            self.log("submit_data");
            self.data_requests.lock().unwrap().push(request.clone());
            Self::submission(self.data_submit)
        }

        async fn retrieve_history(&self, response_id: &str) -> Result<Retrieval, RemoteError> {
            self.log("retrieve_history");
            Self::retrieval(&self.history_statuses, response_id)
        }

        async fn retrieve_data(&self, response_id: &str) -> Result<Retrieval, RemoteError> {
            self.log("retrieve_data");
            if self.fault_on_data_check {
                return Err(RemoteError::Http {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Self::retrieval(&self.data_statuses, response_id)
        }
    }

    // --- Static inputs and recording reporter ---

    struct StaticInputs;

    impl InputProvider for StaticInputs {
        fn instruments(&self) -> Result<Vec<String>, DatalicError> {
            Ok(vec!["IBM US".to_string()])
        }

        fn fields(&self, source: Option<&Path>) -> Result<Vec<String>, DatalicError> {
            Ok(match source {
                Some(path) => vec![path.display().to_string()],
                None => vec!["NAME".to_string()],
            })
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl Reporter for RecordingReporter {
        fn submitted(&self, kind: JobKind, submission: &Submission) {
            self.push(format!("submitted {kind} {}", submission.response_id));
        }

        fn retrying(&self, attempt: u32, wait: Duration) {
            self.push(format!("retry {attempt} {}s", wait.as_secs()));
        }

        fn finished(&self, summary: &RunSummary) {
            self.push(format!("finished {}", summary.jobs.len()));
        }

        fn aborted(&self, error: &DatalicError) {
            self.push(format!("aborted: {error}"));
        }
    }

    impl RecordingReporter {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    fn jobs(history: Job, data: Job) -> JobSet {
        JobSet::new(history, data)
    }

    // --- resolve ---

    #[test]
    fn resolve_defaults_to_submitting_both() {
        let jobs = resolve(None, None, None).unwrap();
        assert_eq!(jobs.history.mode(), JobMode::SubmitNew);
        assert_eq!(jobs.data.mode(), JobMode::SubmitNew);
        assert!(jobs.input_file().is_none());
    }

    #[test]
    fn resolve_both_skipped_is_noop() {
        let err = resolve(Some("0"), Some("0"), None).unwrap_err();
        assert!(matches!(err, DatalicError::NoOpConfiguration));
    }

    #[test]
    fn resolve_noop_wins_over_input_file() {
        let err = resolve(Some("0"), Some("0"), Some("fields.txt".into())).unwrap_err();
        assert!(matches!(err, DatalicError::NoOpConfiguration));
    }

    #[test]
    fn resolve_rejects_input_file_with_resume() {
        let err = resolve(Some("H-9"), None, Some("fields.txt".into())).unwrap_err();
        assert!(matches!(err, DatalicError::InvalidConfiguration(_)));

        let err = resolve(Some("0"), Some("R123"), Some("fields.txt".into())).unwrap_err();
        assert!(matches!(err, DatalicError::InvalidConfiguration(_)));
    }

    #[test]
    fn resolve_rejects_empty_resume_id() {
        for blank in ["", "   "] {
            let err = resolve(Some(blank), None, None).unwrap_err();
            assert!(matches!(err, DatalicError::InvalidConfiguration(ref msg) if msg.contains("--history-response-id")));

            let err = resolve(None, Some(blank), None).unwrap_err();
            assert!(matches!(err, DatalicError::InvalidConfiguration(ref msg) if msg.contains("--data-response-id")));
        }
    }

    #[test]
    fn resolve_keeps_input_file_for_fresh_submissions() {
        let jobs = resolve(Some("0"), None, Some("fields.txt".into())).unwrap();
        assert_eq!(jobs.history.mode(), JobMode::Disabled);
        assert_eq!(jobs.input_file(), Some(Path::new("fields.txt")));
    }

    // --- run scenarios ---

    #[tokio::test]
    async fn both_disabled_makes_no_remote_calls() {
        let client = ScriptedClient::new();
        let reporter = RecordingReporter::default();
        let controller = JobController::new(&client, &StaticInputs, &reporter);
        let mut set = jobs(Job::disabled(JobKind::History), Job::disabled(JobKind::Data));
        let mut scheduler = RetryScheduler::new(5);

        let summary = controller
            .run(&mut set, &mut scheduler, &ShutdownCoordinator::new())
            .await
            .unwrap();

        assert!(summary.is_empty());
        assert_eq!(summary.rounds, 0);
        assert!(client.calls().is_empty());
        assert_eq!(reporter.events(), vec!["finished 0"]);
    }

    #[tokio::test(start_paused = true)]
    async fn history_only_retrieved_on_first_check() {
        let client = ScriptedClient::new().history_statuses(&[SUCCESS]);
        let reporter = RecordingReporter::default();
        let controller = JobController::new(&client, &StaticInputs, &reporter);
        let mut set = jobs(Job::submit_new(JobKind::History), Job::disabled(JobKind::Data));
        let mut scheduler = RetryScheduler::new(30);

        let start = Instant::now();
        let summary = controller
            .run(&mut set, &mut scheduler, &ShutdownCoordinator::new())
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(summary.rounds, 1);
        assert_eq!(summary.retry_attempts, 0);
        assert_eq!(summary.job(JobKind::History).unwrap().status, JobStatus::Retrieved);
        assert!(summary.job(JobKind::Data).is_none());
        assert_eq!(client.calls(), vec!["submit_history", "retrieve_history"]);
        assert_eq!(reporter.events(), vec!["submitted History H-1", "finished 1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn resumed_data_job_waits_once() {
        let client = ScriptedClient::new().data_statuses(&[DATA_NOT_AVAILABLE, SUCCESS]);
        let reporter = RecordingReporter::default();
        let controller = JobController::new(&client, &StaticInputs, &reporter);
        let mut set = jobs(Job::disabled(JobKind::History), Job::resume(JobKind::Data, "R123"));
        let mut scheduler = RetryScheduler::new(12);

        let start = Instant::now();
        let summary = controller
            .run(&mut set, &mut scheduler, &ShutdownCoordinator::new())
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(12));
        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.retry_attempts, 1);
        let data = summary.job(JobKind::Data).unwrap();
        assert_eq!(data.status, JobStatus::Retrieved);
        assert_eq!(data.response_id, "R123");
        assert_eq!(client.count("submit_data"), 0);
        assert_eq!(client.count("retrieve_data"), 2);
        assert_eq!(reporter.events(), vec!["retry 1 12s", "finished 1"]);
    }

    #[tokio::test]
    async fn submission_fault_aborts_before_any_check() {
        let client = ScriptedClient::new()
            .history_submit(None)
            .data_statuses(&[SUCCESS]);
        let controller = JobController::new(&client, &StaticInputs, &NullReporter);
        let mut set = jobs(Job::submit_new(JobKind::History), Job::submit_new(JobKind::Data));
        let mut scheduler = RetryScheduler::new(5);

        let err = controller
            .run(&mut set, &mut scheduler, &ShutdownCoordinator::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DatalicError::Submission {
                kind: JobKind::History,
                ..
            }
        ));
        assert_eq!(client.calls(), vec!["submit_history"]);
        assert!(set.data.response_id().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn jobs_finish_in_different_rounds() {
        let client = ScriptedClient::new()
            .history_statuses(&[REQUEST_ERROR])
            .data_statuses(&[DATA_NOT_AVAILABLE, DATA_NOT_AVAILABLE, SUCCESS]);
        let controller = JobController::new(&client, &StaticInputs, &NullReporter);
        let mut set = jobs(Job::submit_new(JobKind::History), Job::submit_new(JobKind::Data));
        let mut scheduler = RetryScheduler::new(5);

        let start = Instant::now();
        let summary = controller
            .run(&mut set, &mut scheduler, &ShutdownCoordinator::new())
            .await
            .unwrap();

        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.retry_attempts, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(10));

        let history = summary.job(JobKind::History).unwrap();
        assert_eq!(history.status, JobStatus::Failed);
        assert_eq!(history.last_status.as_ref().unwrap().code, REQUEST_ERROR);
        assert_eq!(summary.job(JobKind::Data).unwrap().status, JobStatus::Retrieved);

        // Terminal history is not polled again.
        assert_eq!(client.count("retrieve_history"), 1);
        assert_eq!(client.count("retrieve_data"), 3);
        assert_eq!(summary.failures().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_runs_k_rounds() {
        for k in 1..=5usize {
            let mut codes = vec![DATA_NOT_AVAILABLE; k - 1];
            codes.push(SUCCESS);
            let client = ScriptedClient::new().history_statuses(&codes);
            let controller = JobController::new(&client, &StaticInputs, &NullReporter);
            let mut set = jobs(Job::resume(JobKind::History, "H-7"), Job::disabled(JobKind::Data));
            let mut scheduler = RetryScheduler::new(5);

            let summary = controller
                .run(&mut set, &mut scheduler, &ShutdownCoordinator::new())
                .await
                .unwrap();

            assert_eq!(summary.rounds as usize, k);
            assert_eq!(summary.retry_attempts as usize, k - 1);
            assert_eq!(client.count("retrieve_history"), k);
        }
    }

    #[tokio::test]
    async fn submit_new_submits_exactly_once_before_checking() {
        let client = ScriptedClient::new()
            .history_statuses(&[SUCCESS])
            .data_statuses(&[SUCCESS]);
        let controller = JobController::new(&client, &StaticInputs, &NullReporter);
        let mut set = jobs(Job::submit_new(JobKind::History), Job::submit_new(JobKind::Data));

        controller
            .run(&mut set, &mut RetryScheduler::new(5), &ShutdownCoordinator::new())
            .await
            .unwrap();

        assert_eq!(
            client.calls(),
            vec!["submit_history", "submit_data", "retrieve_history", "retrieve_data"]
        );
        assert_eq!(set.history.response_id(), "H-1");
        assert_eq!(set.data.response_id(), "D-1");
    }

    #[tokio::test]
    async fn data_submission_reads_input_file() {
        let client = ScriptedClient::new().data_statuses(&[SUCCESS]);
        let controller = JobController::new(&client, &StaticInputs, &NullReporter);
        let mut set = resolve(Some("0"), None, Some("my_fields.txt".into())).unwrap();

        controller
            .run(&mut set, &mut RetryScheduler::new(5), &ShutdownCoordinator::new())
            .await
            .unwrap();

        let requests = client.data_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].fields, vec!["my_fields.txt"]);
        assert_eq!(requests[0].instruments[0].id, "IBM US");
    }

    #[tokio::test]
    async fn poll_fault_is_fatal() {
        let client = ScriptedClient::new()
            .history_statuses(&[DATA_NOT_AVAILABLE])
            .fault_on_data_check();
        let controller = JobController::new(&client, &StaticInputs, &NullReporter);
        let mut set = jobs(Job::resume(JobKind::History, "H-1"), Job::resume(JobKind::Data, "D-1"));

        let err = controller
            .run(&mut set, &mut RetryScheduler::new(5), &ShutdownCoordinator::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DatalicError::PollFault { kind: JobKind::Data, .. }));
        assert_eq!(client.calls(), vec!["retrieve_history", "retrieve_data"]);
    }

    #[tokio::test]
    async fn shutdown_interrupts_polling() {
        let client = ScriptedClient::new().history_statuses(&[DATA_NOT_AVAILABLE]);
        let reporter = RecordingReporter::default();
        let controller = JobController::new(&client, &StaticInputs, &reporter);
        let mut set = jobs(Job::resume(JobKind::History, "H-1"), Job::disabled(JobKind::Data));
        let shutdown = ShutdownCoordinator::new();
        shutdown.request_shutdown();

        let err = controller
            .run(&mut set, &mut RetryScheduler::new(5), &shutdown)
            .await
            .unwrap_err();

        assert!(matches!(err, DatalicError::WaitInterrupted { attempt: 1 }));
        assert_eq!(client.count("retrieve_history"), 1);
        assert_eq!(
            reporter.events(),
            vec![
                "retry 1 5s".to_string(),
                "aborted: Retry wait interrupted before attempt 1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn missing_field_file_fails_before_any_submission() {
        let client = ScriptedClient::new();
        let reporter = RecordingReporter::default();
        let inputs = FileInputProvider::default();
        let controller = JobController::new(&client, &inputs, &reporter);
        let mut set = resolve(None, None, Some("/no/such/fields.txt".into())).unwrap();

        let err = controller
            .run(&mut set, &mut RetryScheduler::new(5), &ShutdownCoordinator::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DatalicError::Input { .. }));
        assert!(client.calls().is_empty());
        assert!(reporter.events().is_empty());
        assert!(set.history.response_id().is_empty());
    }

    // --- single operations ---

    #[tokio::test]
    async fn submit_skips_resumed_jobs() {
        let client = ScriptedClient::new();
        let controller = JobController::new(&client, &StaticInputs, &NullReporter);
        let mut job = Job::resume(JobKind::History, "H-3");

        controller.submit(&mut job, None).await.unwrap();
        assert!(client.calls().is_empty());
        assert_eq!(job.response_id(), "H-3");
    }

    #[tokio::test]
    async fn submit_rejects_empty_response_id() {
        let client = ScriptedClient::new().history_submit(Some(""));
        let controller = JobController::new(&client, &StaticInputs, &NullReporter);
        let mut job = Job::submit_new(JobKind::History);

        let err = controller.submit(&mut job, None).await.unwrap_err();
        assert!(matches!(
            err,
            DatalicError::Submission {
                source: RemoteError::Protocol(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn check_status_requires_response_id() {
        let client = ScriptedClient::new();
        let controller = JobController::new(&client, &StaticInputs, &NullReporter);
        let mut job = Job::submit_new(JobKind::Data);

        let err = controller.check_status(&mut job).await.unwrap_err();
        assert!(matches!(err, DatalicError::PollFault { .. }));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn check_status_leaves_terminal_jobs_alone() {
        let client = ScriptedClient::new().data_statuses(&[SUCCESS]);
        let controller = JobController::new(&client, &StaticInputs, &NullReporter);
        let mut job = Job::resume(JobKind::Data, "D-2");

        assert_eq!(controller.check_status(&mut job).await.unwrap(), JobStatus::Retrieved);
        assert_eq!(controller.check_status(&mut job).await.unwrap(), JobStatus::Retrieved);
        assert_eq!(client.count("retrieve_data"), 1);
    }

    #[test]
    fn default_settings() {
        let settings = SubmissionSettings::default();
        assert_eq!(settings.history_fields, vec!["PX_LAST"]);
        assert_eq!(settings.history_currency, "USD");
        assert_eq!(settings.history_lookback_months, 1);
    }
}
