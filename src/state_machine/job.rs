use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{JobStatus, StatusCode};

/// Flag value that disables a job for the whole run.
pub const SKIP_SENTINEL: &str = "0";

/// The two kinds of retrieval job a run tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    History,
    Data,
}

impl JobKind {
    /// Name of the CLI flag that resumes (or skips) this kind.
    pub fn resume_flag(self) -> &'static str {
        match self {
            JobKind::History => "--history-response-id",
            JobKind::Data => "--data-response-id",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::History => write!(f, "History"),
            JobKind::Data => write!(f, "Data"),
        }
    }
}

/// How a job enters the run. Fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobMode {
    Disabled,
    SubmitNew,
    Resume,
}

/// One tracked retrieval job.
///
/// Fields are private: only the controller mutates a job, through
/// [`Job::assign_response_id`] and [`Job::record`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    kind: JobKind,
    mode: JobMode,
    response_id: String,
    status: JobStatus,
    last_status: Option<StatusCode>,
}

impl Job {
    pub fn disabled(kind: JobKind) -> Self {
        Self::new(kind, JobMode::Disabled, String::new())
    }

    pub fn submit_new(kind: JobKind) -> Self {
        Self::new(kind, JobMode::SubmitNew, String::new())
    }

    pub fn resume(kind: JobKind, response_id: impl Into<String>) -> Self {
        Self::new(kind, JobMode::Resume, response_id.into())
    }

    /// Builds a job from its resume flag: absent submits, `"0"` skips,
    /// anything else resumes with that id.
    pub fn from_flag(kind: JobKind, flag: Option<&str>) -> Self {
        match flag {
            None => Self::submit_new(kind),
            Some(SKIP_SENTINEL) => Self::disabled(kind),
            Some(id) => Self::resume(kind, id),
        }
    }

    fn new(kind: JobKind, mode: JobMode, response_id: String) -> Self {
        Self {
            kind,
            mode,
            response_id,
            status: JobStatus::Pending,
            last_status: None,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn mode(&self) -> JobMode {
        self.mode
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn last_status(&self) -> Option<&StatusCode> {
        self.last_status.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.mode != JobMode::Disabled
    }

    /// A submit-new job that has not been given a response id yet.
    pub fn needs_submission(&self) -> bool {
        self.mode == JobMode::SubmitNew && self.response_id.is_empty()
    }

    /// Enabled and still waiting on the remote side.
    pub fn is_pending(&self) -> bool {
        self.is_enabled() && self.status == JobStatus::Pending
    }

    pub(crate) fn assign_response_id(&mut self, response_id: String) {
        self.response_id = response_id;
    }

    /// Applies a freshly retrieved status. Terminal jobs keep their status.
    pub(crate) fn record(&mut self, status: StatusCode) -> JobStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        self.status = status.classify();
        self.last_status = Some(status);
        self.status
    }
}

/// The history and data jobs of a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSet {
    pub history: Job,
    pub data: Job,
    /// Field list for a fresh data submission.
    input_file: Option<PathBuf>,
}

impl JobSet {
    pub fn new(history: Job, data: Job) -> Self {
        Self {
            history,
            data,
            input_file: None,
        }
    }

    pub fn with_input_file(mut self, input_file: Option<PathBuf>) -> Self {
        self.input_file = input_file;
        self
    }

    pub fn input_file(&self) -> Option<&Path> {
        self.input_file.as_deref()
    }

    /// Jobs in processing order: history first, then data.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        [&self.history, &self.data].into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Job> {
        [&mut self.history, &mut self.data].into_iter()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Job> {
        self.iter().filter(|job| job.is_enabled())
    }

    pub fn all_disabled(&self) -> bool {
        self.enabled().next().is_none()
    }

    /// True while at least one enabled job is pending.
    pub fn any_pending(&self) -> bool {
        self.iter().any(Job::is_pending)
    }

    pub fn has_resume(&self) -> bool {
        self.iter().any(|job| job.mode() == JobMode::Resume)
    }
}

/// Final outcome of one enabled job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub kind: JobKind,
    pub response_id: String,
    pub status: JobStatus,
    pub last_status: Option<StatusCode>,
}

impl JobReport {
    pub fn from_job(job: &Job) -> Self {
        Self {
            kind: job.kind(),
            response_id: job.response_id().to_string(),
            status: job.status(),
            last_status: job.last_status().cloned(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Retrieved
    }
}

/// Structured record produced at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub jobs: Vec<JobReport>,
    /// Status-check rounds performed, the initial check included.
    pub rounds: u32,
    /// Waits performed between rounds.
    pub retry_attempts: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RunSummary {
    pub fn from_jobs(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        jobs: &JobSet,
        rounds: u32,
        retry_attempts: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            jobs: jobs.enabled().map(JobReport::from_job).collect(),
            rounds,
            retry_attempts,
            started_at,
            completed_at: now,
            duration_ms: (now - started_at).num_milliseconds(),
        }
    }

    pub fn job(&self, kind: JobKind) -> Option<&JobReport> {
        self.jobs.iter().find(|report| report.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Every enabled job ended Retrieved.
    pub fn is_success(&self) -> bool {
        self.jobs.iter().all(JobReport::is_success)
    }

    /// Jobs that ended on a non-success remote status.
    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|report| !report.is_success())
    }
}
