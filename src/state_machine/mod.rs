pub mod job;
pub mod retry;
pub mod status;

pub use job::{Job, JobKind, JobMode, JobReport, JobSet, RunSummary};
pub use retry::RetryScheduler;
pub use status::{JobStatus, StatusCode, classify};
