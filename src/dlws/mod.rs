pub mod client;
pub mod error;
pub mod tap;
pub mod types;

pub use client::{DEFAULT_ENDPOINT, DlwsClient, RemoteJobClient};
pub use error::RemoteError;
pub use tap::TracingTap;
pub use types::{GetDataRequest, GetHistoryRequest, Submission};
