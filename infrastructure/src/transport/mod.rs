//! Chat-completion transport
//!
//! One dispatch walks every candidate URL once per attempt, sleeping with
//! exponential backoff between attempts, until a response carrying content
//! arrives or the attempts run out.

pub mod backoff;
pub mod client;
pub mod retry;
pub mod sender;
pub mod settings;

pub use backoff::BackoffPolicy;
pub use client::{HttpCompletionTransport, MAX_ERROR_BODY_BYTES, TransportBuildError};
pub use retry::{RetrySchedule, RetryStep};
pub use sender::{OutboundRequest, RawResponse, ReqwestSender, RequestSender, SendError};
pub use settings::{CompletionSettings, NetworkConfig};
