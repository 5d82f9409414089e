//! Infrastructure layer for quizgen
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP completion transport with its
//! DNS fallback and retry loop, and configuration file loading.

pub mod config;
pub mod network;
pub mod transport;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, ConfigValidationError, FileConfig, FileNetworkConfig,
    FileProviderConfig,
};
pub use network::{DnsHostResolver, HostResolver, LookupError};
pub use transport::{
    BackoffPolicy, CompletionSettings, HttpCompletionTransport, NetworkConfig, ReqwestSender,
    TransportBuildError,
};
