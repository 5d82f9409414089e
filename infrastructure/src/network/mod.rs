//! Hostname resolution for the completion endpoint

mod resolver;

pub use resolver::{Candidate, DnsHostResolver, HostResolver, LookupError, plan_candidates};
