//! Call-centre staffing under a normal / working-vacation workload mix.
//!
//! Erlang-C closed forms evaluated over a Bernoulli blend of two traffic
//! regimes, with an incremental search for the smallest agent count that
//! meets a service-level target.

pub mod blended;
pub mod config;
pub mod erlang_c;
pub mod error;
pub mod report;
pub mod scenario;
pub mod search;
pub mod traffic;
pub mod types;
