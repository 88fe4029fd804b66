//! Shared primitive types used across the staffing model.

/// Offered load in Erlang units.
pub type Erlangs = f64;

/// A whole number of agents.
pub type AgentCount = u64;

/// The canonical report identifier.
pub type RunId = String;
