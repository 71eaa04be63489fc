//! MatchStrategy - point-query matching policies
//!
//! How a stream resolves "which record represents my state at time T".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Matching policy for point queries against a sorted stream.
///
/// Being a closed enum, an "unknown strategy" cannot reach the engine at
/// runtime; unknown names fail loudly when a config is deserialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Latest record at or before the query time (hold last value)
    #[default]
    Forward,
    /// Earliest record at or after the query time (look ahead)
    Backward,
    /// Record closest to the query time; exact ties resolve to the later record
    Nearest,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Nearest => "nearest",
        };
        write!(f, "{name}")
    }
}
