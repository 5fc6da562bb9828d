//! Run metadata attached to every result document.

use serde::{Deserialize, Serialize};

/// Descriptive metadata recorded alongside a simulation's output.
///
/// Keys are serialized in lowercase without separators, matching the result
/// documents consumed by the downstream plotting scripts. Every field is
/// optional on read so documents written by older tools still parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunMetadata {
    /// RFC 3339 timestamp recording when the run started.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    /// Human readable simulation label.
    pub simulation: String,
    /// Stable simulation identifier (the configured simulation kind).
    pub simulationid: String,
    /// Directory where figures derived from this document are stored.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub figuresdir: String,
    /// Free-form CPU description copied from the configuration.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cpu: String,
    /// Free-form memory description copied from the configuration.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ram: String,
    /// Wall-clock duration of the run.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub completiontime: String,
}

impl RunMetadata {
    /// Creates metadata with the provided label and identifier.
    pub fn new(simulation: impl Into<String>, simulationid: impl Into<String>) -> Self {
        Self {
            simulation: simulation.into(),
            simulationid: simulationid.into(),
            ..Self::default()
        }
    }
}
