//! Emitter configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of listeners per event above which a leak warning is logged.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Options accepted by [`EventEmitter::with_options`](crate::EventEmitter::with_options).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmitterOptions {
    /// Leak-detection threshold per event. `0` disables the warning.
    ///
    /// Exceeding it never rejects a registration; it only logs once per event.
    pub max_listeners: usize,
}

impl EmitterOptions {
    /// Parse options from a JSON object such as `{"maxListeners": 25}`.
    ///
    /// Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Options with the leak warning turned off.
    pub fn unlimited() -> Self {
        Self { max_listeners: 0 }
    }
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            max_listeners: DEFAULT_MAX_LISTENERS,
        }
    }
}
