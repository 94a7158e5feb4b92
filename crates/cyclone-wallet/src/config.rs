//! Mix behavior configuration.
//!
//! Loading from a config file is the host application's concern; this
//! struct only carries the flags the refill orchestrator branches on.

use serde::Deserialize;

/// Configuration for the refill orchestrator.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MixConfig {
    /// Automatically sweep postmix funds back into the deposit role when
    /// the mixing engine reports an empty wallet. When false, refill stops
    /// at a manual deposit checkpoint instead of moving funds.
    pub auto_aggregate_postmix: bool,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            auto_aggregate_postmix: false,
        }
    }
}
