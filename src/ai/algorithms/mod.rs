mod expectation;
mod max_bootstrap;
mod tabular;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use expectation::{EpsAverageAgent, ExpectationBootstrap};
pub use max_bootstrap::{EpsGreedyAgent, MaxBootstrap};
pub use tabular::{BootstrapSign, TabularAgent, TabularConfig, TabularSnapshot, UpdateRule};

/// Which tabular update rule to train with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Max-bootstrap (`EpsGreedyAgent`).
    #[default]
    Max,
    /// Visit-weighted expectation bootstrap (`EpsAverageAgent`).
    Expectation,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Max => "max",
            Algorithm::Expectation => "expectation",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(Algorithm::Max),
            "expectation" => Ok(Algorithm::Expectation),
            other => Err(format!(
                "unknown algorithm '{other}' (expected 'max' or 'expectation')"
            )),
        }
    }
}
