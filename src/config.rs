use clap::Args;

use crate::error::{PlannerError, Result};
use crate::seating::{matcher_for, FuzzyToken, NameMatcher};

pub const DEFAULT_TABLE_SIZE: u32 = 10;

/// Seating options shared by the CLI and the web server
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatingConfig {
    pub table_size: u32,
    pub fuzzy: bool,
    pub fuzzy_cutoff: f64,
}

impl Default for SeatingConfig {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            fuzzy: false,
            fuzzy_cutoff: FuzzyToken::DEFAULT_CUTOFF,
        }
    }
}

impl SeatingConfig {
    /// Rejects settings the seating engine cannot run with
    pub fn validate(self) -> Result<Self> {
        if self.table_size == 0 {
            return Err(PlannerError::InvalidTableSize(self.table_size));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_cutoff) {
            return Err(PlannerError::InvalidFuzzyCutoff(self.fuzzy_cutoff));
        }
        Ok(self)
    }

    pub fn matcher(&self) -> Box<dyn NameMatcher + Send + Sync> {
        matcher_for(self.fuzzy, self.fuzzy_cutoff)
    }
}

/// Command line flags for [`SeatingConfig`], with environment fallbacks
#[derive(Debug, Clone, Args)]
pub struct SeatingArgs {
    /// Seats per table
    #[arg(long, env = "SEATING_TABLE_SIZE", default_value_t = DEFAULT_TABLE_SIZE)]
    pub table_size: u32,

    /// Match last names approximately
    #[arg(long, env = "SEATING_FUZZY")]
    pub fuzzy: bool,

    /// Similarity needed for a fuzzy match (0.0 to 1.0)
    #[arg(long, env = "SEATING_FUZZY_CUTOFF", default_value_t = FuzzyToken::DEFAULT_CUTOFF)]
    pub fuzzy_cutoff: f64,
}

impl SeatingArgs {
    pub fn to_config(&self) -> Result<SeatingConfig> {
        SeatingConfig {
            table_size: self.table_size,
            fuzzy: self.fuzzy,
            fuzzy_cutoff: self.fuzzy_cutoff,
        }
        .validate()
    }
}
