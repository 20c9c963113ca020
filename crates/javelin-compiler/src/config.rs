//! Compiler configuration
//!
//! Two switches drive the back end: whether the AST optimizer runs, and how
//! registers are allocated. They arrive either as string key/value pairs
//! (`optimize`, `registerAllocation`) or as a small TOML document with the
//! same keys.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Key selecting the AST optimizer
pub const OPTIMIZE_KEY: &str = "optimize";

/// Key selecting the register allocation mode
pub const REGISTER_ALLOCATION_KEY: &str = "registerAllocation";

/// Errors in the compiler configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid number in -r option: {value}")]
    InvalidRegisterBudget { value: i64 },

    #[error("Invalid value '{value}' for option '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Register allocation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterAllocation {
    /// Keep the sequential slots assigned during lowering
    #[default]
    Skip,
    /// Search for the smallest register count per method
    Minimize,
    /// Color every method with exactly this many registers
    Fixed(u32),
}

impl RegisterAllocation {
    /// Interpret the numeric option: `-1` skips, `0` minimizes, `k > 0` is a
    /// fixed budget. Anything below `-1` is rejected.
    pub fn from_value(value: i64) -> Result<Self, ConfigError> {
        match value {
            -1 => Ok(RegisterAllocation::Skip),
            0 => Ok(RegisterAllocation::Minimize),
            k if k > 0 => u32::try_from(k)
                .map(RegisterAllocation::Fixed)
                .map_err(|_| ConfigError::InvalidRegisterBudget { value }),
            _ => Err(ConfigError::InvalidRegisterBudget { value }),
        }
    }
}

/// Settings for one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Run constant folding and propagation before lowering
    pub optimize: bool,
    /// Register allocation mode
    pub register_allocation: RegisterAllocation,
}

/// On-disk shape of the configuration
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    optimize: bool,
    #[serde(default = "default_register_allocation", rename = "registerAllocation")]
    register_allocation: i64,
}

fn default_register_allocation() -> i64 {
    -1
}

impl CompilerConfig {
    pub fn new(optimize: bool, register_allocation: RegisterAllocation) -> Self {
        Self {
            optimize,
            register_allocation,
        }
    }

    /// Build a configuration from string key/value pairs. Unknown keys are
    /// ignored; a missing `registerAllocation` means "skip".
    pub fn from_map<'a, I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = CompilerConfig::default();

        for (key, value) in pairs {
            match key {
                OPTIMIZE_KEY => {
                    config.optimize =
                        bool::from_str(value.trim()).map_err(|_| ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })?;
                }
                REGISTER_ALLOCATION_KEY => {
                    let number =
                        i64::from_str(value.trim()).map_err(|_| ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })?;
                    config.register_allocation = RegisterAllocation::from_value(number)?;
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// Parse a configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        Ok(Self {
            optimize: raw.optimize,
            register_allocation: RegisterAllocation::from_value(raw.register_allocation)?,
        })
    }
}
