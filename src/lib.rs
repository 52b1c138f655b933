pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::config::{cli::LocalStorage, toml_config::AppConfig};
pub use crate::core::{engine::SheetEngine, CharacterSheet, RuleWarning, ValidationReport};
pub use crate::domain::form::FormState;
pub use crate::utils::error::{Result, SheetError};
