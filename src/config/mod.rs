#[cfg(feature = "cli")]
pub mod cli;
pub mod directory_config;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{Cli, Command, ImportArgs, LocalStorage};
pub use directory_config::{DirectoryPreprocessors, Preprocessor};
pub use toml_config::{ImportConfig, KateriConfig, ToolsConfig, WhoccConfig};
