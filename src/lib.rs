pub mod backend;
pub mod chart;
pub mod config;
pub mod core;
pub mod domain;
pub mod kateri;
pub mod semantic;
pub mod sequences;
pub mod utils;
pub mod virus;
pub mod whocc;

#[cfg(feature = "cli")]
pub use config::{Cli, LocalStorage};

pub use backend::BuiltinBackend;
pub use chart::Chart;
pub use config::ToolsConfig;
pub use core::{ImportEngine, SequenceImportPipeline};
pub use utils::error::{AeError, Result};
