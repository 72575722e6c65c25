pub mod import;
pub mod pipeline;

pub use crate::domain::model::{Extracted, ImportResult, SequenceRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use import::ImportEngine;
pub use pipeline::SequenceImportPipeline;
