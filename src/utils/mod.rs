pub mod datetime;
pub mod error;
pub mod format_table;
pub mod json;
pub mod logger;
pub mod monitor;
pub mod open_file;
pub mod org;
pub mod time_series;
pub mod timeit;
pub mod validation;
