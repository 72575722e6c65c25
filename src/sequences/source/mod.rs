// 序列來源：FASTA (GISAID / NAOMI / 一般名稱) 與 NCBI 目錄

pub mod context;
pub mod fasta;
pub mod gisaid;
pub mod messages;
pub mod naomi;
pub mod ncbi;
pub mod parse;
pub mod regular;

pub use context::Context;
pub use fasta::{read_fasta, FastaEntry, FastaReader};
pub use messages::{Message, MessageCollector};
pub use ncbi::NcbiReader;
