use crate::config::directory_config::DirectoryPreprocessors;
use crate::domain::model::SequenceRecord;
use crate::domain::ports::Backend;
use crate::sequences::source::context::Context;
use crate::sequences::source::gisaid::gisaid_name_parser;
use crate::sequences::source::messages::MessageCollector;
use crate::sequences::source::naomi::naomi_name_parser;
use crate::sequences::source::regular::regular_name_parser;
use crate::utils::error::Result;
use crate::utils::open_file;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaEntry {
    pub name: String,
    pub sequence: String,
    pub filename: PathBuf,
    /// 標頭所在行號（從 1 起算）
    pub line_no: usize,
}

/// 逐筆讀取 FASTA（可為 gzip）
pub struct FastaReader {
    lines: std::io::Lines<Box<dyn BufRead>>,
    filename: PathBuf,
    line_no: usize,
    pending: Option<(String, usize)>,
    finished: bool,
}

impl FastaReader {
    pub fn open(filename: &Path) -> Result<Self> {
        Ok(Self {
            lines: open_file::for_reading(filename)?.lines(),
            filename: filename.to_path_buf(),
            line_no: 0,
            pending: None,
            finished: false,
        })
    }

    fn entry(&self, name: String, line_no: usize, sequence: String) -> FastaEntry {
        FastaEntry {
            name,
            sequence,
            filename: self.filename.clone(),
            line_no,
        }
    }
}

impl Iterator for FastaReader {
    type Item = Result<FastaEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut sequence = String::new();
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.finished = true;
                    return self
                        .pending
                        .take()
                        .map(|(name, line_no)| Ok(self.entry(name, line_no, sequence)));
                }
            };
            self.line_no += 1;

            if let Some(header) = line.strip_prefix('>') {
                let current = self.pending.replace((header.trim().to_string(), self.line_no));
                if let Some((name, line_no)) = current {
                    return Some(Ok(self.entry(name, line_no, sequence)));
                }
            } else if self.pending.is_some() {
                sequence.extend(line.chars().filter(|c| !c.is_whitespace()));
            } else if !line.trim().is_empty() {
                warn!(
                    "⚠️ Data before the first header ignored @@ {}:{}",
                    self.filename.display(),
                    self.line_no
                );
            }
        }
    }
}

/// 讀取 FASTA，名稱依序嘗試 GISAID、NAOMI、一般格式
pub fn read_fasta<B: Backend + ?Sized>(
    filename: &Path,
    lab_hint: Option<&str>,
    backend: &B,
    preprocessors: &DirectoryPreprocessors,
    collector: &mut MessageCollector,
) -> Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    for entry in FastaReader::open(filename)? {
        let entry = entry?;
        let mut context = Context::new(collector, preprocessors, &entry.filename, entry.line_no);
        let parsed = match gisaid_name_parser(&entry.name, &mut context, backend) {
            Ok(Some(metadata)) => Ok(metadata),
            Ok(None) => naomi_name_parser(&entry.name, &mut context, backend).map(|metadata| {
                metadata.unwrap_or_else(|| regular_name_parser(&entry.name, lab_hint, &mut context, backend))
            }),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(metadata) => records.push(SequenceRecord {
                metadata,
                sequence: entry.sequence,
            }),
            Err(e) => {
                warn!("⚠️ Record skipped @@ {}:{}: {}", entry.filename.display(), entry.line_no, e);
                context.message("name", entry.name.clone(), e.to_string(), None);
            }
        }
    }
    info!("📄 {}: {} sequences", filename.display(), records.len());
    Ok(records)
}
