use crate::config::directory_config::DirectoryPreprocessors;
use crate::domain::model::{Metadata, SequenceRecord};
use crate::domain::ports::Backend;
use crate::sequences::source::context::Context;
use crate::sequences::source::fasta::FastaReader;
use crate::sequences::source::messages::MessageCollector;
use crate::sequences::source::parse::{parse_date, parse_name};
use crate::utils::error::{AeError, Result};
use crate::utils::open_file;
use csv::ReaderBuilder;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const NA_DAT: &str = "influenza_na.dat";
const FNA: &str = "influenza.fna";
const NA_DAT_FIELDS: usize = 11;
const HA_SEGMENT: &str = "4";

/// NCBI 流感資料庫下載目錄
pub struct NcbiReader<'a, B: Backend + ?Sized> {
    backend: &'a B,
    preprocessors: &'a DirectoryPreprocessors,
}

impl<'a, B: Backend + ?Sized> NcbiReader<'a, B> {
    pub fn new(backend: &'a B, preprocessors: &'a DirectoryPreprocessors) -> Self {
        Self { backend, preprocessors }
    }

    pub fn read(&self, ncbi_dir: &Path, collector: &mut MessageCollector) -> Result<Vec<SequenceRecord>> {
        let na_dat = find_file(ncbi_dir, NA_DAT).ok_or_else(|| AeError::ProcessingError {
            message: format!("{} not found in {}", NA_DAT, ncbi_dir.display()),
        })?;
        let mut records = self.read_influenza_na_dat(&na_dat, collector)?;
        info!("🧬 {}: {} HA entries", na_dat.display(), records.len());

        if let Some(fna) = find_file(ncbi_dir, FNA) {
            let sequences = read_sequences_by_accession(&fna)?;
            let mut attached = 0;
            for record in &mut records {
                let sequence = record
                    .field("sample_id_by_sample_provider")
                    .and_then(|accession| sequences.get(accession));
                if let Some(sequence) = sequence {
                    record.sequence = sequence.clone();
                    attached += 1;
                }
            }
            info!("🧬 {}: attached {} sequences", fna.display(), attached);
        }
        Ok(records)
    }

    fn read_influenza_na_dat(&self, filename: &Path, collector: &mut MessageCollector) -> Result<Vec<SequenceRecord>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(open_file::for_reading(filename)?);

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            let line_no = row.position().map_or(index as u64 + 1, |position| position.line()) as usize;
            if row.len() != NA_DAT_FIELDS {
                warn!("⚠️ Invalid number of fields ({}) @@ {}:{}", row.len(), filename.display(), line_no);
                continue;
            }
            // genbank_accession, host, segment_no, subtype, country, date, sequence_length, virus_name, age, gender, completeness
            if &row[2] != HA_SEGMENT {
                continue;
            }
            let Some(name) = extract_name(&row[7]) else {
                continue;
            };

            let mut context = Context::new(collector, self.preprocessors, filename, line_no);
            let mut metadata = Metadata::new();
            metadata.insert("sample_id_by_sample_provider".to_string(), Value::String(row[0].to_string()));
            metadata.insert("subtype".to_string(), Value::String(row[3].to_string()));
            metadata.insert("country".to_string(), Value::String(row[4].to_string()));
            metadata.insert("line_no".to_string(), json!(line_no));
            let parsed_name = parse_name(name, &metadata, &mut context, self.backend);
            metadata.insert("name".to_string(), Value::String(parsed_name));
            let date = parse_date(&row[5], &metadata, &mut context, self.backend);
            metadata.insert("date".to_string(), Value::String(date));
            records.push(SequenceRecord {
                metadata,
                sequence: String::new(),
            });
        }
        Ok(records)
    }
}

/// `Influenza A virus (A/...)` → `A/...`
pub fn extract_name(source: &str) -> Option<&str> {
    let source = source.trim();
    let inner = source.strip_suffix(')')?;
    let upper = inner.get(..19).map(str::to_uppercase);
    if matches!(upper.as_deref(), Some("INFLUENZA A VIRUS (") | Some("INFLUENZA B VIRUS (")) {
        return inner.get(19..);
    }
    let upper = inner.get(..18).map(str::to_uppercase);
    if matches!(upper.as_deref(), Some("INFLUENZA A VIRUS(") | Some("INFLUENZA B VIRUS(")) {
        return inner.get(18..);
    }
    None
}

fn find_file(directory: &Path, stem: &str) -> Option<PathBuf> {
    ["", ".gz", ".xz", ".bz2"]
        .iter()
        .map(|suffix| directory.join(format!("{}{}", stem, suffix)))
        .find(|path| path.is_file())
}

/// `gb|CY021709|...` 取 `|gb|` 後的登錄號，否則取標頭第一個字
fn accession_of(header: &str) -> &str {
    let after_gb = header
        .strip_prefix("gb|")
        .or_else(|| header.split_once("|gb|").map(|(_, rest)| rest));
    match after_gb {
        Some(rest) => rest.split(['|', ':']).next().unwrap_or(rest),
        None => header.split_whitespace().next().unwrap_or(header),
    }
}

fn read_sequences_by_accession(filename: &Path) -> Result<HashMap<String, String>> {
    let mut sequences = HashMap::new();
    for entry in FastaReader::open(filename)? {
        let entry = entry?;
        let accession = accession_of(&entry.name);
        let accession = accession.split('.').next().unwrap_or(accession).to_string();
        sequences.insert(accession, entry.sequence);
    }
    Ok(sequences)
}
