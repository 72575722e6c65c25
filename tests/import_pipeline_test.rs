use ae_tools::backend::BuiltinBackend;
use ae_tools::config::cli::ImportArgs;
use ae_tools::config::LocalStorage;
use ae_tools::core::{ImportEngine, SequenceImportPipeline};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

const FASTA: &str = "\
>A(H3N2)/Kansas/14/2017
acgt
ACGT
>B/Victoria/2/87|1987-01-01|E2
TTTT
>A/X/1/2020_|_a=1_|_
GG
";

fn import_args(input: std::path::PathBuf, output: &str) -> ImportArgs {
    ImportArgs {
        inputs: vec![input],
        ncbi: false,
        lab: Some("CDC".to_string()),
        output: Some(output.to_string()),
        report: None,
    }
}

#[tokio::test]
async fn test_fasta_import_writes_records_and_report() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("sequences.fas");
    std::fs::write(&input, FASTA)?;

    let storage = LocalStorage::new(dir.path().to_string_lossy().into_owned());
    let pipeline = SequenceImportPipeline::new(storage, import_args(input, "out/seq.json"), Arc::new(BuiltinBackend::new()));
    let engine = ImportEngine::new(pipeline);
    let output_path = engine.run().await?;
    assert_eq!(output_path, "out/seq.json");

    let records: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(dir.path().join("out/seq.json"))?)?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["metadata"]["name"], "A(H3N2)/KANSAS/14/2017");
    assert_eq!(records[0]["metadata"]["lab"], "CDC");
    assert_eq!(records[0]["sequence"], "ACGTACGT");
    assert_eq!(records[1]["metadata"]["lab"], "CRICK");

    // 欄位數錯誤的 GISAID 名稱被略過並寫入報表
    let report = std::fs::read_to_string(dir.path().join("out/seq.json.messages.org"))?;
    assert!(report.contains("sequences.fas"));
    Ok(())
}

#[tokio::test]
async fn test_report_path_overrides_default() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("sequences.fas");
    std::fs::write(&input, FASTA)?;

    let mut args = import_args(input, "seq.json");
    args.report = Some("reports/import.org".to_string());
    let storage = LocalStorage::new(dir.path().to_string_lossy().into_owned());
    let pipeline = SequenceImportPipeline::new(storage, args, Arc::new(BuiltinBackend::new()));
    ImportEngine::new(pipeline).run().await?;

    assert!(dir.path().join("reports/import.org").exists());
    assert!(!dir.path().join("seq.json.messages.org").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path().to_string_lossy().into_owned());
    let pipeline = SequenceImportPipeline::new(
        storage,
        import_args(dir.path().join("missing.fas"), "seq.json"),
        Arc::new(BuiltinBackend::new()),
    );
    let error = ImportEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(error, ae_tools::AeError::IoError(_)));
}
