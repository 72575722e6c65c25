use ae_tools::whocc::torg::{export_to_file, generate};
use ae_tools::whocc::{JsonTableExtractor, RuleDataFix, TableDir, TableExtractor};
use tempfile::TempDir;

const TABLE: &str = r#"{
  "lab": "CDC", "assay": "HI", "subtype": "A(H3N2)", "rbc": "Turkey", "date": "2021-04-21",
  "antigens": [
    {"name": "A/DARWIN/6/2021", "date": "2021-01-10", "passage": "E2", "lab_id": "CDC#1"},
    {"name": "A/KANSAS/14/2017", "date": "2017-12-14", "passage": "SIAT1", "lab_id": "CDC#2"}
  ],
  "sera": [
    {"name": "A/DARWIN/6/2021", "passage": "E2", "serum_id": "F1"},
    {"name": "A/HONG KONG/45/2019", "passage": "SIAT3", "serum_id": "F2"}
  ],
  "titers": [["1280", "40"], ["160/320", "<10"]]
}"#;

const DATA_FIX: &str = r#"
[[antigen_name]]
pattern = "^A/KANSAS/"
replacement = "A(H3N2)/KANSAS/"

[[titer]]
pattern = "^<10$"
replacement = "<20"
"#;

fn extractor(dir: &TempDir) -> anyhow::Result<JsonTableExtractor> {
    let path = dir.path().join("table.json");
    std::fs::write(&path, TABLE)?;
    Ok(JsonTableExtractor::from_file(&path)?)
}

#[test]
fn test_generate_with_data_fix() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let extractor = extractor(&dir)?;
    let data_fix = RuleDataFix::from_toml(DATA_FIX)?;
    let mut output = Vec::new();
    let info = generate(&extractor, &data_fix, &mut output)?;
    let text = String::from_utf8(output)?;

    assert!(info.multivalue_titer);
    assert!(text.starts_with("# -*- Org -*-\n"));
    assert!(text.contains("- Lab: CDC"));
    assert!(text.contains("A(H3N2)/KANSAS/14/2017"));
    assert!(text.contains("<20"));
    assert!(!text.contains("<10"));
    assert!(text.contains("  160 /   320"));
    Ok(())
}

#[test]
fn test_export_into_table_dir() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let extractor = extractor(&dir)?;
    let table_dir = TableDir::new(dir.path());
    assert_eq!(extractor.assay_low_rbc(), "hi-turkey");

    let output_dir = table_dir.output_dir(&extractor);
    std::fs::create_dir_all(output_dir.join("torg"))?;
    let info = export_to_file(&table_dir, &extractor, None)?;
    let torg = info.torg_filename.expect("torg filename");
    assert_eq!(torg.file_name().and_then(|name| name.to_str()), Some("h3-hi-turkey-cdc-20210421.torg"));
    assert!(std::fs::read_to_string(torg)?.contains("A/HONG KONG/45/2019"));
    Ok(())
}
