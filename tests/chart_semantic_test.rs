use ae_tools::backend::BuiltinBackend;
use ae_tools::chart::{info::info, Chart};
use ae_tools::semantic::{clade, pale, passage, reference, time_series, vaccine};
use ae_tools::utils::time_series::Period;
use ae_tools::whocc::AceDataFixer;
use tempfile::TempDir;

const ACE: &str = r#"{
  "  version": "acmacs-ace-v1",
  "c": {
    "i": {"V": "A(H3N2)", "A": "HI", "l": "CDC", "D": "20211104"},
    "a": [
      {"N": "A/Darwin/6/2021", "P": "e2", "D": "2021-01-10"},
      {"N": "A(H3N2)/CAMBODIA/925256/2020", "P": "SIAT2", "D": "2020-09-29", "A": "QKIPGNDNSTATLCLGHHAVPNGTIVKTITNDRIEVTNATELVQ"},
      {"N": "A(H3N2)/KANSAS/14/2017", "P": "SIAT1", "D": "2017-12-14"},
      {"N": "A(H3N2)/BANGLADESH/4005/2020", "P": "MDCK1", "D": "2021-08-15"}
    ],
    "s": [
      {"N": "A(H3N2)/DARWIN/6/2021", "I": "F1", "P": "E2"}
    ],
    "t": {"l": [["1280"], ["640"], ["40"], ["160"]]}
  }
}"#;

fn chart() -> Chart {
    Chart::from_json_str(ACE).unwrap()
}

#[test]
fn test_fix_names_then_mark_references() -> anyhow::Result<()> {
    let backend = BuiltinBackend::new();
    let mut chart = chart();
    let mut fixer = AceDataFixer::new(&chart, &backend);
    fixer.process(&mut chart);
    assert_eq!(chart.antigens()[0].name, "A(H3N2)/DARWIN/6/2021");
    assert_eq!(chart.antigens()[0].passage, "E2");

    // 名稱正規化後才能與血清配對
    assert_eq!(chart.reference_antigen_indexes(), vec![0]);
    reference::attributes(&mut chart);
    passage::attributes(&mut chart, &backend);
    assert_eq!(chart.antigens()[0].semantic["R"], true);
    assert_eq!(chart.antigens()[0].semantic["p"], "e");
    assert_eq!(chart.antigens()[3].semantic["p"], "c");
    Ok(())
}

#[test]
fn test_styles_survive_write_and_read() -> anyhow::Result<()> {
    let backend = BuiltinBackend::new();
    let mut chart = chart();
    pale::style(&mut chart, pale::DEFAULT_STYLE_NAME);
    let names = time_series::style(&mut chart, time_series::DEFAULT_PREFIX, None, None, Period::Year)?;
    assert_eq!(names.len(), 5);
    assert!(names.contains("-ts-2017"));
    assert!(names.contains("-ts-2021"));

    let entries: Vec<vaccine::VaccineEntry> =
        serde_json::from_str(r#"[{"name": "KANSAS/14/2017", "year": "2019"}]"#)?;
    let (style_name, report) =
        vaccine::vaccines_and_plot_style(&mut chart, &backend, &entries, &vaccine::default_modifier())
            .expect("vaccine found");
    assert_eq!(style_name, vaccine::VACCINES_STYLE_NAME);
    assert!(report.report().contains("KANSAS/14/2017"));

    let clades: Vec<clade::CladeEntry> = serde_json::from_str(r#"[{"clade": "3C.2A1B", "fill": "red"}]"#)?;
    clade::clades(&mut chart, "clades", &clades, &clade::default_modifier(), true);

    let dir = TempDir::new()?;
    let path = dir.path().join("semantic.ace");
    chart.write(&path)?;
    let back = Chart::read(&path)?;
    assert!(back.styles().contains_key(pale::DEFAULT_STYLE_NAME));
    assert!(back.styles().contains_key("-ts-2019"));
    assert!(back.styles().contains_key("-vaccines"));
    assert_eq!(back.antigens()[2].semantic["V"], "2019");
    assert!(info(&back, false).starts_with("CDC A(H3N2) HI 20211104 4:1"));
    Ok(())
}
