use crate::utils::error::Result;
use crate::utils::open_file;
use crate::whocc::data_fix::{DataFix, NoDataFix, RuleDataFix};
use crate::whocc::extractor::TableExtractor;
use crate::whocc::table_dir::TableDir;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const ANTIGEN_COLUMNS: [&str; 5] = ["serum_field_name", "name", "date", "passage", "lab_id"];
const SERUM_ROWS: [&str; 4] = ["antigen_field_name", "name", "passage", "serum_id"];

const LOCAL_VARIABLES: &str = "\
* COMMENT local vars ----------------------------------------------------------------------
:PROPERTIES:
:VISIBILITY: folded
:END:
#+STARTUP: showall indent
Local Variables:
eval: (if (fboundp 'eu-whocc-torg-to-ace) (add-hook 'after-save-hook 'eu-whocc-torg-to-ace nil 'local))
eval: (if (fboundp 'eu-whocc-xlsx-torg-ace-hup) (add-hook 'after-save-hook 'eu-whocc-xlsx-torg-ace-hup nil 'local))
End:
";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TorgInfo {
    pub assay: String,
    pub multivalue_titer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torg_filename: Option<PathBuf>,
}

/// 表頭 `- Key: value`；Rbc 與 Lineage 只在有值時輸出
pub fn header<E, F>(extractor: &E, data_fix: &F) -> (Vec<(&'static str, String)>, String)
where
    E: TableExtractor + ?Sized,
    F: DataFix + ?Sized,
{
    let assay = data_fix.assay(extractor.assay().to_string());
    let mut header = vec![
        ("Lab", data_fix.lab(extractor.lab().to_string())),
        ("Date", extractor.format_assay_data("{table_date:%Y-%m-%d}")),
        ("Assay", assay.clone()),
        ("Subtype", data_fix.subtype(extractor.subtype_without_lineage().to_string())),
    ];
    let rbc = data_fix.rbc(extractor.rbc().to_string());
    if !rbc.is_empty() {
        header.push(("Rbc", rbc));
    }
    let lineage = data_fix.lineage(extractor.lineage().to_string());
    if !lineage.is_empty() {
        header.push(("Lineage", lineage));
    }
    (header, assay)
}

/// 力價表格；`a/b` 兩個值的力價會標示 multivalue
pub fn table<E, F>(extractor: &E, data_fix: &F) -> (Vec<Vec<String>>, bool)
where
    E: TableExtractor + ?Sized,
    F: DataFix + ?Sized,
{
    let base_row = SERUM_ROWS.len();
    let base_column = ANTIGEN_COLUMNS.len();
    let column_of = |name: &str| ANTIGEN_COLUMNS.iter().position(|column| *column == name).unwrap_or(0);
    let row_of = |name: &str| SERUM_ROWS.iter().position(|row| *row == name).unwrap_or(0);

    let mut data =
        vec![vec![String::new(); extractor.number_of_sera() + base_column]; extractor.number_of_antigens() + base_row];
    for column in ["name", "date", "passage", "lab_id"] {
        data[0][column_of(column)] = column.to_string();
    }
    for row in ["name", "passage", "serum_id"] {
        data[row_of(row)][0] = row.to_string();
    }

    for serum_no in 0..extractor.number_of_sera() {
        let column = base_column + serum_no;
        let serum = data_fix.serum(extractor.serum(serum_no), serum_no);
        let boosted = if serum.boosted { "BOOSTED" } else { "" };
        data[row_of("name")][column] = [serum.name.as_str(), serum.conc.as_str(), serum.dilut.as_str(), boosted]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        data[row_of("passage")][column] = serum.passage;
        data[row_of("serum_id")][column] = serum.serum_id;
    }

    let mut multivalue_titer = false;
    for antigen_no in 0..extractor.number_of_antigens() {
        let row = base_row + antigen_no;
        let antigen = data_fix.antigen(extractor.antigen(antigen_no), antigen_no);
        data[row][column_of("name")] = antigen.name;
        data[row][column_of("date")] = antigen.date;
        data[row][column_of("passage")] = antigen.passage;
        data[row][column_of("lab_id")] = antigen.lab_id;

        for serum_no in 0..extractor.number_of_sera() {
            let titer = data_fix.titer(extractor.titer(antigen_no, serum_no), antigen_no, serum_no);
            let fields: Vec<&str> = titer.split('/').collect();
            data[row][base_column + serum_no] = if let [first, second] = fields[..] {
                multivalue_titer = true;
                format!("{:>5} / {:>5}", first, second)
            } else {
                format!("{:>5}", titer)
            };
        }
    }
    (data, multivalue_titer)
}

/// 輸出 torg (org-mode 力價表)
pub fn generate<E, F>(extractor: &E, data_fix: &F, output: &mut dyn Write) -> Result<TorgInfo>
where
    E: TableExtractor + ?Sized,
    F: DataFix + ?Sized,
{
    let (header_data, assay) = header(extractor, data_fix);
    writeln!(output, "# -*- Org -*-\n")?;
    for (key, value) in &header_data {
        writeln!(output, "- {}: {}", key, value)?;
    }
    writeln!(output)?;

    let (data, multivalue_titer) = table(extractor, data_fix);
    let columns = data.first().map_or(0, Vec::len);
    let widths: Vec<usize> = (0..columns)
        .map(|column| data.iter().map(|row| row[column].chars().count()).max().unwrap_or(0))
        .collect();
    for row in &data {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        writeln!(output, "| {} |", cells.join(" | "))?;
    }

    write!(output, "\n{}", LOCAL_VARIABLES)?;
    Ok(TorgInfo {
        assay,
        multivalue_titer,
        torg_filename: None,
    })
}

/// 表格目錄中有 data-fix 規則檔時使用之
pub fn load_data_fix<E: TableExtractor + ?Sized>(table_dir: &TableDir, extractor: &E) -> Result<Box<dyn DataFix>> {
    let path = table_dir.data_fix_pathname(extractor);
    if path.exists() {
        info!("🔧 Using data fix rules from {}", path.display());
        Ok(Box::new(RuleDataFix::from_file(&path)?))
    } else {
        warn!("⚠️ \"{}\" does not exist", path.display());
        Ok(Box::new(NoDataFix))
    }
}

/// 寫入 `{tables_dir}/{subtype-assay-lab}/torg/{stem}.torg` 或指定的目錄
pub fn export_to_file<E: TableExtractor + ?Sized>(
    table_dir: &TableDir,
    extractor: &E,
    output_dir: Option<&Path>,
) -> Result<TorgInfo> {
    let data_fix = load_data_fix(table_dir, extractor)?;
    let filename = table_dir.torg_pathname(extractor, output_dir)?;
    info!("📝 {}", filename.display());
    let mut output = open_file::for_writing(&filename)?;
    let mut torg_info = generate(extractor, data_fix.as_ref(), &mut output)?;
    output.flush()?;
    torg_info.torg_filename = Some(filename);
    Ok(torg_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whocc::extractor::test_table::sample;

    #[test]
    fn test_generate_torg() {
        let mut output = Vec::new();
        let torg_info = generate(&sample(), &NoDataFix, &mut output).unwrap();
        assert_eq!(torg_info.assay, "HI");
        assert!(torg_info.multivalue_titer);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# -*- Org -*-");
        assert_eq!(lines[2], "- Lab: CDC");
        assert_eq!(lines[3], "- Date: 2021-04-21");
        assert_eq!(lines[6], "- Rbc: Turkey");
        assert!(!text.contains("- Lineage"));
        assert!(text.contains("A/DARWIN/6/2021 1:4 BOOSTED"));
        assert!(text.contains("  160 /   320"));
        assert!(text.ends_with("End:\n"));

        let table_lines: Vec<&&str> = lines.iter().filter(|line| line.starts_with('|')).collect();
        assert_eq!(table_lines.len(), 6);
        assert!(table_lines[0].starts_with("|          | name "));
    }
}
