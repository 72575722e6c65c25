use crate::chart::Chart;
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

static TRAILING_ZEROS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"0+$").expect("static regex"));

/// 圖表摘要；show_all 時加上每個投影、來源表與 forced column bases
pub fn info(chart: &Chart, show_all: bool) -> String {
    let num_projections = chart.number_of_projections();
    let nprj = if num_projections > 0 {
        format!("projections:{}", num_projections)
    } else {
        "no projections".to_string()
    };

    let chart_fcb = chart.forced_column_bases();
    let fcb = match (chart_fcb.is_empty(), show_all) {
        (true, _) => String::new(),
        (false, true) => "  forced column bases: see after sources below".to_string(),
        (false, false) => format!("  forced column bases: {:?}", chart_fcb),
    };

    let mut projections = String::new();
    if show_all {
        for (projection_no, projection) in chart.projections().iter().enumerate() {
            let _ = write!(
                projections,
                "{:3}  {:11.6} >={}",
                projection_no,
                projection.stress.unwrap_or(f64::NAN),
                projection.minimum_column_basis()
            );
            if !projection.comment.is_empty() {
                let _ = write!(projections, " <{}>", projection.comment);
            }
            if !projection.forced_column_bases.is_empty() {
                if projection.forced_column_bases == chart_fcb {
                    projections.push_str(" chart-forced-column-bases");
                } else {
                    let _ = write!(projections, " {:?}", projection.forced_column_bases);
                }
            }
            if !projection.disconnected.is_empty() {
                let _ = write!(projections, " discon:{:?}", projection.disconnected);
            }
            if !projection.unmovable.is_empty() {
                let _ = write!(projections, " unmov:{:?}", projection.unmovable);
            }
            if !projection.unmovable_in_the_last_dimension.is_empty() {
                let _ = write!(projections, " unmov-last:{:?}", projection.unmovable_in_the_last_dimension);
            }
            projections.push('\n');
        }
    }

    let mut sources = String::new();
    let mut colbases = String::new();
    if show_all {
        let chart_info = chart.info();
        if !chart_info.sources.is_empty() {
            let _ = writeln!(sources, "sources {}", chart_info.sources.len());
            for (source_no, source) in chart_info.sources.iter().enumerate() {
                let _ = writeln!(sources, "{:3} {} {}", source_no, source.date, source.make_name());
            }
            sources.push('\n');
        }
        if !chart_fcb.is_empty() {
            colbases.push_str("forced column bases\n");
            for (serum_no, serum) in chart.sera().iter().enumerate() {
                let value = chart_fcb.get(serum_no).copied().unwrap_or(f64::NAN);
                let _ = writeln!(
                    colbases,
                    "{:3}     {}   {} {} {}",
                    serum_no,
                    blank_trailing_zeros(&format!("{:11.8}", value)),
                    serum.name,
                    serum.serum_id,
                    serum.passage
                );
            }
        }
    }

    let first = format!(
        "{} {}:{} {}",
        chart.name(),
        chart.number_of_antigens(),
        chart.number_of_sera(),
        nprj
    );
    [first, fcb, projections, sources, colbases]
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `"   10.50000000"` → `"   10.5       "`，整數時連小數點也換成空白
fn blank_trailing_zeros(formatted: &str) -> String {
    let blanked = TRAILING_ZEROS_RE.replace(formatted, |captures: &regex::Captures| " ".repeat(captures[0].len()));
    blanked.replace(". ", "  ")
}
