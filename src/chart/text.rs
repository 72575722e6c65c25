use crate::chart::info::info;
use crate::chart::{AntigenSerum, Chart};
use crate::domain::ports::Backend;
use crate::utils::format_table::{format_table, Cell};
use crate::virus::name_abbreviated_location_isolation_year;
use std::collections::HashSet;

const HEADER_PREFIX_COLUMNS: usize = 6;

fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 摘要加上力價表：血清表頭五列，之後每個抗原一列
pub fn text<B: Backend + ?Sized>(chart: &Chart, backend: &B) -> String {
    let header = |cells: Vec<Cell>| -> Vec<Cell> {
        let mut row: Vec<Cell> = (0..HEADER_PREFIX_COLUMNS).map(|_| Cell::from("")).collect();
        row.extend(cells);
        row
    };
    let references: HashSet<usize> = chart.reference_antigen_indexes().into_iter().collect();
    let sequenced = chart.antigens().iter().filter(|antigen| !antigen.aa.is_empty()).count();
    let sera = chart.sera();
    let titers = chart.titers();

    let mut table = vec![
        header((0..sera.len()).map(|no| Cell::Centered(no.to_string())).collect()),
        header(
            sera.iter()
                .map(|serum| Cell::from(name_abbreviated_location_isolation_year(&serum.name, backend)))
                .collect(),
        ),
        header(
            sera.iter()
                .map(|serum| {
                    Cell::from(join_non_empty(
                        serum
                            .annotations
                            .iter()
                            .map(String::as_str)
                            .chain([serum.reassortant.as_str()]),
                    ))
                })
                .collect(),
        ),
        header(sera.iter().map(|serum| Cell::from(serum.passage.as_str())).collect()),
        header(sera.iter().map(|serum| Cell::from(serum.serum_id.as_str())).collect()),
        vec![
            Cell::from(""),
            Cell::from(""),
            Cell::from(""),
            Cell::from(""),
            Cell::from(""),
            Cell::from(format!("{}/{}", sequenced, chart.number_of_antigens())),
            Cell::from(""),
        ],
    ];

    for (antigen_no, antigen) in chart.antigens().iter().enumerate() {
        let mut row = vec![
            Cell::from(antigen_no),
            Cell::from(join_non_empty(
                [antigen.name()]
                    .into_iter()
                    .chain(antigen.annotations().iter().map(String::as_str))
                    .chain([antigen.reassortant()]),
            )),
            Cell::from(antigen.passage.as_str()),
            Cell::from(antigen.date.as_str()),
            Cell::from(if references.contains(&antigen_no) { ":ref" } else { "" }),
            Cell::from(if antigen.aa.is_empty() { "" } else { ":seq" }),
        ];
        row.extend((0..sera.len()).map(|serum_no| Cell::RightAligned(titers.titer(antigen_no, serum_no).to_string())));
        table.push(row);
    }

    format!("{}\n{}", info(chart, false), format_table(&table, "  ", None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BuiltinBackend;
    use crate::chart::test_chart::sample;

    #[test]
    fn test_text_table() {
        let text = text(&sample(), &BuiltinBackend::new());
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("CDC A(H3N2) HINT 20210421 3:2"));
        assert!(text.contains("DARWIN/6/21"));
        assert!(text.contains("1/3"));
        let darwin = lines
            .iter()
            .find(|line| line.contains("IVR-227") && line.contains(":ref"))
            .unwrap();
        let titers: Vec<&str> = darwin.split_whitespace().rev().take(2).collect();
        assert_eq!(titers, vec!["40", "1280"]);
        let kansas = lines.iter().find(|line| line.contains("KANSAS")).unwrap();
        assert!(kansas.contains(":seq"));
        let titers: Vec<&str> = kansas.split_whitespace().rev().take(2).collect();
        assert_eq!(titers, vec!["*", "160"]);
    }
}
