use crate::chart::{AntigenSerum, Chart};
use crate::domain::ports::Backend;
use crate::semantic::{num_digits, passage_is, PassageKind};
use crate::virus::add_subtype_prefix;
use serde::Serialize;
use std::collections::BTreeMap;

/// 找到的抗原：索引、designation 與出現的層
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundAntigen {
    pub no: usize,
    pub designation: String,
    pub layers: Vec<usize>,
}

impl FoundAntigen {
    /// 只有一層 (或沒有層) 時視為在第 0 層
    pub fn new(chart: &Chart, antigen_no: usize) -> Self {
        let titers = chart.titers();
        Self {
            no: antigen_no,
            designation: chart.antigens()[antigen_no].designation(),
            layers: if titers.number_of_layers() > 1 {
                titers.layers_with_antigen(antigen_no)
            } else {
                vec![0]
            },
        }
    }
}

pub type FoundByPassage = BTreeMap<PassageKind, Vec<FoundAntigen>>;

/// 名稱相符、繼代種類相符且在第一個投影中相連的抗原，依層數由多到少
pub(crate) fn select_by_name_and_passage<B: Backend + ?Sized>(
    chart: &Chart,
    backend: &B,
    name: &str,
    kind: PassageKind,
    skip_distinct: bool,
) -> Vec<usize> {
    let mut antigens = chart.select_antigens(|antigen_no, antigen| {
        antigen.name == name
            && !(skip_distinct && antigen.distinct())
            && passage_is(backend, antigen, kind)
            && chart.point_connected(antigen_no)
    });
    if chart.titers().number_of_layers() > 0 && antigens.len() > 1 {
        chart.sort_by_number_of_layers_descending(&mut antigens);
    }
    antigens
}

/// 報表中的一段：`cel AG  3 名稱 layers: (2)[0, 1]`，同一段內換行縮排
pub(crate) fn format_found(kind: PassageKind, antigens: &[FoundAntigen], antigen_no_width: usize, has_layers: bool) -> String {
    let lines = antigens
        .iter()
        .map(|found| {
            let layers = if has_layers {
                format!(" layers: ({}){:?}", found.layers.len(), found.layers)
            } else {
                String::new()
            };
            format!("AG {:width$} {}{}", found.no, found.designation, layers, width = antigen_no_width)
        })
        .collect::<Vec<_>>()
        .join("\n      ");
    format!("{} {}", &kind.as_str()[..3], lines)
}

pub(crate) fn report_layout(chart: &Chart) -> (usize, bool) {
    (num_digits(chart.number_of_antigens()), chart.titers().number_of_layers() > 0)
}

pub struct AntigenFinder<'a, B: ?Sized> {
    chart: &'a Chart,
    backend: &'a B,
    type_subtype: String,
}

impl<'a, B: Backend + ?Sized> AntigenFinder<'a, B> {
    pub fn new(chart: &'a Chart, backend: &'a B) -> Self {
        Self {
            chart,
            backend,
            type_subtype: chart.type_subtype(),
        }
    }

    /// 依繼代種類分組；找不到時回傳空的 map
    pub fn find(&self, name: &str, passage: Option<PassageKind>) -> FoundByPassage {
        let name = add_subtype_prefix(&self.type_subtype, &name.to_uppercase());
        PassageKind::selected(passage)
            .into_iter()
            .filter_map(|kind| {
                let antigens = select_by_name_and_passage(self.chart, self.backend, &name, kind, true);
                if antigens.is_empty() {
                    None
                } else {
                    let found = antigens
                        .into_iter()
                        .map(|antigen_no| FoundAntigen::new(self.chart, antigen_no))
                        .collect();
                    Some((kind, found))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BuiltinBackend;
    use crate::chart::test_chart::sample;

    #[test]
    fn test_find_by_passage() {
        let chart = sample();
        let backend = BuiltinBackend::new();
        let finder = AntigenFinder::new(&chart, &backend);

        let found = finder.find("darwin/6/2021", None);
        assert_eq!(found.keys().copied().collect::<Vec<_>>(), vec![PassageKind::Reassortant]);
        assert_eq!(found[&PassageKind::Reassortant][0].no, 0);
        assert_eq!(found[&PassageKind::Reassortant][0].layers, vec![0]);

        // 抗原 2 在投影中未相連
        assert!(finder.find("DARWIN/6/2021", Some(PassageKind::Cell)).is_empty());
        assert_eq!(finder.find("KANSAS/14/2017", Some(PassageKind::Cell))[&PassageKind::Cell][0].no, 1);
    }

    #[test]
    fn test_format_found() {
        let found = vec![
            FoundAntigen {
                no: 3,
                designation: "A(H3N2)/DARWIN/6/2021 E2".to_string(),
                layers: vec![0, 2],
            },
            FoundAntigen {
                no: 12,
                designation: "A(H3N2)/DARWIN/6/2021 E3".to_string(),
                layers: vec![1],
            },
        ];
        assert_eq!(
            format_found(PassageKind::Egg, &found, 2, true),
            "egg AG  3 A(H3N2)/DARWIN/6/2021 E2 layers: (2)[0, 2]\n      AG 12 A(H3N2)/DARWIN/6/2021 E3 layers: (1)[1]"
        );
        assert_eq!(
            format_found(PassageKind::Reassortant, &found[..1], 1, false),
            "rea AG 3 A(H3N2)/DARWIN/6/2021 E2"
        );
    }
}
