use crate::chart::{AntigenSerum, Chart};
use crate::domain::ports::PassageParser;
use serde_json::Value;

fn passage_code<P: PassageParser + ?Sized>(parser: &P, entry: &dyn AntigenSerum) -> Option<&'static str> {
    if !entry.reassortant().is_empty() {
        Some("r")
    } else if parser.is_egg(entry.passage()) {
        Some("e")
    } else if parser.is_cell(entry.passage()) {
        Some("c")
    } else {
        None
    }
}

/// 為所有抗原與血清設定繼代種類 `"p"`：r / e / c
pub fn attributes<P: PassageParser + ?Sized>(chart: &mut Chart, parser: &P) {
    for antigen in chart.antigens_mut() {
        if let Some(code) = passage_code(parser, antigen) {
            antigen.set_semantic("p", Value::from(code));
        }
    }
    for serum in chart.sera_mut() {
        if let Some(code) = passage_code(parser, serum) {
            serum.set_semantic("p", Value::from(code));
        }
    }
}
