use crate::chart::{AntigenSerum, Chart, Modifier, Only, Selector};
use crate::domain::parsing::PassageType;
use crate::domain::ports::PassageParser;
use crate::semantic::StyleNames;
use serde_json::{json, Map, Value};
use tracing::warn;

/// 依血清繼代種類選顏色的圓圈樣式；`outline`、`fill` 可以是
/// `{"egg": .., "cell": .., "reassortant": ..}` 或單一顏色
#[derive(Debug, Clone)]
pub struct SerumCircleOptions {
    pub fold: f64,
    pub theoretical: bool,
    pub fallback: bool,
    pub circle_style: Map<String, Value>,
}

impl Default for SerumCircleOptions {
    fn default() -> Self {
        let circle_style = json!({
            "outline": {"egg": "red", "cell": "blue", "reassortant": "orange"},
            "fill": {"egg": "transparent", "cell": "transparent", "reassortant": "transparent"},
            "outline_width": 1.0,
            "dash": 0,
        });
        Self {
            fold: 2.0,
            theoretical: false,
            fallback: true,
            circle_style: match circle_style {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }
}

fn serum_passage_key<P: PassageParser + ?Sized>(parser: &P, serum: &dyn AntigenSerum) -> &'static str {
    if !serum.reassortant().is_empty() {
        return "reassortant";
    }
    match parser.passage_type(serum.passage()) {
        PassageType::Egg => "egg",
        _ => "cell",
    }
}

fn pick_by_passage(value: &mut Value, passage_key: &str) {
    if let Value::Object(by_passage) = value {
        *value = by_passage.get(passage_key).cloned().unwrap_or(Value::Null);
    }
}

/// sera 為 None 時對所有血清加上圓圈
pub fn style<P: PassageParser + ?Sized>(
    chart: &mut Chart,
    parser: &P,
    style_name: &str,
    priority: i64,
    sera: Option<&[usize]>,
    options: &SerumCircleOptions,
) -> StyleNames {
    let num_sera = chart.number_of_sera();
    let sera: Vec<usize> = sera.map_or_else(|| (0..num_sera).collect(), <[usize]>::to_vec);
    let mut modifiers = Vec::with_capacity(sera.len());
    for serum_no in sera {
        let Some(serum) = chart.sera().get(serum_no) else {
            warn!("⚠️ serum_circle: invalid serum no {}, number of sera in the chart: {}", serum_no, num_sera);
            continue;
        };
        let passage_key = serum_passage_key(parser, serum);
        let mut circle_style = options.circle_style.clone();
        for field in ["outline", "fill"] {
            if let Some(value) = circle_style.get_mut(field) {
                pick_by_passage(value, passage_key);
            }
        }
        if let Some(outline) = circle_style
            .get_mut("radius_lines")
            .and_then(|lines| lines.get_mut("outline"))
        {
            pick_by_passage(outline, passage_key);
        }
        modifiers.push(
            Modifier::new().selector(Selector::index(serum_no)).only(Only::Sera).extra(
                "serum_circle",
                json!({
                    "fold": options.fold,
                    "theoretical": options.theoretical,
                    "fallback": options.fallback,
                    "style": circle_style,
                }),
            ),
        );
    }
    let style = chart.style_mut(style_name);
    style.set_priority(priority);
    for modifier in modifiers {
        style.add_modifier(modifier);
    }
    StyleNames::from([style_name.to_string()])
}
