use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

fn is_zero(value: &i64) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// 以語意屬性為基礎的繪圖樣式 (`c.R` 的一個項目)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotStyle {
    #[serde(rename = "z", default, skip_serializing_if = "is_zero")]
    pub priority: i64,
    #[serde(rename = "t", default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(rename = "V", default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Vec<f64>>,
    #[serde(rename = "A", default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(rename = "T", default, skip_serializing_if = "PlotTitle::is_default")]
    pub plot_title: PlotTitle,
    #[serde(rename = "L", default, skip_serializing_if = "Legend::is_default")]
    pub legend: Legend,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlotStyle {
    pub fn add_modifier(&mut self, modifier: Modifier) -> &mut Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn set_priority(&mut self, priority: i64) -> &mut Self {
        self.priority = priority;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotTitle {
    #[serde(rename = "-", default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(rename = "T", default, skip_serializing_if = "TextData::is_default")]
    pub text: TextData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlotTitle {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    #[serde(rename = "t", default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextData {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    #[serde(rename = "-", default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(rename = "C", default, skip_serializing_if = "Option::is_none")]
    pub add_counter: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Legend {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn shown(&self) -> bool {
        !self.hidden
    }

    pub fn set_shown(&mut self, shown: bool) {
        self.hidden = !shown;
    }
}

/// 修飾器要套用的對象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Only {
    Antigens,
    Sera,
}

impl Serialize for Only {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(*self == Only::Antigens)
    }
}

impl<'de> Deserialize<'de> for Only {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // true/1 為抗原，false/0 為血清
        match Value::deserialize(deserializer)? {
            Value::Bool(true) => Ok(Only::Antigens),
            Value::Bool(false) => Ok(Only::Sera),
            Value::Number(n) if n.as_i64() == Some(1) => Ok(Only::Antigens),
            Value::Number(n) if n.as_i64() == Some(0) => Ok(Only::Sera),
            other => Err(serde::de::Error::custom(format!("invalid \"A\" value: {}", other))),
        }
    }
}

impl std::str::FromStr for Only {
    type Err = String;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source {
            "antigens" | "antigen" | "ag" => Ok(Only::Antigens),
            "sera" | "serum" | "sr" => Ok(Only::Sera),
            other => Err(format!("invalid \"only\": {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawingOrder {
    #[serde(rename = "r")]
    Raise,
    #[serde(rename = "l")]
    Lower,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    #[serde(rename = "-", default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<[f64; 2]>,
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "f", default, skip_serializing_if = "Option::is_none")]
    pub face: Option<String>,
    #[serde(rename = "S", default, skip_serializing_if = "Option::is_none")]
    pub slant: Option<String>,
    #[serde(rename = "W", default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(rename = "i", default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LabelStyle {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegendRow {
    #[serde(rename = "p", default)]
    pub priority: i64,
    #[serde(rename = "t", default)]
    pub text: String,
}

/// 選擇抗原/血清的條件：語意屬性、`!D` 日期區間、`!i` 個別索引
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(pub Map<String, Value>);

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// 日期範圍 `[first, last)`，空字串代表不限
    pub fn date_range(self, first: &str, last: &str) -> Self {
        self.attribute("!D", json!([first, last]))
    }

    pub fn index(no: usize) -> Self {
        Self::new().attribute("!i", no)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(rename = "R", default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(rename = "T", default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<Selector>,
    #[serde(rename = "A", default, skip_serializing_if = "Option::is_none")]
    pub only: Option<Only>,
    #[serde(rename = "S", default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(rename = "F", default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(rename = "O", default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
    #[serde(rename = "o", default, skip_serializing_if = "Option::is_none")]
    pub outline_width: Option<f64>,
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(rename = "-", default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(rename = "D", default, skip_serializing_if = "Option::is_none")]
    pub order: Option<DrawingOrder>,
    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelStyle>,
    #[serde(rename = "L", default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendRow>,
    /// serum_circle、serum_coverage 等額外資料
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Modifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn only(mut self, only: Only) -> Self {
        self.only = Some(only);
        self
    }

    pub fn shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    pub fn fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn outline(mut self, outline: impl Into<String>) -> Self {
        self.outline = Some(outline.into());
        self
    }

    pub fn outline_width(mut self, width: f64) -> Self {
        self.outline_width = Some(width);
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn hide(mut self, hide: bool) -> Self {
        self.hide = Some(hide);
        self
    }

    pub fn raise(mut self) -> Self {
        self.order = Some(DrawingOrder::Raise);
        self
    }

    pub fn lower(mut self) -> Self {
        self.order = Some(DrawingOrder::Lower);
        self
    }

    pub fn label(mut self, label: LabelStyle) -> Self {
        self.label = Some(label);
        self
    }

    pub fn legend(mut self, text: impl Into<String>, priority: i64) -> Self {
        self.legend = Some(LegendRow {
            priority,
            text: text.into(),
        });
        self
    }

    pub fn extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// 以另一個修飾器中有設定的欄位覆寫
    pub fn merged_with(mut self, other: &Modifier) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take!(parent, selector, only, shape, fill, outline, outline_width, size, hide, order, label, legend);
        self.extra.extend(other.extra.clone());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_serialization() {
        let modifier = Modifier::new()
            .selector(Selector::new().attribute("R", false).date_range("", "2020-01-01"))
            .hide(true)
            .only(Only::Antigens)
            .raise()
            .legend("2a", 99);
        let value = serde_json::to_value(&modifier).unwrap();
        assert_eq!(
            value,
            json!({"T": {"R": false, "!D": ["", "2020-01-01"]}, "-": true, "A": true, "D": "r", "L": {"p": 99, "t": "2a"}})
        );
        let back: Modifier = serde_json::from_value(value).unwrap();
        assert_eq!(back, modifier);
    }

    #[test]
    fn test_only_accepts_numbers() {
        let modifier: Modifier = serde_json::from_str(r#"{"A": 0, "serum_circle": {"fold": 2.0}}"#).unwrap();
        assert_eq!(modifier.only, Some(Only::Sera));
        assert_eq!(modifier.extra["serum_circle"]["fold"], 2.0);
    }

    #[test]
    fn test_style_defaults_are_omitted() {
        let mut style = PlotStyle::default();
        style.set_priority(1000).add_modifier(Modifier::new().fill(":pale"));
        let value = serde_json::to_value(&style).unwrap();
        assert_eq!(value, json!({"z": 1000, "A": [{"F": ":pale"}]}));
    }

    #[test]
    fn test_merged_with() {
        let base = Modifier::new().fill("orange").size(30.0);
        let merged = base.merged_with(&Modifier::new().size(50.0).outline("black"));
        assert_eq!(merged.fill.as_deref(), Some("orange"));
        assert_eq!(merged.size, Some(50.0));
        assert_eq!(merged.outline.as_deref(), Some("black"));
    }
}
