use crate::utils::error::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// None: 單行輸出
    pub indent: Option<usize>,
    /// 較寬的行：簡單的物件/陣列寫在同一行
    pub compact: bool,
    pub one_line_max_width: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            indent: None,
            compact: true,
            one_line_max_width: 200,
        }
    }
}

impl DumpOptions {
    pub fn indented(indent: usize) -> Self {
        Self {
            indent: Some(indent),
            ..Self::default()
        }
    }
}

fn indent_marker(indent: usize) -> String {
    format!(
        "{{{:width$}\"_\":\"-*- js-indent-level: {} -*-\",",
        "",
        indent,
        width = indent.saturating_sub(1)
    )
}

pub fn dumps(data: &Value, options: &DumpOptions) -> Result<String> {
    let mut data = data.clone();
    if let Value::Object(map) = &mut data {
        map.remove("_");
    }

    match options.indent {
        Some(indent) if options.compact && indent > 0 => Ok(Compact {
            indent_increment: indent,
            one_line_max_width: options.one_line_max_width,
        }
        .dump(&data, indent, true)),
        Some(indent) if indent > 0 => {
            let indent_str = " ".repeat(indent);
            let mut output = Vec::new();
            let formatter = PrettyFormatter::with_indent(indent_str.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut output, formatter);
            data.serialize(&mut serializer)?;
            let text = String::from_utf8_lossy(&output).into_owned();
            match (&data, text.strip_prefix('{')) {
                (Value::Object(map), Some(rest)) if !map.is_empty() => {
                    Ok(format!("{}{}", indent_marker(indent), rest))
                }
                _ => Ok(text),
            }
        }
        _ => Ok(serde_json::to_string(&data)?),
    }
}

/// 沒有巢狀結構 (且物件欄位少於 17 個) 的值寫成單行
pub fn is_simple(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.len() < 17 && !map.values().any(is_container),
        Value::Array(items) => !items.iter().any(is_container),
        _ => true,
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn scalar(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

pub fn one_line(value: &Value) -> String {
    match value {
        Value::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(key, value)| format!("{}: {}", scalar(&Value::String(key.clone())), one_line(value)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Value::Array(items) => format!("[{}]", items.iter().map(one_line).collect::<Vec<_>>().join(", ")),
        other => scalar(other),
    }
}

struct Compact {
    indent_increment: usize,
    one_line_max_width: usize,
}

impl Compact {
    fn end(&self, symbol: &str, indent: usize) -> String {
        if indent > self.indent_increment {
            format!("{}{}", " ".repeat(indent - self.indent_increment), symbol)
        } else {
            symbol.to_string()
        }
    }

    fn dump(&self, data: &Value, indent: usize, toplevel: bool) -> String {
        if indent == 0 || is_simple(data) {
            return one_line(data);
        }

        let mut lines = Vec::new();
        match data {
            Value::Object(map) => {
                lines.push(if toplevel {
                    indent_marker(self.indent_increment)
                } else {
                    "{".to_string()
                });
                for (no, (key, value)) in map.iter().enumerate() {
                    let comma = if no + 1 < map.len() { "," } else { "" };
                    lines.push(format!(
                        "{}{}: {}{}",
                        " ".repeat(indent),
                        scalar(&Value::String(key.clone())),
                        self.dump(value, indent + self.indent_increment, false),
                        comma
                    ));
                }
                lines.push(self.end("}", indent));
            }
            Value::Array(items) => {
                lines.push("[".to_string());
                for (no, value) in items.iter().enumerate() {
                    let comma = if no + 1 < items.len() { "," } else { "" };
                    lines.push(format!(
                        "{}{}{}",
                        " ".repeat(indent),
                        self.dump(value, indent + self.indent_increment, false),
                        comma
                    ));
                }
                lines.push(self.end("]", indent));
            }
            other => return one_line(other),
        }

        let text = lines.join("\n");
        if text.contains('\n') && text.chars().count() < self.one_line_max_width {
            one_line(data)
        } else {
            text
        }
    }
}
