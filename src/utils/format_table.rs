use std::collections::BTreeMap;
use std::fmt;

/// 表格中的一格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Centered(String),
    RightAligned(String),
}

impl Cell {
    pub fn width(&self) -> usize {
        match self {
            Cell::Float(value) if !value.is_nan() => (value.trunc() as i64).to_string().len() + 17,
            other => other.to_string().chars().count(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(value) => write!(f, "{}", value),
            Cell::Float(value) => write!(f, "{}", value),
            Cell::Text(text) | Cell::Centered(text) | Cell::RightAligned(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

pub trait Formatter {
    fn fmt(&self, _row_no: usize, _field_no: usize, field: &Cell, width: usize) -> String {
        match field {
            Cell::Int(value) => format!("{:>width$}", value, width = width),
            Cell::Float(value) => format!("{:>width$.16}", value, width = width),
            Cell::Text(text) => format!("{:<width$}", text, width = width),
            Cell::Centered(text) => format!("{:^width$}", text, width = width),
            Cell::RightAligned(text) => format!("{:>width$}", text, width = width),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFormatter;

impl Formatter for DefaultFormatter {}

pub fn format_table(table: &[Vec<Cell>], field_sep: &str, formatter: Option<&dyn Formatter>) -> String {
    if table.is_empty() {
        return String::new();
    }
    let formatter = formatter.unwrap_or(&DefaultFormatter);

    let columns = table.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in table {
        for (col_no, cell) in row.iter().enumerate() {
            widths[col_no] = widths[col_no].max(cell.width());
        }
    }

    table
        .iter()
        .enumerate()
        .map(|(row_no, row)| {
            row.iter()
                .enumerate()
                .map(|(field_no, cell)| formatter.fmt(row_no, field_no, cell, widths[field_no]))
                .collect::<Vec<_>>()
                .join(field_sep)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 以欄位名稱為表頭輸出紀錄，`field_order` 之外的欄位依字母順序排在後面
pub fn format_records(
    records: &[BTreeMap<String, Cell>],
    field_order: &[&str],
    field_sep: &str,
    formatter: Option<&dyn Formatter>,
) -> String {
    if records.is_empty() {
        return String::new();
    }
    let mut fields: Vec<String> = field_order.iter().map(|field| field.to_string()).collect();
    for record in records {
        for key in record.keys() {
            if !fields.contains(key) {
                fields.push(key.clone());
            }
        }
    }

    let mut table = vec![fields.iter().map(|field| Cell::Centered(field.clone())).collect::<Vec<_>>()];
    for record in records {
        table.push(
            fields
                .iter()
                .map(|field| record.get(field).cloned().unwrap_or_else(|| Cell::Text(String::new())))
                .collect(),
        );
    }
    format_table(&table, field_sep, formatter)
}
