//! Column typing for the CSV sample rows callers send along.
use serde_json::{Map, Number, Value};
use std::fmt;

use crate::error::{AppError, AppResult};

/// Share of non-empty cells that must parse as numbers for a numeric column.
const NUMERIC_RATIO: f64 = 0.6;
const TEMPORAL_HINTS: &[&str] = &["date", "time", "year", "month"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Temporal,
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnKind::Temporal => "temporal",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// First record is the header; ragged rows are padded or cut to its width.
    pub fn parse(text: &str) -> AppResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut records = Vec::new();
        for record in reader.records() {
            records.push(record?.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let mut records = records.into_iter();
        let headers = records.next().unwrap_or_default();
        let width = headers.len();
        let rows = records
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Ok(Table { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |r| r[idx].as_str())
    }

    pub fn kind_of(&self, idx: usize) -> ColumnKind {
        let name = self.headers[idx].to_ascii_lowercase();
        if TEMPORAL_HINTS.iter().any(|h| name.contains(h)) {
            return ColumnKind::Temporal;
        }
        let filled: Vec<&str> = self.column(idx).filter(|c| !c.trim().is_empty()).collect();
        if filled.is_empty() {
            return ColumnKind::Categorical;
        }
        let numeric = filled.iter().filter(|c| c.trim().parse::<f64>().is_ok()).count();
        if numeric as f64 / filled.len() as f64 >= NUMERIC_RATIO {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    pub fn kinds(&self) -> Vec<ColumnKind> {
        (0..self.headers.len()).map(|i| self.kind_of(i)).collect()
    }

    /// First column name of the given kind.
    pub fn first_of(&self, kind: ColumnKind) -> Option<&str> {
        self.kinds()
            .into_iter()
            .position(|k| k == kind)
            .map(|i| self.headers[i].as_str())
    }

    /// Rows as JSON objects keyed by header, numeric columns as numbers.
    pub fn records(&self) -> Vec<Value> {
        let kinds = self.kinds();
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (i, cell) in row.iter().enumerate() {
                    obj.insert(self.headers[i].clone(), cell_value(cell, kinds[i]));
                }
                Value::Object(obj)
            })
            .collect()
    }

    /// One line per column: `name (kind) - Missing: x.x% - Samples: a, b, c`.
    pub fn describe(&self) -> String {
        let kinds = self.kinds();
        self.headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let total = self.rows.len();
                let missing = self.column(i).filter(|c| c.trim().is_empty()).count();
                let pct = if total == 0 { 0.0 } else { missing as f64 * 100.0 / total as f64 };
                let mut samples: Vec<&str> = Vec::new();
                for cell in self.column(i).filter(|c| !c.trim().is_empty()) {
                    if !samples.contains(&cell) {
                        samples.push(cell);
                    }
                    if samples.len() == 3 {
                        break;
                    }
                }
                format!("{} ({}) - Missing: {:.1}% - Samples: {}", name, kinds[i], pct, samples.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Header plus the first `n` rows, re-encoded as CSV.
    pub fn head_csv(&self, n: usize) -> AppResult<String> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in self.rows.iter().take(n) {
            writer.write_record(row)?;
        }
        let bytes = writer.into_inner().map_err(|e| AppError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn cell_value(cell: &str, kind: ColumnKind) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if kind == ColumnKind::Numeric {
        if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = "Date,Location,DataValue\n2024-01-01,Ohio,3.5\n2024-01-02,\"Texas, US\",4\n2024-01-03,,\n";

    #[test]
    fn parses_quoted_fields_and_blank_lines() {
        let t = Table::parse("a,b\r\n\"x, \"\"y\"\"\",2\r\n\r\n").unwrap();
        assert_eq!(t.headers, vec!["a", "b"]);
        assert_eq!(t.rows, vec![vec!["x, \"y\"".to_string(), "2".to_string()]]);
    }

    #[test]
    fn short_rows_are_padded() {
        let t = Table::parse("a,b,c\n1").unwrap();
        assert_eq!(t.rows[0], vec!["1", "", ""]);
    }

    #[test]
    fn long_rows_are_cut_and_inner_blank_lines_skipped() {
        let t = Table::parse("a,b\n1,2,3\n\n\"multi\nline\",4\n").unwrap();
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0], vec!["1", "2"]);
        assert_eq!(t.rows[1], vec!["multi\nline", "4"]);
    }

    #[test]
    fn classifies_columns() {
        let t = Table::parse(SAMPLE).unwrap();
        assert_eq!(
            t.kinds(),
            vec![ColumnKind::Temporal, ColumnKind::Categorical, ColumnKind::Numeric]
        );
        assert_eq!(t.first_of(ColumnKind::Numeric), Some("DataValue"));
    }

    #[test]
    fn records_use_numbers_and_nulls() {
        let t = Table::parse(SAMPLE).unwrap();
        let recs = t.records();
        assert_eq!(recs[0], json!({"Date": "2024-01-01", "Location": "Ohio", "DataValue": 3.5}));
        assert_eq!(recs[2]["Location"], Value::Null);
    }

    #[test]
    fn describe_reports_missing_and_samples() {
        let t = Table::parse(SAMPLE).unwrap();
        let desc = t.describe();
        let lines: Vec<&str> = desc.lines().collect();
        assert_eq!(lines[1], "Location (categorical) - Missing: 33.3% - Samples: Ohio, Texas, US");
        assert_eq!(lines[2], "DataValue (numeric) - Missing: 33.3% - Samples: 3.5, 4");
    }

    #[test]
    fn head_csv_requotes() {
        let t = Table::parse(SAMPLE).unwrap();
        assert_eq!(t.head_csv(2).unwrap(), "Date,Location,DataValue\n2024-01-01,Ohio,3.5\n2024-01-02,\"Texas, US\",4\n");
    }
}
