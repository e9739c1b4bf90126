//! # Tabular Results
//!
//! Upstream time series and multi-row data (price bars, dividends, holders,
//! option legs, ...) all arrive as a `Table`: an optional index name, ordered
//! column names, and ordered rows, each row carrying an index label plus one
//! JSON value per column.
//!
//! Two shapes leave this module:
//! - `to_records`: `[{column: value, ...}, ...]`, one object per row.
//! - `to_column_map`: `{column: {row_label: value}}`.
//!
//! `reset_index` turns the index into a leading column so that date-indexed
//! series keep their dates when flattened into records.

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Value};

/// Column name given to a positional index by `reset_index`.
pub const DEFAULT_INDEX_NAME: &str = "index";

/// One row of a `Table`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Index label (a date, a line-item name, or a position).
    pub label: Value,
    /// Cell values, aligned with the table's columns.
    pub values: Vec<Value>,
}

/// A row/column result returned by an upstream accessor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    index_name: Option<String>,
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Creates an empty table with the given index name and columns.
    pub fn new<I, S>(index_name: Option<&str>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index_name: index_name.map(str::to_string),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a labelled row. Missing trailing cells are filled with `null`,
    /// surplus cells are dropped.
    pub fn push_row(&mut self, label: Value, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Null);
        self.rows.push(TableRow { label, values });
    }

    /// Appends a row labelled with its position.
    pub fn push_positional(&mut self, values: Vec<Value>) {
        let label = Value::from(self.rows.len());
        self.push_row(label, values);
    }

    /// Sorts rows by label. Labels of different JSON types compare by their
    /// string rendering.
    pub fn sort_by_label(&mut self, descending: bool) {
        self.rows.sort_by(|a, b| {
            let ord = compare_labels(&a.label, &b.label);
            if descending { ord.reverse() } else { ord }
        });
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Moves the index into a leading column and relabels rows by position.
    pub fn reset_index(self) -> Table {
        let index_column = self
            .index_name
            .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());

        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(index_column);
        columns.extend(self.columns);

        let rows = self
            .rows
            .into_iter()
            .enumerate()
            .map(|(position, row)| {
                let mut values = Vec::with_capacity(row.values.len() + 1);
                values.push(row.label);
                values.extend(row.values);
                TableRow {
                    label: Value::from(position),
                    values,
                }
            })
            .collect();

        Table {
            index_name: None,
            columns,
            rows,
        }
    }

    /// Flattens the table into one JSON object per row, keyed by column name
    /// in column order. The index is not included; call `reset_index` first
    /// to keep it.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.values.iter().cloned())
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }

    /// Converts the table into `{column: {row_label: value}}`.
    pub fn to_column_map(&self) -> Map<String, Value> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let cells = self
                    .rows
                    .iter()
                    .map(|row| (label_key(&row.label), row.values[i].clone()))
                    .collect::<Map<String, Value>>();
                (column.clone(), Value::Object(cells))
            })
            .collect()
    }
}

/// Renders an index label as a JSON object key.
pub fn label_key(label: &Value) -> String {
    match label {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Converts epoch seconds into an RFC 3339 UTC string value, or `null` when
/// the timestamp is out of range.
pub fn timestamp_value(epoch_secs: i64) -> Value {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true)))
        .unwrap_or(Value::Null)
}

/// Same as `timestamp_value` for a JSON number cell; anything else is `null`.
pub fn timestamp_cell(cell: Option<&Value>) -> Value {
    cell.and_then(Value::as_i64)
        .map(timestamp_value)
        .unwrap_or(Value::Null)
}

fn compare_labels(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => label_key(a).cmp(&label_key(b)),
    }
}
