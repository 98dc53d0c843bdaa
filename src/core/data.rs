//! Column-wise table with kinds fixed at load time.
//!
//! Every column is probed exactly once when the table is assembled:
//! * all non-null cells are numbers         -> [`Kind::Numeric`]
//! * all non-null cells parse as timestamps -> [`Kind::Temporal`]
//! * anything else                          -> [`Kind::Text`]

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde_json::{Map, Number, Value};

use crate::core::error::GraphError;

/// Accepted naive layouts, tried in order after RFC 3339.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// One chart vertex; `err` is the half-height of its error bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub err: Option<f64>,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, err: None }
    }

    #[inline]
    pub fn with_err(x: f64, y: f64, err: f64) -> Self {
        Self { x, y, err: Some(err) }
    }

    /// Both coordinates are drawable.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Vertical extent including the error bar, when it is defined.
    #[inline]
    pub fn y_extent(&self) -> (f64, f64) {
        match self.err {
            Some(e) if e.is_finite() => (self.y - e.abs(), self.y + e.abs()),
            _ => (self.y, self.y),
        }
    }
}

/// One parsed cell, before its column has been typed.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    /// Written as an integer literal; kept exact.
    Integer(i128),
    Text(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Numeric,
    Temporal,
    Text,
}

#[derive(Clone, Debug)]
pub enum ColumnData {
    /// `NaN` marks a null cell. `integers` holds the exact values when every
    /// cell was an integer literal.
    Numeric {
        values: Vec<f64>,
        integers: Option<Vec<Option<i128>>>,
    },
    /// Seconds since the Unix epoch (UTC), plus the text they were parsed from.
    Temporal {
        secs: Vec<f64>,
        raw: Vec<Option<String>>,
    },
    Text(Vec<Option<String>>),
}

#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Type a column from its cells.
    pub fn from_cells(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let name = name.into();
        let data = if cells.iter().all(|c| !matches!(c, Cell::Text(_))) {
            let values = cells.iter().map(Cell::as_f64).collect();
            let integers = cells
                .iter()
                .map(|c| match c {
                    Cell::Integer(i) => Ok(Some(*i)),
                    Cell::Null => Ok(None),
                    _ => Err(()),
                })
                .collect::<Result<Vec<_>, ()>>()
                .ok();
            ColumnData::Numeric { values, integers }
        } else if let Some(secs) = probe_temporal(&cells) {
            let raw = cells
                .into_iter()
                .map(|c| match c {
                    Cell::Text(s) => Some(s),
                    _ => None,
                })
                .collect();
            ColumnData::Temporal { secs, raw }
        } else {
            ColumnData::Text(cells.into_iter().map(Cell::into_text).collect())
        };
        Self { name, data }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        match self.data {
            ColumnData::Numeric { .. } => Kind::Numeric,
            ColumnData::Temporal { .. } => Kind::Temporal,
            ColumnData::Text(_) => Kind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric { values, .. } => values.len(),
            ColumnData::Temporal { secs, .. } => secs.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values usable as chart coordinates: numbers as-is, timestamps as epoch
    /// seconds. `NaN` marks nulls.
    pub fn axis_values(&self) -> Result<&[f64], GraphError> {
        match &self.data {
            ColumnData::Numeric { values, .. } => Ok(values),
            ColumnData::Temporal { secs, .. } => Ok(secs),
            ColumnData::Text(_) => Err(GraphError::NonNumeric(self.name.clone())),
        }
    }

    /// Strictly numeric values, for y-columns.
    pub fn numeric_values(&self) -> Result<&[f64], GraphError> {
        match &self.data {
            ColumnData::Numeric { values, .. } => Ok(values),
            _ => Err(GraphError::NonNumeric(self.name.clone())),
        }
    }

    fn json_at(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::Numeric {
                integers: Some(ints),
                values,
            } => match ints[row] {
                None => Value::Null,
                Some(i) => i64::try_from(i)
                    .map(Value::from)
                    .or_else(|_| u64::try_from(i).map(Value::from))
                    .unwrap_or_else(|_| float_json(values[row])),
            },
            ColumnData::Numeric { values, .. } => float_json(values[row]),
            ColumnData::Temporal { raw, .. } => raw[row].clone().map_or(Value::Null, Value::String),
            ColumnData::Text(v) => v[row].clone().map_or(Value::Null, Value::String),
        }
    }
}

fn float_json(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

impl Cell {
    /// Coordinate value; `NaN` for anything that is not a number.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Number(v) => *v,
            Cell::Integer(i) => *i as f64,
            _ => f64::NAN,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Number(v) => Some(v.to_string()),
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Text(s) => Some(s),
        }
    }
}

fn probe_temporal(cells: &[Cell]) -> Option<Vec<f64>> {
    let mut seen = false;
    let mut secs = Vec::with_capacity(cells.len());
    for c in cells {
        match c {
            Cell::Null => secs.push(f64::NAN),
            Cell::Text(s) => {
                secs.push(parse_timestamp(s)?);
                seen = true;
            }
            Cell::Number(_) | Cell::Integer(_) => return None,
        }
    }
    seen.then_some(secs)
}

/// Parse a timestamp into epoch seconds (UTC).
///
/// Offsets are honoured for RFC 3339 input; naive forms are taken as UTC.
#[allow(clippy::cast_precision_loss)]
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_micros() as f64 / 1e6);
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(naive.and_utc().timestamp_micros() as f64 / 1e6)
}

/// Render epoch seconds for axis ticks.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_timestamp(secs: f64) -> String {
    if !secs.is_finite() {
        return String::new();
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    match DateTime::from_timestamp(whole as i64, nanos) {
        Some(dt) if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 => {
            dt.format("%Y-%m-%d").to_string()
        }
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// Ordered set of equally long, typed columns.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Assemble a table; every column must have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, GraphError> {
        let rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(GraphError::RaggedColumn {
                name: bad.name.clone(),
                got: bad.len(),
                want: rows,
            });
        }
        Ok(Self { columns, rows })
    }

    /// Build from records that may disagree on keys.
    ///
    /// Columns appear in first-seen order; a key absent from a record is null.
    pub fn from_records(records: Vec<Vec<(String, Cell)>>) -> Result<Self, GraphError> {
        let mut names: Vec<String> = Vec::new();
        for rec in &records {
            for (k, _) in rec {
                if !names.contains(k) {
                    names.push(k.clone());
                }
            }
        }
        let mut cells: Vec<Vec<Cell>> = vec![Vec::with_capacity(records.len()); names.len()];
        for rec in records {
            let mut row = vec![Cell::Null; names.len()];
            for (k, v) in rec {
                if let Some(i) = names.iter().position(|n| *n == k) {
                    row[i] = v;
                }
            }
            for (col, v) in cells.iter_mut().zip(row) {
                col.push(v);
            }
        }
        Self::new(
            names
                .into_iter()
                .zip(cells)
                .map(|(n, c)| Column::from_cells(n, c))
                .collect(),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look a column up, reporting it as missing otherwise.
    pub fn require(&self, name: &str) -> Result<&Column, GraphError> {
        self.column(name)
            .ok_or_else(|| GraphError::missing_columns(&[name], self.names()))
    }

    /// Fail with every absent name at once.
    pub fn require_all<S: AsRef<str>>(&self, names: &[S]) -> Result<(), GraphError> {
        let missing: Vec<&str> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|n| self.column(n).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GraphError::missing_columns(&missing, self.names()))
        }
    }

    /// Re-serialise as one JSON object per row.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        (0..self.rows)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.json_at(row)))
                    .collect()
            })
            .collect()
    }
}
