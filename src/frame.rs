//! Tabular input: named columns of loosely typed values plus a row index.
//!
//! Every renderer follows the same null-handling policy: select the columns it
//! references, then drop each row that has a missing value in any of them
//! (`DataFrame::drop_missing`).

use crate::error::{PlotError, Result};
use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// One cell of a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Time(NaiveDateTime),
    Missing,
}

impl Value {
    /// `Missing` and NaN numbers both count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view: numbers as-is, times as seconds since the Unix epoch.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if !v.is_nan() => Some(*v),
            Value::Time(t) => Some(t.and_utc().timestamp() as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Grouping key; `None` for missing values.
    pub fn key(&self) -> Option<Key> {
        match self {
            Value::Number(v) if !v.is_nan() => Some(Key::Number(OrderedFloat(*v))),
            Value::Text(s) => Some(Key::Text(s.clone())),
            Value::Time(t) => Some(Key::Time(*t)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", format_number(*v)),
            Value::Text(s) => f.write_str(s),
            Value::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Missing => Ok(()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Number(v) if v.is_finite() => serializer.serialize_f64(*v),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Time(t) => serializer.serialize_str(&t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            _ => serializer.serialize_none(),
        }
    }
}

fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Time(v)
    }
}

impl From<Key> for Value {
    fn from(k: Key) -> Self {
        match k {
            Key::Number(v) => Value::Number(v.0),
            Key::Time(t) => Value::Time(t),
            Key::Text(s) => Value::Text(s),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// Ordered grouping key (numbers before times before text).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Number(OrderedFloat<f64>),
    Time(NaiveDateTime),
    Text(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Number(v) => f.write_str(&format_number(v.0)),
            Key::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Key::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<Value>,
}

/// Named columns with a shared row index (`0..n` unless set explicitly).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<Column>,
    index: Vec<Value>,
}

impl DataFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DataFrameBuilder {
        DataFrameBuilder::default()
    }

    /// Load a CSV file with a header row; see `storage::load_csv`.
    pub fn from_csv_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        crate::storage::load_csv(path)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        crate::storage::read_csv(reader)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| PlotError::ColumnNotFound(name.to_string()))
    }

    pub fn index(&self) -> &[Value] {
        &self.index
    }

    /// Append a column; the first column fixes the row count and the default index.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(PlotError::invalid(format!("duplicate column: {name}")));
        }
        if self.columns.is_empty() && self.index.is_empty() {
            self.index = (0..values.len()).map(|i| Value::Number(i as f64)).collect();
        } else if values.len() != self.len() {
            return Err(PlotError::invalid(format!(
                "column {name} has {} rows, expected {}",
                values.len(),
                self.len()
            )));
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    pub fn set_index(&mut self, index: Vec<Value>) -> Result<()> {
        if !self.columns.is_empty() && index.len() != self.len() {
            return Err(PlotError::invalid(format!(
                "index has {} rows, expected {}",
                index.len(),
                self.len()
            )));
        }
        self.index = index;
        Ok(())
    }

    /// Fail with `ColumnNotFound` for the first absent column.
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        for c in columns {
            self.column(c)?;
        }
        Ok(())
    }

    /// Names of all columns whose non-missing values are all numbers.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| {
                c.values
                    .iter()
                    .all(|v| v.is_missing() || matches!(v, Value::Number(_)))
            })
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Keep only the rows whose mask entry is `true`; all columns survive.
    pub fn filter(&self, mask: &[bool]) -> DataFrame {
        let pick = |values: &[Value]| -> Vec<Value> {
            values
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(v, _)| v.clone())
                .collect()
        };
        DataFrame {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: pick(&c.values),
                })
                .collect(),
            index: pick(&self.index),
        }
    }

    /// Reorder (or subset) rows by position.
    pub fn take(&self, rows: &[usize]) -> DataFrame {
        DataFrame {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: rows.iter().map(|&r| c.values[r].clone()).collect(),
                })
                .collect(),
            index: rows.iter().map(|&r| self.index[r].clone()).collect(),
        }
    }

    /// Drop every row with a missing value in at least one of `columns`.
    pub fn drop_missing(&self, columns: &[&str]) -> Result<DataFrame> {
        let selected = columns
            .iter()
            .map(|c| self.column(c))
            .collect::<Result<Vec<_>>>()?;
        let mask: Vec<bool> = (0..self.len())
            .map(|row| selected.iter().all(|col| !col[row].is_missing()))
            .collect();
        Ok(self.filter(&mask))
    }

    /// All values of a column as numbers; fails on text or missing cells.
    pub fn numbers(&self, column: &str) -> Result<Vec<f64>> {
        self.column(column)?
            .iter()
            .map(|v| {
                v.as_f64().ok_or_else(|| {
                    PlotError::invalid(format!("column {column} holds a non-numeric value: {v:?}"))
                })
            })
            .collect()
    }

    pub fn index_numbers(&self) -> Result<Vec<f64>> {
        self.index
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| PlotError::invalid(format!("index holds a non-numeric value: {v:?}")))
            })
            .collect()
    }

    /// Display strings of a column, or of the index when `column` is `None`.
    pub fn labels(&self, column: Option<&str>) -> Result<Vec<String>> {
        let values = match column {
            Some(c) => self.column(c)?,
            None => self.index(),
        };
        Ok(values.iter().map(|v| v.to_string()).collect())
    }

    /// Split rows by the distinct values of `column`, ordered by key.
    /// Rows with a missing key are left out.
    pub fn group_by(&self, column: &str) -> Result<Vec<(Key, DataFrame)>> {
        let values = self.column(column)?;
        let mut rows: BTreeMap<Key, Vec<usize>> = BTreeMap::new();
        for (i, v) in values.iter().enumerate() {
            if let Some(k) = v.key() {
                rows.entry(k).or_default().push(i);
            }
        }
        Ok(rows.into_iter().map(|(k, r)| (k, self.take(&r))).collect())
    }

    /// Row counts per distinct value of `column`, in order of first appearance.
    pub fn value_counts(&self, column: &str) -> Result<Vec<(Key, usize)>> {
        let mut out: Vec<(Key, usize)> = Vec::new();
        for v in self.column(column)? {
            let Some(k) = v.key() else { continue };
            match out.iter_mut().find(|(seen, _)| *seen == k) {
                Some((_, n)) => *n += 1,
                None => out.push((k, 1)),
            }
        }
        Ok(out)
    }

    pub fn is_temporal(&self, column: &str) -> Result<bool> {
        let values = self.column(column)?;
        Ok(values.iter().any(|v| matches!(v, Value::Time(_)))
            && values
                .iter()
                .all(|v| v.is_missing() || matches!(v, Value::Time(_))))
    }
}

/// Collects columns and reports the first error at `build()`.
#[derive(Debug, Default)]
pub struct DataFrameBuilder {
    frame: DataFrame,
    index: Option<Vec<Value>>,
    error: Option<PlotError>,
}

impl DataFrameBuilder {
    pub fn column<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        if self.error.is_none() {
            let values = values.into_iter().map(Into::into).collect();
            if let Err(e) = self.frame.push_column(name, values) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn index<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.index = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<DataFrame> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let mut frame = self.frame;
        if let Some(index) = self.index {
            frame.set_index(index)?;
        }
        Ok(frame)
    }
}

/// A single named column with its own index.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    index: Vec<Value>,
    values: Vec<Value>,
}

impl Series {
    pub fn new<I, V>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let index = (0..values.len()).map(|i| Value::Number(i as f64)).collect();
        Self {
            name: name.to_string(),
            index,
            values,
        }
    }

    pub fn with_index<I, V>(mut self, index: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let index: Vec<Value> = index.into_iter().map(Into::into).collect();
        if index.len() != self.values.len() {
            return Err(PlotError::invalid(format!(
                "index has {} rows, series {} has {}",
                index.len(),
                self.name,
                self.values.len()
            )));
        }
        self.index = index;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn to_frame(&self) -> DataFrame {
        DataFrame {
            columns: vec![Column {
                name: self.name.clone(),
                values: self.values.clone(),
            }],
            index: self.index.clone(),
        }
    }
}

/// Input of renderers that accept either one column of a table or a single series.
#[derive(Debug, Clone, Copy)]
pub enum ChartData<'a> {
    Column { frame: &'a DataFrame, column: &'a str },
    Series(&'a Series),
}

impl<'a> ChartData<'a> {
    /// The backing table and the name of the value column.
    pub fn resolve(self) -> (Cow<'a, DataFrame>, &'a str) {
        match self {
            ChartData::Column { frame, column } => (Cow::Borrowed(frame), column),
            ChartData::Series(series) => (Cow::Owned(series.to_frame()), series.name()),
        }
    }
}

impl<'a> From<(&'a DataFrame, &'a str)> for ChartData<'a> {
    fn from((frame, column): (&'a DataFrame, &'a str)) -> Self {
        ChartData::Column { frame, column }
    }
}

impl<'a> From<&'a Series> for ChartData<'a> {
    fn from(series: &'a Series) -> Self {
        ChartData::Series(series)
    }
}
