use crate::error::Result;
use crate::frame::{DataFrame, Value};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, WriterBuilder};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Load a CSV file with a header row into a table.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let f = File::open(path.as_ref())?;
    let df = read_csv(f)?;
    log::debug!(
        "loaded {} rows x {} columns from {}",
        df.len(),
        df.column_names().len(),
        path.as_ref().display()
    );
    Ok(df)
}

/// Read CSV with a header row. A column whose non-empty cells all parse as numbers
/// becomes numeric; one whose cells all parse as dates/times becomes temporal;
/// anything else stays text. Empty cells are missing.
pub fn read_csv<R: Read>(reader: R) -> Result<DataFrame> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record?;
        for (i, col) in cells.iter_mut().enumerate() {
            col.push(record.get(i).unwrap_or("").to_string());
        }
    }
    let mut df = DataFrame::new();
    for (name, raw) in headers.into_iter().zip(cells) {
        df.push_column(name, infer_column(&raw))?;
    }
    Ok(df)
}

fn parse_time(s: &str) -> Option<NaiveDateTime> {
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn infer_column(raw: &[String]) -> Vec<Value> {
    let present = || raw.iter().filter(|s| !s.is_empty());
    let convert = |f: &dyn Fn(&str) -> Option<Value>| -> Option<Vec<Value>> {
        raw.iter()
            .map(|s| if s.is_empty() { Some(Value::Missing) } else { f(s) })
            .collect()
    };
    if present().next().is_some() {
        if let Some(v) = convert(&|s| s.parse::<f64>().ok().map(Value::Number)) {
            return v;
        }
        if let Some(v) = convert(&|s| parse_time(s).map(Value::Time)) {
            return v;
        }
    }
    raw.iter()
        .map(|s| {
            if s.is_empty() {
                Value::Missing
            } else {
                Value::Text(s.clone())
            }
        })
        .collect()
}

/// Save a table as CSV with a header row; the index is written as the first column.
pub fn save_csv<P: AsRef<Path>>(data: &DataFrame, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let names = data.column_names();
    let mut header = vec!["index"];
    header.extend(names.iter().copied());
    wtr.write_record(&header)?;
    let columns = names
        .iter()
        .map(|n| data.column(n))
        .collect::<Result<Vec<_>>>()?;
    for row in 0..data.len() {
        let mut record = vec![data.index()[row].to_string()];
        record.extend(columns.iter().map(|c| c[row].to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

struct JsonRow<'a> {
    names: &'a [&'a str],
    index: &'a Value,
    values: Vec<&'a Value>,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.names.len() + 1))?;
        map.serialize_entry("index", self.index)?;
        for (name, value) in self.names.iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Save a table as a pretty JSON array of row objects (column order preserved).
pub fn save_json<P: AsRef<Path>>(data: &DataFrame, path: P) -> Result<()> {
    let names = data.column_names();
    let columns = names
        .iter()
        .map(|n| data.column(n))
        .collect::<Result<Vec<_>>>()?;
    let rows: Vec<JsonRow> = (0..data.len())
        .map(|row| JsonRow {
            names: &names,
            index: &data.index()[row],
            values: columns.iter().map(|c| &c[row]).collect(),
        })
        .collect();
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
