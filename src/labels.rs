//! Column labels used for axis titles, legends, and table headers.
//!
//! Precedence: an explicit caller label (even `""`) wins, then a registered
//! label for the column, then the column id itself.

use crate::error::{PlotError, Result};
use ahash::AHashMap;
use ini::Ini;
use std::path::Path;

/// Name of the INI section holding `column = label` pairs.
pub const COLUMNS_SECTION: &str = "Columns";

#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: AHashMap<String, String>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `mapping` into the table; last write wins per key.
    pub fn set_labels<I, K, V>(&mut self, mapping: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in mapping {
            self.labels.insert(k.into(), v.into());
        }
    }

    /// Load the `[Columns]` section of a UTF-8 INI file. Returns the number of labels read.
    pub fn load_from_config<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PlotError::ConfigNotFound(path.to_path_buf()));
        }
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                PlotError::ConfigNotFound(path.to_path_buf())
            }
            other => PlotError::ConfigParse {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;
        let section = ini
            .section(Some(COLUMNS_SECTION))
            .ok_or_else(|| PlotError::ConfigParse {
                path: path.to_path_buf(),
                reason: format!("missing [{COLUMNS_SECTION}] section"),
            })?;
        let mut n = 0;
        for (k, v) in section.iter() {
            self.labels.insert(k.to_string(), v.to_string());
            n += 1;
        }
        log::debug!("loaded {n} column labels from {}", path.display());
        Ok(n)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.labels.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn resolve(&self, explicit: Option<&str>, column: &str) -> String {
        match explicit {
            Some(label) => label.to_string(),
            None => self.get(column).unwrap_or(column).to_string(),
        }
    }

    /// Like `resolve`, for axes whose column is optional (e.g. the index); no column and no
    /// explicit label yields no label at all.
    pub fn resolve_opt(&self, explicit: Option<&str>, column: Option<&str>) -> Option<String> {
        match (explicit, column) {
            (Some(label), _) => Some(label.to_string()),
            (None, Some(c)) => Some(self.resolve(None, c)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn precedence_explicit_then_registered_then_id() {
        let mut t = LabelTable::new();
        assert_eq!(t.resolve(None, "x"), "x");
        t.set_labels([("x", "X-Value")]);
        assert_eq!(t.resolve(None, "x"), "X-Value");
        assert_eq!(t.resolve(Some("Custom"), "x"), "Custom");
        assert_eq!(t.resolve(Some(""), "x"), "");
    }

    #[test]
    fn last_write_wins() {
        let mut t = LabelTable::new();
        t.set_labels([("x", "one")]);
        t.set_labels([("x", "two"), ("y", "Y")]);
        assert_eq!(t.get("x"), Some("two"));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn loads_columns_section() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "[Other]\nx = ignored\n\n[Columns]\nx = Breite\ncount = Anzahl").unwrap();
        let mut t = LabelTable::new();
        assert_eq!(t.load_from_config(f.path()).unwrap(), 2);
        assert_eq!(t.resolve(None, "x"), "Breite");
        assert_eq!(t.resolve(None, "count"), "Anzahl");
    }

    #[test]
    fn optional_column_without_label_is_none() {
        let t = LabelTable::new();
        assert_eq!(t.resolve_opt(None, None), None);
        assert_eq!(t.resolve_opt(Some("t"), None).as_deref(), Some("t"));
    }
}
