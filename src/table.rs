//! HTML rendering of a data frame, with headers taken from the label table.

use crate::error::{PlotError, Result};
use crate::frame::{DataFrame, Value};
use crate::labels::LabelTable;
use crate::session::Session;
use std::fmt::Write as _;

/// Rendered in place of a table when the frame has no rows.
pub const NO_ENTRIES: &str = "<p>No Entries</p>";

#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Columns to show, in order; `None` shows all.
    pub columns: Option<Vec<String>>,
    /// Explicit headers, one per shown column; `None` resolves them via the label table.
    pub headers: Option<Vec<String>>,
    pub with_index: bool,
    /// Header of the index column (default `index`).
    pub index_label: Option<String>,
    /// Maximum number of rows.
    pub limit: Option<usize>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            columns: None,
            headers: None,
            with_index: true,
            index_label: None,
            limit: None,
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn cell(out: &mut String, v: &Value) {
    let text = escape(&v.to_string());
    // numbers are right-aligned
    let _ = match v {
        Value::Number(_) => write!(out, "<td style=\"text-align: right;\">{text}</td>"),
        _ => write!(out, "<td>{text}</td>"),
    };
}

/// Render `data` as an HTML table.
pub fn html_table(data: &DataFrame, opts: &TableOptions, labels: &LabelTable) -> Result<String> {
    if data.is_empty() {
        return Ok(NO_ENTRIES.to_string());
    }
    let columns: Vec<&str> = match &opts.columns {
        Some(c) => c.iter().map(String::as_str).collect(),
        None => data.column_names(),
    };
    let values = columns
        .iter()
        .map(|c| data.column(c))
        .collect::<Result<Vec<_>>>()?;
    let mut headers: Vec<String> = match &opts.headers {
        Some(h) if h.len() != columns.len() => {
            return Err(PlotError::invalid(format!(
                "{} headers given for {} columns",
                h.len(),
                columns.len()
            )));
        }
        Some(h) => h.clone(),
        None => columns.iter().map(|c| labels.resolve(None, c)).collect(),
    };
    if opts.with_index {
        headers.insert(0, opts.index_label.clone().unwrap_or_else(|| "index".to_string()));
    }

    let mut out = String::from("<table>\n<thead>\n<tr>");
    for h in &headers {
        let _ = write!(out, "<th>{}</th>", escape(h));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    let rows = opts.limit.unwrap_or(data.len()).min(data.len());
    for row in 0..rows {
        out.push_str("<tr>");
        if opts.with_index {
            cell(&mut out, &data.index()[row]);
        }
        for col in &values {
            cell(&mut out, &col[row]);
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>");
    Ok(out)
}

impl Session {
    /// [`html_table`] with this session's labels.
    pub fn table(&self, data: &DataFrame, opts: &TableOptions) -> Result<String> {
        html_table(data, opts, self.labels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::builder()
            .column("name", ["a<b", "c"])
            .column("n", [1.5, 2.0])
            .build()
            .unwrap()
    }

    #[test]
    fn headers_use_labels_and_index() {
        let mut labels = LabelTable::new();
        labels.set_labels([("n", "Count")]);
        let html = html_table(&sample(), &TableOptions::default(), &labels).unwrap();
        assert!(html.starts_with("<table>\n<thead>\n<tr><th>index</th><th>name</th><th>Count</th></tr>"));
        assert!(html.contains("<td>a&lt;b</td>"));
        assert!(html.contains("<td style=\"text-align: right;\">1.5</td>"));
    }

    #[test]
    fn limit_and_column_selection() {
        let opts = TableOptions {
            columns: Some(vec!["n".into()]),
            with_index: false,
            limit: Some(1),
            ..Default::default()
        };
        let html = html_table(&sample(), &opts, &LabelTable::new()).unwrap();
        assert_eq!(html.matches("<tr>").count(), 2);
        assert!(!html.contains("index"));
        let opts = TableOptions {
            headers: Some(vec![]),
            ..Default::default()
        };
        assert!(html_table(&sample(), &opts, &LabelTable::new()).is_err());
    }

    #[test]
    fn empty_frame_has_no_entries() {
        let html = html_table(&DataFrame::new(), &TableOptions::default(), &LabelTable::new()).unwrap();
        assert_eq!(html, NO_ENTRIES);
    }
}
