//! Tick placement and locale-aware tick labels.

use super::{AxisScale, Tick, TickFormat};
use chrono::DateTime;
use num_format::{Locale, ToFormattedString};

const DAY: f64 = 86_400.0;

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'),
    }
}

/// A "nice" step (1, 2, 2.5, 5 × 10^k) giving at most about `max_ticks` intervals.
pub fn nice_step(lo: f64, hi: f64, max_ticks: usize) -> f64 {
    let raw = (hi - lo).abs() / max_ticks.max(1) as f64;
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 2.5 {
        2.5
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

/// Multiples of `step` inside `[lo, hi]`.
pub fn ticks_in(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let eps = step * 1e-9;
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        .filter(|v| *v >= lo - eps && *v <= hi + eps)
        .map(|v| if v == 0.0 { 0.0 } else { v })
        .collect()
}

/// Format with `decimals` fraction digits, thousands grouping, and the locale's separator.
pub fn format_number(v: f64, decimals: usize, locale: &str) -> String {
    let (loc, dec) = map_locale(locale);
    let text = format!("{:.*}", decimals, v.abs());
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let int_val: u64 = int.parse().unwrap_or(0);
    let mut out = String::new();
    if v < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&int_val.to_formatted_string(loc));
    if !frac.is_empty() {
        out.push(dec);
        out.push_str(frac);
    }
    out
}

fn decimals_for(step: f64) -> usize {
    if step <= 0.0 || !step.is_finite() {
        return 0;
    }
    (0..=10)
        .find(|d| {
            let s = step * 10f64.powi(*d);
            (s - s.round()).abs() < 1e-6 * s.max(1.0)
        })
        .unwrap_or(10) as usize
}

/// Ticks for a numeric axis spanning `[lo, hi]`.
pub fn numeric_ticks(lo: f64, hi: f64, max_ticks: usize, locale: &str) -> Vec<(f64, String)> {
    let step = nice_step(lo, hi, max_ticks);
    let decimals = decimals_for(step);
    ticks_in(lo, hi, step)
        .into_iter()
        .map(|v| (v, format_number(v, decimals, locale)))
        .collect()
}

/// Decade ticks for a log axis; `lo`/`hi` are already in log10 space.
pub fn log_ticks(lo: f64, hi: f64, locale: &str) -> Vec<(f64, String)> {
    let first = lo.ceil() as i32;
    let last = hi.floor() as i32;
    let stride = (((last - first) / 8) + 1).max(1);
    (first..=last)
        .step_by(stride as usize)
        .map(|k| {
            let label = if (-3..=5).contains(&k) {
                format_number(10f64.powi(k), (-k).max(0) as usize, locale)
            } else {
                format!("1e{k}")
            };
            (k as f64, label)
        })
        .collect()
}

const TIME_STEPS: &[f64] = &[
    1.0,
    5.0,
    15.0,
    30.0,
    60.0,
    300.0,
    900.0,
    1800.0,
    3600.0,
    3.0 * 3600.0,
    6.0 * 3600.0,
    12.0 * 3600.0,
    DAY,
    2.0 * DAY,
    7.0 * DAY,
    14.0 * DAY,
    30.0 * DAY,
    91.0 * DAY,
    182.0 * DAY,
    365.0 * DAY,
    2.0 * 365.0 * DAY,
    5.0 * 365.0 * DAY,
    10.0 * 365.0 * DAY,
    25.0 * 365.0 * DAY,
    50.0 * 365.0 * DAY,
    100.0 * 365.0 * DAY,
];

/// Ticks for a time axis; values are seconds since the Unix epoch.
pub fn time_ticks(lo: f64, hi: f64, max_ticks: usize) -> Vec<(f64, String)> {
    let raw = (hi - lo).abs() / max_ticks.max(1) as f64;
    let step = TIME_STEPS
        .iter()
        .copied()
        .find(|s| *s >= raw)
        .unwrap_or(100.0 * 365.0 * DAY);
    let pattern = if step >= DAY { "%Y-%m-%d" } else { "%Y-%m-%d %H:%M" };
    ticks_in(lo, hi, step)
        .into_iter()
        .filter_map(|v| {
            DateTime::from_timestamp(v as i64, 0).map(|t| (v, t.format(pattern).to_string()))
        })
        .collect()
}

/// Resolve explicit ticks (formatting unlabeled ones) or generate them for the range.
pub fn axis_ticks(
    explicit: Option<&[Tick]>,
    range: (f64, f64),
    format: TickFormat,
    scale: AxisScale,
    max_ticks: usize,
    locale: &str,
) -> Vec<(f64, String)> {
    if let Some(ticks) = explicit {
        let step = if ticks.len() > 1 {
            (ticks[1].pos - ticks[0].pos).abs()
        } else {
            1.0
        };
        let decimals = decimals_for(step);
        return ticks
            .iter()
            .map(|t| {
                let label = t
                    .label
                    .clone()
                    .unwrap_or_else(|| format_number(t.pos, decimals, locale));
                (t.pos, label)
            })
            .collect();
    }
    match (scale, format) {
        (AxisScale::Log, _) => log_ticks(range.0, range.1, locale),
        (_, TickFormat::Time) => time_ticks(range.0, range.1, max_ticks),
        _ => numeric_ticks(range.0, range.1, max_ticks, locale),
    }
}
