use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::{
    AthleteRecord, ColumnMap, IDENTITY_COLUMNS, MISSING_SENTINEL, RawTable, Table, TimeColumn,
    Value,
};
use crate::error::{Error, Result};
use crate::parsers::parse_time;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Replace every missing cell, in every column, with `"0:00.0"`.
pub fn fill_missing(table: &RawTable) -> RawTable {
    RawTable {
        headers: table.headers.clone(),
        rows: table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| Some(c.clone().unwrap_or_else(|| MISSING_SENTINEL.to_string())))
                    .collect()
            })
            .collect(),
    }
}

/// Map raw sheet headers to canonical names. Exact matches win; otherwise the
/// header is compared with runs of whitespace folded, so `"Sh Time\r\nP"` and
/// `"Sh  Time P"` still resolve. Unmapped headers pass through unchanged.
pub fn rename_columns(table: &RawTable, map: &ColumnMap) -> RawTable {
    let headers = table
        .headers
        .iter()
        .map(|raw| match resolve(map, raw) {
            Some(name) => {
                debug!(raw = %raw.escape_debug(), canonical = name, "renamed column");
                name.to_string()
            }
            None => {
                debug!(raw = %raw.escape_debug(), "column kept as is");
                raw.clone()
            }
        })
        .collect();
    RawTable {
        headers,
        rows: table.rows.clone(),
    }
}

fn resolve<'m>(map: &'m ColumnMap, raw: &str) -> Option<&'m str> {
    map.get(raw).or_else(|| {
        let folded = fold(raw);
        map.keys().find(|k| fold(k) == folded).and_then(|k| map.get(k))
    })
}

fn fold(header: &str) -> String {
    WHITESPACE.replace_all(header.trim(), " ").into_owned()
}

/// Canonical time columns present in `headers`, in header order. Absent ones
/// are logged.
pub fn default_time_columns(headers: &[String]) -> Vec<String> {
    for c in TimeColumn::ALL {
        if !headers.iter().any(|h| h == c.name()) {
            warn!(column = c.name(), "time column not present in input");
        }
    }
    headers
        .iter()
        .filter(|h| TimeColumn::from_name(h).is_some())
        .cloned()
        .collect()
}

/// Zero-fill missing cells, then convert each designated column to seconds.
///
/// Row order, column order and row count are preserved; other columns stay
/// text. The first malformed cell aborts the whole run.
pub fn normalize<S: AsRef<str>>(table: &RawTable, time_columns: &[S]) -> Result<Table> {
    let mut is_time = vec![false; table.headers.len()];
    for name in time_columns {
        let name = name.as_ref();
        let idx = table
            .column_index(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))?;
        is_time[idx] = true;
    }

    let filled = fill_missing(table);
    let mut rows = Vec::with_capacity(filled.rows.len());
    for (r, row) in filled.rows.into_iter().enumerate() {
        let mut out = Vec::with_capacity(row.len());
        // filled rows hold no `None`, so flattening keeps every column
        for (c, text) in row.into_iter().flatten().enumerate() {
            if is_time.get(c).copied().unwrap_or(false) {
                let secs = parse_time(&text).map_err(|source| Error::Cell {
                    row: r,
                    column: table.headers[c].clone(),
                    source,
                })?;
                out.push(Value::Seconds(secs));
            } else {
                out.push(Value::Text(text));
            }
        }
        rows.push(out);
    }

    Ok(Table {
        headers: table.headers.clone(),
        rows,
    })
}

/// Typed view of a normalized sheet. Needs the identity columns and every
/// canonical time column, converted. `Races` must be a whole number; a
/// zero-filled cell reads as 0.
pub fn into_records(table: &Table) -> Result<Vec<AthleteRecord>> {
    let col = |name: &'static str| {
        table
            .column_index(name)
            .map(|i| (name, i))
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    };
    let [family, given, nation, races] = IDENTITY_COLUMNS.map(col);
    let (family, given, nation, races) = (family?, given?, nation?, races?);
    let times = TimeColumn::ALL
        .into_iter()
        .map(|c| col(c.name()).map(|(_, i)| (c, i)))
        .collect::<Result<Vec<_>>>()?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(r, row)| -> Result<AthleteRecord> {
            let cell = |(name, i): (&str, usize)| {
                row.get(i)
                    .ok_or_else(|| Error::MissingColumn(name.to_string()))
            };
            let mut record = AthleteRecord {
                family_name: cell(family)?.to_string(),
                given_name: cell(given)?.to_string(),
                nation: cell(nation)?.to_string(),
                races: parse_races(cell(races)?).ok_or_else(|| Error::NotNumeric {
                    row: r,
                    column: races.0.to_string(),
                })?,
                ..AthleteRecord::default()
            };
            for &(c, i) in &times {
                let secs = cell((c.name(), i))?
                    .as_seconds()
                    .ok_or_else(|| Error::NotNumeric {
                        row: r,
                        column: c.name().to_string(),
                    })?;
                record.set_time(c, secs);
            }
            Ok(record)
        })
        .collect()
}

fn parse_races(value: &Value) -> Option<u32> {
    match value {
        Value::Text(s) if s == MISSING_SENTINEL => Some(0),
        Value::Text(s) => s.parse().ok(),
        Value::Seconds(_) => None,
    }
}
