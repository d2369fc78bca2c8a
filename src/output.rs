use crate::config::{Table, Value};
use crate::stats::{BoxStats, Group, Report};
use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub enum Writer<W: Write> {
    Debug(W),
    Json(W, bool), // bool tracks if we've written the opening bracket
    Jsonl(W),
    Delimited(csv::Writer<W>, bool), // bool tracks if we've written headers
}

impl<W: Write> Writer<W> {
    fn delimited(inner: W, delimiter: u8) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(inner);
        Writer::Delimited(writer, false)
    }

    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        match self {
            Writer::Debug(writer) => {
                for row in table.iter_rows() {
                    writeln!(writer, "{{")?;
                    for (header, cell) in row.headers.iter().zip(row.cells) {
                        match cell {
                            Value::Text(text) => writeln!(writer, "    {:?}: {:?},", header, text)?,
                            Value::Seconds(secs) => {
                                writeln!(writer, "    {:?}: {:.1},", header, secs)?
                            }
                        }
                    }
                    writeln!(writer, "}}")?;
                }
            }
            Writer::Json(writer, is_first) => {
                for row in table.iter_rows() {
                    if *is_first {
                        write!(writer, "[")?;
                        *is_first = false;
                    } else {
                        write!(writer, ",")?;
                    }
                    let serialized = serde_json::to_string_pretty(&row)?;
                    write!(writer, "\n{}", serialized)?;
                }
            }
            Writer::Jsonl(writer) => {
                for row in table.iter_rows() {
                    let serialized = serde_json::to_string(&row)?;
                    writeln!(writer, "{}", serialized)?;
                }
            }
            Writer::Delimited(writer, headers_written) => {
                if !*headers_written {
                    writer.write_record(&table.headers)?;
                    *headers_written = true;
                }
                for row in &table.rows {
                    writer.write_record(row.iter().map(Value::to_string))?;
                }
            }
        }
        Ok(())
    }

    /// Flush and hand back the underlying sink.
    pub fn finish(self) -> Result<W> {
        match self {
            Writer::Json(mut writer, is_first) => {
                if is_first {
                    write!(writer, "[")?;
                }
                writeln!(writer, "\n]")?;
                writer.flush()?;
                Ok(writer)
            }
            Writer::Debug(mut writer) | Writer::Jsonl(mut writer) => {
                writer.flush()?;
                Ok(writer)
            }
            Writer::Delimited(writer, _) => writer
                .into_inner()
                .map_err(|e| anyhow!("flushing delimited output: {}", e.error())),
        }
    }
}

pub fn create_writer(output_arg: &str) -> Result<Writer<Box<dyn Write>>> {
    match output_arg {
        "stdout" => Ok(Writer::Debug(Box::new(io::stdout()))),
        "json" => Ok(Writer::Json(Box::new(io::stdout()), true)),
        path if path.ends_with(".json") => Ok(Writer::Json(open(path)?, true)),
        path if path.ends_with(".jsonl") || path.ends_with(".ndjson") => {
            Ok(Writer::Jsonl(open(path)?))
        }
        path if path.ends_with(".csv") => Ok(Writer::delimited(open(path)?, b',')),
        path if path.ends_with(".tsv") => Ok(Writer::delimited(open(path)?, b'\t')),
        path => {
            // Default to JSON file if it looks like a path
            if path.contains('/') || path.contains('\\') || path.contains('.') {
                Ok(Writer::Json(open(path)?, true))
            } else {
                Err(anyhow!(
                    "Unknown output format: {}. Use 'stdout', 'json', or a file path",
                    output_arg
                ))
            }
        }
    }
}

fn open(path: &str) -> Result<Box<dyn Write>> {
    create_parent_dirs(path)?;
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

fn create_parent_dirs(file_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(file_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn write_report_json(path: &str, report: &Report) -> Result<()> {
    let mut writer = open(path)?;
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Plain-text rendering of the statistics report.
pub fn write_summary<W: Write>(w: &mut W, report: &Report) -> Result<()> {
    writeln!(
        w,
        "This data set has {} rows and {} columns",
        report.rows, report.columns
    )?;

    writeln!(w, "\n=== DESCRIBE ===")?;
    writeln!(
        w,
        "{:<14}{:>7}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}",
        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    )?;
    for s in &report.describe {
        writeln!(
            w,
            "{:<14}{:>7}{:>10.3}{:>10.3}{:>10.3}{:>10.3}{:>10.3}{:>10.3}{:>10.3}",
            s.column.name(),
            s.count,
            s.mean,
            s.std,
            s.min,
            s.q1,
            s.median,
            s.q3,
            s.max
        )?;
    }

    writeln!(w, "\n=== CORRELATION ===")?;
    let m = &report.correlation;
    write!(w, "{:<14}", "")?;
    for c in &m.columns {
        write!(w, "{:>13}", c.name())?;
    }
    writeln!(w)?;
    for (c, row) in m.columns.iter().zip(&m.values) {
        write!(w, "{:<14}", c.name())?;
        for v in row {
            write!(w, "{:>13.3}", v)?;
        }
        writeln!(w)?;
    }

    write_boxes(w, Group::Shooting, &report.shooting)?;
    write_boxes(w, Group::Range, &report.range)?;
    Ok(())
}

fn write_boxes<W: Write>(w: &mut W, group: Group, boxes: &[BoxStats]) -> Result<()> {
    writeln!(w, "\n=== {} ===", group.title())?;
    for b in boxes {
        writeln!(
            w,
            "{:<14} whiskers [{:.1}, {:.1}]  box [{:.1}, {:.1}, {:.1}]  outliers {}",
            b.column.name(),
            b.whisker_low,
            b.whisker_high,
            b.q1,
            b.median,
            b.q3,
            b.outliers.len()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AthleteRecord, TimeColumn};
    use crate::stats;

    fn sample() -> Table {
        Table {
            headers: vec!["Name".into(), "Sh_Time_P".into()],
            rows: vec![
                vec![Value::Text("A".into()), Value::Seconds(60.0)],
                vec![Value::Text("B, Jr".into()), Value::Seconds(27.5)],
            ],
        }
    }

    fn written(mut w: Writer<Vec<u8>>) -> String {
        w.write_table(&sample()).unwrap();
        String::from_utf8(w.finish().unwrap()).unwrap()
    }

    #[test]
    fn json_array() {
        let out = written(Writer::Json(Vec::new(), true));
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["Name"], "A");
        assert_eq!(v[1]["Sh_Time_P"], 27.5);
    }

    #[test]
    fn empty_json_is_an_empty_array() {
        let out = Writer::Json(Vec::new(), true).finish().unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v, serde_json::json!([]));
    }

    #[test]
    fn jsonl_lines() {
        let out = written(Writer::Jsonl(Vec::new()));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"Name":"A","Sh_Time_P":60.0}"#);
    }

    #[test]
    fn csv_quotes_fields() {
        let out = written(Writer::delimited(Vec::new(), b','));
        assert_eq!(out, "Name,Sh_Time_P\nA,60.0\n\"B, Jr\",27.5\n");
    }

    #[test]
    fn debug_rows_name_their_columns() {
        let out = written(Writer::Debug(Vec::new()));
        assert!(out.starts_with("{\n    \"Name\": \"A\",\n    \"Sh_Time_P\": 60.0,\n}\n"));
        assert!(out.contains("    \"Name\": \"B, Jr\",\n"));
        assert!(out.contains("    \"Sh_Time_P\": 27.5,\n"));
    }

    #[test]
    fn tsv_header_once() {
        let mut w = Writer::delimited(Vec::new(), b'\t');
        w.write_table(&sample()).unwrap();
        w.write_table(&sample()).unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(out.matches("Name\tSh_Time_P").count(), 1);
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn unknown_output_is_rejected() {
        assert!(create_writer("yaml").is_err());
    }

    #[test]
    fn summary_text() {
        let mut r = AthleteRecord::default();
        r.set_time(TimeColumn::ShootingProne, 30.0);
        let rep = stats::report(&[r], 19);
        let mut buf = Vec::new();
        write_summary(&mut buf, &rep).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("This data set has 1 rows and 19 columns"));
        assert!(text.contains("Shooting Time Distribution (seconds)"));
        assert!(text.contains("Range Time Distribution (seconds)"));
        assert!(text.contains("Penalty Loop"));
    }
}
