use tracing::debug;

use crate::config::RawTable;
use crate::error::Result;

/// Cell texts read as missing, matching the usual spreadsheet/pandas NA set.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    pub delimiter: u8,
    /// First column is a row label, not data.
    pub index_column: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            index_column: true,
        }
    }
}

/// Read a delimited sheet with a header row. Quoted headers may span lines.
pub fn parse_table(input: &[u8], opts: TableOptions) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter)
        .has_headers(true)
        .from_reader(input);

    let skip = usize::from(opts.index_column);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .skip(skip)
        .map(String::from)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().skip(skip).map(cell).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "parsed table");
    Ok(RawTable { headers, rows })
}

#[inline]
fn cell(text: &str) -> Option<String> {
    if MISSING_MARKERS.contains(&text) {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = ",Family Name,Given Name,Nation,Races,\"Sh Time\nP\",\"Penalty\nLoop\"
0,DAHLMEIER,Laura,GER,21,0:27.1,0:24.3
1,KUZMINA,Anastasiya,SVK,12,,NaN
";

    #[test]
    fn parse_sample() {
        let t = parse_table(SAMPLE.as_bytes(), TableOptions::default()).unwrap();
        assert_eq!(
            t.headers,
            vec!["Family Name", "Given Name", "Nation", "Races", "Sh Time\nP", "Penalty\nLoop"]
        );
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][0].as_deref(), Some("DAHLMEIER"));
        assert_eq!(t.rows[0][4].as_deref(), Some("0:27.1"));
        assert_eq!(t.rows[1][4], None);
        assert_eq!(t.rows[1][5], None);
        assert_eq!(t.missing_count(), 2);
    }

    #[test]
    fn keeps_index_when_asked() {
        let opts = TableOptions {
            index_column: false,
            ..TableOptions::default()
        };
        let t = parse_table(SAMPLE.as_bytes(), opts).unwrap();
        assert_eq!(t.headers[0], "");
        assert_eq!(t.rows[1][0].as_deref(), Some("1"));
    }

    #[test]
    fn custom_delimiter() {
        let input = "Name;Sh_Time_P\nA;1:00.0\n";
        let opts = TableOptions {
            delimiter: b';',
            index_column: false,
        };
        let t = parse_table(input.as_bytes(), opts).unwrap();
        assert_eq!(t.headers, vec!["Name", "Sh_Time_P"]);
        assert_eq!(t.rows[0][1].as_deref(), Some("1:00.0"));
    }

    #[test]
    fn ragged_rows_fail() {
        let input = "a,b,c\n1,2\n";
        assert!(parse_table(input.as_bytes(), TableOptions::default()).is_err());
    }
}
