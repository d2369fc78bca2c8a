pub mod table;
pub mod time;

use crate::config::RawTable;
use crate::error::{Error, Result};

pub use table::{parse_table, TableOptions};
pub use time::parse_time;

/// Read `input` with a named delimiter preset.
pub fn parse(format: &str, input: &[u8], index_column: bool) -> Result<RawTable> {
    let delimiter = match format {
        "csv" => b',',
        "tsv" => b'\t',
        "ssv" => b';',
        _ => return Err(Error::UnknownFormat(format.to_string())),
    };
    parse_table(
        input,
        TableOptions {
            delimiter,
            index_column,
        },
    )
}
