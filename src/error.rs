use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A time cell that is not `<minutes>:<seconds>.<tenths>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed time value {value:?}: {reason}")]
pub struct FormatError {
    pub value: String,
    pub reason: &'static str,
}

impl FormatError {
    pub fn new(value: &str, reason: &'static str) -> Self {
        Self {
            value: value.to_string(),
            reason,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// A malformed time cell; row is 0-based, header excluded.
    #[error("row {row}, column {column:?}: {source}")]
    Cell {
        row: usize,
        column: String,
        #[source]
        source: FormatError,
    },

    #[error("unknown time column {0:?}")]
    UnknownColumn(String),

    #[error("required column {0:?} not found")]
    MissingColumn(String),

    #[error("column {column:?} is not numeric at row {row}")]
    NotNumeric { row: usize, column: String },

    #[error("unknown input format {0:?}, expected csv, tsv or ssv")]
    UnknownFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_message() {
        let e = FormatError::new("1.23", "missing ':' separator");
        assert_eq!(e.to_string(), r#"malformed time value "1.23": missing ':' separator"#);
    }

    #[test]
    fn cell_error_names_location() {
        let e = Error::Cell {
            row: 3,
            column: "Sh_Time_P".into(),
            source: FormatError::new("abc", "missing ':' separator"),
        };
        let s = e.to_string();
        assert!(s.contains("row 3"));
        assert!(s.contains("Sh_Time_P"));
        assert!(s.contains("abc"));
    }

    #[test]
    fn unknown_column_message() {
        let e = Error::UnknownColumn("Rg_Time_X".into());
        assert!(e.to_string().contains("Rg_Time_X"));
    }
}
