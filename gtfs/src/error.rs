use std::fmt;
use std::path::PathBuf;

use crate::StopID;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Some GTFS tables don't exist at any candidate location. Queries fail as a whole rather
    /// than answering from a partial feed.
    #[error("GTFS tables not found: {}", describe_missing(.0))]
    TablesNotFound(Vec<MissingTable>),
    #[error("unknown stop {0}")]
    StopNotFound(StopID),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("parsing {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One table that couldn't be located, and everywhere we looked for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingTable {
    pub table: String,
    pub candidates: Vec<PathBuf>,
}

impl Error {
    /// The HTTP status an API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::StopNotFound(_) => 404,
            Error::TablesNotFound(_) => 503,
            Error::Io(_) | Error::Csv { .. } | Error::Config { .. } => 500,
        }
    }

    /// The names of the missing tables, if that's what went wrong
    pub fn missing_tables(&self) -> Vec<&str> {
        match self {
            Error::TablesNotFound(missing) => missing.iter().map(|m| m.table.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for MissingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tried: Vec<String> = self
            .candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        write!(f, "{} (tried {})", self.table, tried.join(", "))
    }
}

fn describe_missing(missing: &[MissingTable]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
