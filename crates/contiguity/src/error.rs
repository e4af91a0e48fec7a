//! Error taxonomy for dataset loading and graph construction.
//!
//! Per-group failures (`MissingGroup`, `UnitNumbering`, artifact I/O) are
//! recoverable at batch granularity: callers report them and continue with
//! the remaining groups. Per-unit geometry failures never reach this enum;
//! the adjacency builder contains them in its `BuildReport`.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// No records match the requested group code. Skip-and-continue.
    #[error("no records match group code {0}")]
    MissingGroup(i64),

    /// Unit numbers of a group are not exactly 1..=N, so node ids and the
    /// id-1 adjacency indexing cannot both hold.
    #[error(
        "group {group}: unit numbers must be exactly 1..={expected}, \
         found {found} at sorted position {position}"
    )]
    UnitNumbering {
        group: i64,
        expected: usize,
        found: i64,
        position: usize,
    },

    /// Malformed input (missing required column, unparseable attribute,
    /// non-areal geometry).
    #[error("dataset: {0}")]
    Dataset(String),

    /// Assembled graph violates an output invariant.
    #[error("graph: {0}")]
    InvalidGraph(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    GeoJson(#[from] geojson::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
