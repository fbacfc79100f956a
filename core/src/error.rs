use std::path::PathBuf;
use thiserror::Error;

/// Why the reading source could not produce a count this run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("download count not found in output: {output}")]
    CountMissing { output: String },

    #[error("download count {0:?} is not a valid integer")]
    InvalidCount(String),
}

/// A stored record that cannot be turned into a reading.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("record is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unparseable date {0}")]
    InvalidDate(String),

    #[error("invalid download_count {0}")]
    InvalidCount(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read series store {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("series store {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("series store {} must contain a JSON array of records", path.display())]
    NotAnArray { path: PathBuf },

    #[error("failed to write series store {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
