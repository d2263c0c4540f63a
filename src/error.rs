/// Error types shared by the roster, image and settings code
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GreditError {
    /// A file could not be opened or read
    #[error("Failed to open file: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A CSV line did not split into the expected number of fields
    #[error("Line {line} has {fields} fields, expected {expected}")]
    MalformedRow {
        line: usize,
        fields: usize,
        expected: usize,
    },

    #[error("CSV file {} is empty", .0.display())]
    EmptyCsv(PathBuf),

    #[error("Invalid settings file {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl GreditError {
    /// Attach a path to a raw I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GreditError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GreditError>;
