use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The log file could not be opened.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid parser config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
