//! Errors raised while loading constraint resources.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource file could not be read.
    #[error("cannot read resource {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resource file was read but held no usable entries.
    #[error("resource {path} contains no entries")]
    Empty { path: PathBuf },
}
