use std::path::PathBuf;

use thiserror::Error;

use crate::session::RecordError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to access {}: {error}", path.display())]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("{}, line {line}: {msg}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }
}

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("There are no frame counts to plot")]
    NoData,

    #[error("Failed to save plot to {}: {error}", path.display())]
    Io {
        path: PathBuf,
        error: image::ImageError,
    },
}
