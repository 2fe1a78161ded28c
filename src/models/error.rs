use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("malformed catalog: {0}")]
    MalformedCatalog(String),
    #[error("unknown model `{0}`")]
    UnknownModel(String),
    #[error("unknown variant `{variant}` for model `{model}`")]
    UnknownVariant { model: String, variant: String },
    #[error("unknown quantization `{quantization}` for `{model}:{variant}`")]
    UnknownQuantization {
        model: String,
        variant: String,
        quantization: String,
    },
    #[error("url template `{0}` is not of the form <project>/<filename>")]
    MalformedUrlTemplate(String),
    #[error("{} is not a usable storage directory: {reason}", path.display())]
    DirectoryError { path: PathBuf, reason: String },
    #[error("failed to download {identifier}: {reason}")]
    DownloadFailed { identifier: String, reason: String },
    #[error("downloaded file size mismatch for {}: expected {expected} bytes, got {actual}", path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
}
