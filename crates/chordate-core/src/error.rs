use crate::detect::DetectKindError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    DetectKind(#[from] DetectKindError),

    #[error("Unsupported chart kind: {kind}")]
    UnsupportedChart { kind: String },

    #[error("Chart parse error ({kind}): {message}")]
    ChartParse { kind: String, message: String },

    #[error("Invalid chart document: {message}")]
    InvalidDocument { message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
