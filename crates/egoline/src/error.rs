#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ego `{ego}` does not appear in any interaction")]
    EgoNotFound { ego: String },

    #[error("interaction {source_id} -> {target_id} at `{timestamp}` has an invalid weight: {weight}")]
    InvalidWeight {
        source_id: String,
        target_id: String,
        timestamp: String,
        weight: f64,
    },

    #[error("minimize mode `{mode}` is reserved and has no layout implementation")]
    UnsupportedMinimize { mode: String },

    #[error("invalid layout configuration: {message}")]
    InvalidConfig { message: String },

    #[error("invalid timestamp bucketing: {message}")]
    InvalidBucket { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
