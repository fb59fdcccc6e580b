#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("config error: {reason}")]
    Config { reason: String },

    #[error("unknown error code: {code}")]
    UnknownCode { code: i64 },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
