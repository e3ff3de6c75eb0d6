use thiserror::Error;

/// Every way a sync run can go wrong.
///
/// Token, page-structure and API failures are fatal for a run. Store failures
/// are recovered by the engine and only show up in the run summary and logs.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("source page unreachable: {0}")]
    SourcePageUnreachable(String),

    #[error("could not find `{0}` config on the page, website structure might have changed")]
    ConfigNotFound(String),

    #[error("failed to recover nonce from `{0}` config")]
    TokenParse(String),

    #[error("nonce is not a valid header value: {0}")]
    InvalidNonce(String),

    #[error("authorization rejected on page {page} (HTTP 403)")]
    AuthorizationRejected { page: u32 },

    #[error("source API error: {0}")]
    SourceApi(String),

    #[error("store query failed: {0}")]
    StoreQuery(String),

    #[error("store write failed: {0}")]
    StoreWrite(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
