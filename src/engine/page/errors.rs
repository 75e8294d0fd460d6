use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Buffer allocator exhausted: requested {requested} bytes with {in_use} in use (limit {limit})")]
    Exhausted {
        requested: usize,
        in_use: usize,
        limit: usize,
    },

    #[error("Page builder has no open page")]
    Closed,

    #[error("Corrupt page: {0}")]
    Corrupt(String),

    #[error("Dictionary entry is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
