use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest store missing, corrupt, keyed, or with an unexpected schema.
    #[error("catalog unreadable: {0}")]
    CatalogUnreadable(String),

    #[error("notes store unreadable: {0}")]
    NotesUnreadable(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("unknown compression framing (leading bytes {0:02x?})")]
    UnknownCodec(Vec<u8>),

    #[error("config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsafe destination path: {0}")]
    UnsafePath(String),

    #[error("transfer error: {0}")]
    Transfer(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, PortError>;
