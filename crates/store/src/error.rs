use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Handle was never issued by this store, or its entry was deleted
    #[error("Unknown {kind} handle: {id}")]
    UnknownHandle { kind: &'static str, id: u64 },

    #[error("Symbol not found: {0}")]
    UnknownSymbol(String),
}
