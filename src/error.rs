use std::collections::TryReserveError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),

    #[error("Arena full: {0} nodes")]
    ArenaFull(usize),

    #[error("Duplicate key")]
    DuplicateKey,

    #[error("Invalid iterator: not positioned at a key")]
    InvalidIterator,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
