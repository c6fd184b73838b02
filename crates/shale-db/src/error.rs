use std::fmt;

use shale_store::StoreError;

#[derive(Debug)]
pub enum DbError {
    Store(StoreError),
    InvalidArgument(String),
    Serialization(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Store(e) => write!(f, "store error: {e}"),
            DbError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            DbError::Serialization(msg) => write!(f, "serialization error: {msg}"),
        }
    }
}

impl std::error::Error for DbError {}

impl From<StoreError> for DbError {
    fn from(e: StoreError) -> Self {
        DbError::Store(e)
    }
}

impl From<bson::ser::Error> for DbError {
    fn from(e: bson::ser::Error) -> Self {
        DbError::Serialization(e.to_string())
    }
}
