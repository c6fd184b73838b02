use serde::{Deserialize, Serialize};

/// Offset/limit window over the match stream, MySQL `LIMIT cursor, size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub cursor: usize,
    pub size: usize,
}
