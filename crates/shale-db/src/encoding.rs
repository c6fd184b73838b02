use crate::doc::ID_FIELD;

const PRIMARY_TAG: u8 = b'p';
const FIELD_TAG: u8 = b'f';
const SEP: u8 = b'/';

/// Structured key for table storage.
///
/// - `Primary(id)` — the canonical record: `p/_id/{id}` → document bytes
/// - `Field(field, value, id)` — a derived index entry:
///   `f/{field}/{value}/{id}` → id bytes
///
/// The separator is ASCII `/`; field names and values are validated at
/// mutation time to never contain it. For a fixed field, the lexicographic
/// order of encoded keys equals the lexicographic order of `(value, id)`,
/// which is what makes equality and prefix lookups single ordered range
/// reads. Keys are never decoded — readers work with prefixes and take the
/// document id from the entry value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Key<'a> {
    Primary { id: &'a str },
    Field {
        field: &'a str,
        value: &'a str,
        id: &'a str,
    },
}

impl Key<'_> {
    pub(crate) fn encode(&self) -> Vec<u8> {
        match self {
            Key::Primary { id } => {
                let mut buf = Vec::with_capacity(2 + ID_FIELD.len() + 1 + id.len());
                buf.push(PRIMARY_TAG);
                buf.push(SEP);
                buf.extend_from_slice(ID_FIELD.as_bytes());
                buf.push(SEP);
                buf.extend_from_slice(id.as_bytes());
                buf
            }
            Key::Field { field, value, id } => {
                let mut buf =
                    Vec::with_capacity(2 + field.len() + 1 + value.len() + 1 + id.len());
                buf.push(FIELD_TAG);
                buf.push(SEP);
                buf.extend_from_slice(field.as_bytes());
                buf.push(SEP);
                buf.extend_from_slice(value.as_bytes());
                buf.push(SEP);
                buf.extend_from_slice(id.as_bytes());
                buf
            }
        }
    }
}

/// Structured prefix for scan operations.
///
/// - `Primary` — every canonical record (`p…`), the full-table scan
/// - `Field(field, value_prefix)` — index entries whose value starts with
///   `value_prefix` (`f/{field}/{value_prefix}…`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyPrefix<'a> {
    Primary,
    Field { field: &'a str, value: &'a str },
}

impl KeyPrefix<'_> {
    pub(crate) fn encode(&self) -> Vec<u8> {
        match self {
            KeyPrefix::Primary => vec![PRIMARY_TAG],
            KeyPrefix::Field { field, value } => {
                let mut buf = Vec::with_capacity(2 + field.len() + 1 + value.len());
                buf.push(FIELD_TAG);
                buf.push(SEP);
                buf.extend_from_slice(field.as_bytes());
                buf.push(SEP);
                buf.extend_from_slice(value.as_bytes());
                buf
            }
        }
    }
}

pub(crate) fn is_primary(key: &[u8]) -> bool {
    key.first() == Some(&PRIMARY_TAG)
}

/// `/` is the key separator and is reserved in field names and values.
pub(crate) fn contains_separator(s: &str) -> bool {
    s.as_bytes().contains(&SEP)
}
