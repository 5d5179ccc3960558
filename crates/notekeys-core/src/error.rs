use thiserror::Error;

/// Failure reported by an input sink for a single action.
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("input was blocked by the system: {0}")]
    Rejected(String),
    #[error("input sink is closed")]
    Closed,
    #[error("input injection is not supported on this platform")]
    Unsupported,
}

/// Errors raised while parsing a mapping file or selecting a set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("line {line}: entry outside of a [section]")]
    EntryOutsideSection { line: usize },
    #[error("line {line}: expected `note = key`")]
    MissingSeparator { line: usize },
    #[error("line {line}: invalid note `{text}`")]
    InvalidNote { line: usize, text: String },
    #[error("line {line}: invalid key `{text}`")]
    InvalidKey { line: usize, text: String },
    #[error("line {line}: empty section name")]
    EmptySectionName { line: usize },
    #[error("unknown mapping set `{0}`")]
    UnknownSet(String),
}
