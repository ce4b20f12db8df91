/// Errors from building outbound control sequences.
///
/// Decoding inbound reports never fails; a sequence is either recognized or
/// passed through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    /// The text names no known display attribute.
    #[error("unknown display attribute {0:?}")]
    UnknownAttribute(String),
}

pub type Result<T> = std::result::Result<T, SequenceError>;
