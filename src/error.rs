use std::error::Error;
use std::fmt::{Display, Formatter};

/// A contract violation detected while combining operations. These always mean the caller passed
/// values which don't belong together (eg composing operations made for different documents).
/// They are never recoverable by retrying.
#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum OpError {
    /// The operations (or operation and document) are for documents of different lengths.
    LengthMismatch { expected: usize, actual: usize },
    /// Two inputs disagree about the content of the same piece of text.
    TextMismatch { offset: usize, expected: String, actual: String },
    /// An offset or range lies outside the document.
    OutOfRange { offset: usize, len: usize },
    /// A retain with a negative length was found while decoding.
    NegativeLength(i64),
}

impl Display for OpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OpError::LengthMismatch { expected, actual } => {
                write!(f, "Operation length mismatch: expected {expected}, got {actual}")
            }
            OpError::TextMismatch { offset, expected, actual } => {
                write!(f, "Text mismatch at offset {offset}: expected {expected:?}, got {actual:?}")
            }
            OpError::OutOfRange { offset, len } => {
                write!(f, "Offset {offset} is out of range for a document of length {len}")
            }
            OpError::NegativeLength(len) => write!(f, "Invalid retain length {len}"),
        }
    }
}

impl Error for OpError {}
