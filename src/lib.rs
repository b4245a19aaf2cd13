//! An operational transform (OT) edit log for plain text.
//!
//! An [`Operation`] describes one complete edit to a text document of a known length, as a list
//! of [`Op`]s walking over the document from start to end. Each op either keeps some characters
//! ([`Op::Retain`]) or replaces some exact text with some other text ([`Op::Replace`]). All
//! lengths are counted in unicode codepoints.
//!
//! Operations form an algebra:
//!
//! - [`compose`](Operation::compose) combines two operations which apply one after the other.
//! - [`transform`](Operation::transform) rewrites an operation so it applies after a concurrent
//!   operation has been applied.
//! - [`compose_all`](Operation::compose_all) merges several independent edits of the same text.
//! - [`invert`](Operation::invert) makes an operation which undoes another.
//!
//! Carets, selections and other markers can be moved through operations with [`shift_points`]
//! and the `transform_*` methods on [`Operation`].
//!
//! ## Example
//!
//! ```
//! use editlog::{Operation, Sticky};
//!
//! let doc = "hello world";
//! let a = Operation::insert_at(5, ",", 11);
//! let b = Operation::deduce_operation(doc, "hello there");
//!
//! // a and b were made concurrently. Merge them.
//! let merged = a.compose(&b.transform(&a, Sticky::Right));
//! assert_eq!(merged.apply_to_string(doc).unwrap(), "hello, there");
//! assert_eq!(merged, a.plus(&b));
//!
//! // And move the caret from the end of the document.
//! assert_eq!(merged.transform_offset(11, Sticky::Left), 12);
//! ```
//!
//! Operations are immutable. They're stored in a persistent B-tree (see the `op-tree` crate), so
//! cloning them is cheap and querying lengths is O(1).

pub use builder::OperationBuilder;
pub use diff::{deduce, deduce_fast, deduce_with, DiffConfig};
pub use error::OpError;
pub use op::{Op, OpMetrics};
pub use operation::{AffectedRanges, OpCursor, Operation, Seek};
pub use points::{shift_points, try_shift_points, BorderKind, Caret, IntervalPoint, PointKind, Sticky};

mod builder;
mod chunk;
mod compose;
mod diff;
mod error;
mod normalize;
mod op;
mod operation;
mod points;
mod span;
mod transform;
pub mod unicount;

#[cfg(feature = "serde")]
mod serde_helpers;
