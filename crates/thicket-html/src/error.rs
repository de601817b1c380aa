//! Invariant violations.
//!
//! Markup can never produce a [`Fault`]. Malformed input is recorded in the
//! parse error list and recovered from; a `Fault` means the tokenizer or a
//! tree builder was driven in a way its contract forbids.

use thicket_dom::TreeError;
use thiserror::Error;

/// A broken contract between parser components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// `read()` was called before the previously returned token was recycled.
    #[error("read() called while the previous token is still checked out")]
    TokenNotReturned,
    /// The state machine produced a token while another was still pending.
    #[error("token emitted while another token was pending")]
    EmitWhilePending,
    /// The cursor was asked to rewind without a recorded mark.
    #[error("rewind requested without a mark")]
    NoMark,
    /// A tree builder popped an empty open-element stack.
    #[error("stack of open elements underflowed")]
    StackUnderflow,
    /// A state the algorithms define as impossible was reached.
    #[error("unreachable parser state: {0}")]
    Unreachable(&'static str),
    /// A tree mutation was rejected.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
