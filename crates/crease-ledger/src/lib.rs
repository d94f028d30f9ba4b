//! Append-only ball ledger for crease.
//!
//! Every delivery bowled in an innings becomes a [`BallRecord`]. Records are
//! never deleted: undo flips the validity flag and leaves the record in place.
//! This crate provides:
//! - `BallDraft` / `BallRecord` with hash-linked integrity
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryBallLedger` implementation for tests and embedding
//! - Stream validation (sequence, hash chain, ball numbering)
//! - Ball-by-ball projections (over strips, fall of wickets, run rates)

pub mod error;
pub mod memory;
pub mod projection;
pub mod record;
pub mod traits;
pub mod validation;

pub use error::LedgerError;
pub use memory::InMemoryBallLedger;
pub use projection::{
    BallEvent, ChaseState, FallOfWicket, InningsProjection, OverSummary, ProjectionBuilder,
};
pub use record::{BallDraft, BallRecord};
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{StreamValidator, ValidationReport, Violation, ViolationKind};
