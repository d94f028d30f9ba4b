//! Foundation types for crease, a ball-by-ball cricket scoring engine.
//!
//! Every other crease crate depends on `crease-types`.
//!
//! # Key Types
//!
//! - [`PlayerId`], [`TeamId`], [`MatchId`], [`InningsId`]: UUID v7 identifiers
//! - [`Delivery`]: one bowled ball as reported by the scorer
//! - [`BallType`] / [`WicketType`]: delivery and dismissal classification

pub mod delivery;
pub mod error;
pub mod ids;

pub use delivery::{BallType, Delivery, WicketType};
pub use error::TypeError;
pub use ids::{InningsId, MatchId, PlayerId, TeamId};

/// Legal balls in one over.
pub const BALLS_PER_OVER: u32 = 6;
