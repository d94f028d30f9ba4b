//! Ball-processing and innings-lifecycle engine for crease.
//!
//! A delivery flows one way through the engine:
//!
//! 1. [`BallProcessor`] computes the next [`InningsAggregate`], a ledger
//!    draft, and the [`DeliveryEffect`] needed to reverse it.
//! 2. The ledger appends the draft; only then is the new aggregate committed.
//! 3. [`CompletionEvaluator`] decides whether the innings closed, and
//!    [`ResultDeterminer`] settles the match when the second innings does.
//!
//! [`UndoEngine`] applies the journaled inverse of the last valid delivery
//! and [`Replay`] rebuilds an innings from its ledger alone. [`Scorer`] ties
//! these together behind a per-match lock.

pub mod completion;
pub mod config;
pub mod effect;
pub mod error;
pub mod innings;
pub mod lines;
pub mod match_state;
pub mod processor;
pub mod replay;
pub mod result;
pub mod roster;
pub mod scorer;
pub mod undo;
mod wicket;

pub use completion::{CompletionContext, CompletionEvaluator, CompletionTrigger};
pub use config::{ConfigError, EngineConfig};
pub use effect::DeliveryEffect;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use innings::{Extras, InningsAggregate, Openers};
pub use lines::{BattingLine, BowlingLine, LineBook, Overs};
pub use match_state::{MatchSetup, MatchState, MatchStatus, Toss, TossDecision};
pub use processor::{BallProcessor, ProcessedBall};
pub use replay::{Replay, ReplayCheck};
pub use result::{Margin, MatchResult, ResultDeterminer};
pub use roster::{InMemoryRoster, RosterProvider, TeamSnapshot};
pub use scorer::{DeliveryOutcome, InningsSummary, Scorer, UndoOutcome};
pub use undo::UndoEngine;
