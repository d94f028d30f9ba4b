use serde::Serialize;

use crease_types::{InningsId, PlayerId, BALLS_PER_OVER};

use crate::error::LedgerError;
use crate::record::BallRecord;
use crate::traits::LedgerReader;

/// One ball in an over strip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BallEvent {
    pub seq: u64,
    pub over_number: u32,
    pub ball_number: u32,
    pub label: String,
    pub runs: u32,
    pub is_wicket: bool,
}

impl From<&BallRecord> for BallEvent {
    fn from(record: &BallRecord) -> Self {
        Self {
            seq: record.seq,
            over_number: record.over_number,
            ball_number: record.ball_number,
            label: record.label(),
            runs: record.total_runs(),
            is_wicket: record.is_wicket(),
        }
    }
}

/// A completed (or in-progress) over grouped from the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverSummary {
    /// Zero-based over number.
    pub over_number: u32,
    pub bowler: PlayerId,
    pub balls: Vec<BallEvent>,
    pub runs: u32,
    pub wickets: u32,
    pub legal_balls: u32,
}

impl OverSummary {
    fn start(record: &BallRecord) -> Self {
        Self {
            over_number: record.over_number,
            bowler: record.bowler,
            balls: Vec::new(),
            runs: 0,
            wickets: 0,
            legal_balls: 0,
        }
    }

    fn push(&mut self, record: &BallRecord) {
        self.runs += record.total_runs();
        if record.is_wicket() {
            self.wickets += 1;
        }
        if record.is_legal() {
            self.legal_balls += 1;
        }
        self.balls.push(BallEvent::from(record));
    }

    pub fn is_complete(&self) -> bool {
        self.legal_balls >= BALLS_PER_OVER
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallOfWicket {
    pub wicket_number: u32,
    pub score: u32,
    pub player: PlayerId,
    pub over: String,
}

/// What the chasing side still needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaseState {
    pub target: u32,
    pub runs_needed: u32,
    pub balls_remaining: u32,
    pub required_run_rate: Option<f64>,
}

/// Ball-by-ball reconstruction of one innings from its valid records.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsProjection {
    pub innings: InningsId,
    pub total_runs: u32,
    pub wickets: u32,
    pub legal_balls: u32,
    pub current_over: Vec<BallEvent>,
    pub previous_overs: Vec<OverSummary>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub run_rate: f64,
}

impl InningsProjection {
    /// Build from records in append order. Invalidated records are skipped.
    pub fn from_records(innings: InningsId, records: &[BallRecord]) -> Self {
        let mut overs: Vec<OverSummary> = Vec::new();
        let mut fall_of_wickets = Vec::new();
        let mut total_runs = 0;
        let mut wickets = 0;
        let mut legal_balls = 0;

        for record in records.iter().filter(|r| r.is_valid) {
            total_runs += record.total_runs();
            if record.is_legal() {
                legal_balls += 1;
            }

            if overs.last().map_or(true, |over| over.over_number != record.over_number) {
                overs.push(OverSummary::start(record));
            }
            if let Some(over) = overs.last_mut() {
                over.push(record);
            }

            if let Some(player) = record.dismissed_batsman() {
                wickets += 1;
                fall_of_wickets.push(FallOfWicket {
                    wicket_number: wickets,
                    score: total_runs,
                    player,
                    over: record.over_label(),
                });
            }
        }

        let in_progress = overs.last().is_some_and(|over| !over.is_complete());
        let current_over = if in_progress {
            overs.pop().map(|over| over.balls).unwrap_or_default()
        } else {
            Vec::new()
        };

        Self {
            innings,
            total_runs,
            wickets,
            legal_balls,
            current_over,
            previous_overs: overs,
            fall_of_wickets,
            run_rate: run_rate(total_runs, legal_balls),
        }
    }

    /// Overs bowled in cricket notation ("15.2").
    pub fn overs(&self) -> String {
        format!(
            "{}.{}",
            self.legal_balls / BALLS_PER_OVER,
            self.legal_balls % BALLS_PER_OVER
        )
    }

    /// Chase arithmetic against `target` (first-innings total + 1).
    pub fn chase(&self, target: u32, overs_limit: u32) -> ChaseState {
        let balls_remaining = (overs_limit * BALLS_PER_OVER).saturating_sub(self.legal_balls);
        let runs_needed = target.saturating_sub(self.total_runs);
        let required_run_rate = if balls_remaining > 0 {
            Some(runs_needed as f64 * BALLS_PER_OVER as f64 / balls_remaining as f64)
        } else {
            None
        };

        ChaseState {
            target,
            runs_needed,
            balls_remaining,
            required_run_rate,
        }
    }
}

/// Runs per six legal balls.
pub fn run_rate(runs: u32, legal_balls: u32) -> f64 {
    if legal_balls == 0 {
        0.0
    } else {
        runs as f64 * BALLS_PER_OVER as f64 / legal_balls as f64
    }
}

/// Deterministic projection builders.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    pub fn innings<R: LedgerReader>(
        reader: &R,
        innings: &InningsId,
    ) -> Result<InningsProjection, LedgerError> {
        let records = reader.read_all(innings)?;
        Ok(InningsProjection::from_records(*innings, &records))
    }
}
