use serde::Serialize;

use crease_types::PlayerId;

use crate::completion::CompletionTrigger;
use crate::innings::Extras;

/// Everything one delivery changed, recorded so undo can apply the exact
/// inverse instead of re-deriving it from the ball record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEffect {
    pub prior: PriorPointers,
    pub total_runs: u32,
    pub extras: Extras,
    pub batsman: BattingDelta,
    pub bowler: BowlingDelta,
    pub dismissal: Option<DismissalEffect>,
    pub over_completed: bool,
    pub completion: Option<CompletionTrigger>,
}

/// Pointer state just before the delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorPointers {
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
    pub over: u32,
    pub ball: u32,
    pub over_runs_conceded: u32,
}

/// Figures added to the striker's line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingDelta {
    pub player: PlayerId,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
}

/// Figures added to the bowler's line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingDelta {
    pub player: PlayerId,
    /// The line did not exist before this delivery.
    pub created: bool,
    pub balls: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissalEffect {
    pub player: PlayerId,
    pub new_batsman: Option<PlayerId>,
    pub new_line_created: bool,
}
