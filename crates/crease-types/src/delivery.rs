use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::PlayerId;

/// Classification of a delivery as entered by the scorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BallType {
    Normal,
    Wide,
    NoBall,
    Bye,
    LegBye,
    Wicket,
}

impl BallType {
    /// Whether the delivery counts toward the six balls of an over.
    pub fn is_legal(self) -> bool {
        !matches!(self, Self::Wide | Self::NoBall)
    }

    /// Fixed penalty run added on top of `runs` (wides and no-balls).
    pub fn penalty(self) -> u32 {
        match self {
            Self::Wide | Self::NoBall => 1,
            _ => 0,
        }
    }

    /// Whether the striker is charged with a ball faced.
    pub fn is_faced(self) -> bool {
        !matches!(self, Self::Wide)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Wide => "wide",
            Self::NoBall => "noBall",
            Self::Bye => "bye",
            Self::LegBye => "legBye",
            Self::Wicket => "wicket",
        }
    }
}

impl fmt::Display for BallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BallType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "wide" => Ok(Self::Wide),
            "noBall" => Ok(Self::NoBall),
            "bye" => Ok(Self::Bye),
            "legBye" => Ok(Self::LegBye),
            "wicket" => Ok(Self::Wicket),
            other => Err(TypeError::UnknownVariant {
                kind: "ballType",
                value: other.to_string(),
            }),
        }
    }
}

/// Mode of dismissal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WicketType {
    Bowled,
    Caught,
    Lbw,
    Stumped,
    RunOut,
    HitWicket,
}

impl WicketType {
    /// Every dismissal except a run out is credited to the bowler.
    pub fn credits_bowler(self) -> bool {
        !matches!(self, Self::RunOut)
    }

    /// Dismissals that name a fielder on the scorecard.
    pub fn requires_fielder(self) -> bool {
        matches!(self, Self::Caught | Self::Stumped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bowled => "bowled",
            Self::Caught => "caught",
            Self::Lbw => "lbw",
            Self::Stumped => "stumped",
            Self::RunOut => "runOut",
            Self::HitWicket => "hitWicket",
        }
    }

    /// Scorecard abbreviation ("c", "st", "lbw", ...).
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Bowled => "b",
            Self::Caught => "c",
            Self::Lbw => "lbw",
            Self::Stumped => "st",
            Self::RunOut => "run out",
            Self::HitWicket => "hit wicket",
        }
    }
}

impl fmt::Display for WicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WicketType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bowled" => Ok(Self::Bowled),
            "caught" => Ok(Self::Caught),
            "lbw" => Ok(Self::Lbw),
            "stumped" => Ok(Self::Stumped),
            "runOut" => Ok(Self::RunOut),
            "hitWicket" => Ok(Self::HitWicket),
            other => Err(TypeError::UnknownVariant {
                kind: "wicketType",
                value: other.to_string(),
            }),
        }
    }
}

/// One bowled ball as reported by the scorer.
///
/// Over and ball numbers are never supplied by the caller; the engine assigns
/// them from the innings pointer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub runs: u32,
    pub ball_type: BallType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wicket_type: Option<WicketType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fielder_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_batsman_id: Option<PlayerId>,
    /// Batsman run out, when it is not the striker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissed_id: Option<PlayerId>,
}

impl Delivery {
    fn plain(ball_type: BallType, runs: u32) -> Self {
        Self {
            runs,
            ball_type,
            wicket_type: None,
            fielder_id: None,
            new_batsman_id: None,
            dismissed_id: None,
        }
    }

    pub fn normal(runs: u32) -> Self {
        Self::plain(BallType::Normal, runs)
    }

    pub fn wide(runs: u32) -> Self {
        Self::plain(BallType::Wide, runs)
    }

    pub fn no_ball(runs: u32) -> Self {
        Self::plain(BallType::NoBall, runs)
    }

    pub fn bye(runs: u32) -> Self {
        Self::plain(BallType::Bye, runs)
    }

    pub fn leg_bye(runs: u32) -> Self {
        Self::plain(BallType::LegBye, runs)
    }

    pub fn wicket(wicket_type: WicketType) -> Self {
        Self {
            wicket_type: Some(wicket_type),
            ..Self::plain(BallType::Wicket, 0)
        }
    }

    /// A run out after `runs` completed runs.
    pub fn run_out(runs: u32) -> Self {
        Self {
            runs,
            ..Self::wicket(WicketType::RunOut)
        }
    }

    pub fn with_fielder(mut self, fielder: PlayerId) -> Self {
        self.fielder_id = Some(fielder);
        self
    }

    pub fn with_new_batsman(mut self, batsman: PlayerId) -> Self {
        self.new_batsman_id = Some(batsman);
        self
    }

    pub fn with_dismissed(mut self, batsman: PlayerId) -> Self {
        self.dismissed_id = Some(batsman);
        self
    }

    pub fn is_legal(&self) -> bool {
        self.ball_type.is_legal()
    }

    /// Runs this delivery adds to the innings total.
    pub fn total_runs(&self) -> u32 {
        self.runs + self.ball_type.penalty()
    }

    /// Shape checks that need no innings context.
    pub fn validate(&self, max_runs: u32) -> Result<(), TypeError> {
        if self.runs > max_runs {
            return Err(TypeError::delivery(
                "runs",
                format!("{} exceeds the maximum of {max_runs}", self.runs),
            ));
        }

        match (self.ball_type, self.wicket_type) {
            (BallType::Wicket, None) => {
                return Err(TypeError::delivery(
                    "wicketType",
                    "required when ballType is wicket",
                ));
            }
            (BallType::Wicket, Some(kind)) => {
                if kind.requires_fielder() && self.fielder_id.is_none() {
                    return Err(TypeError::delivery(
                        "fielderId",
                        format!("required for a {kind} dismissal"),
                    ));
                }
                if kind != WicketType::RunOut {
                    if self.runs != 0 {
                        return Err(TypeError::delivery(
                            "runs",
                            format!("must be 0 for a {kind} dismissal"),
                        ));
                    }
                    if self.dismissed_id.is_some() {
                        return Err(TypeError::delivery(
                            "dismissedId",
                            "only allowed for run outs",
                        ));
                    }
                }
            }
            (_, Some(_)) => {
                return Err(TypeError::delivery(
                    "wicketType",
                    "only allowed when ballType is wicket",
                ));
            }
            (_, None) => {
                if self.new_batsman_id.is_some() {
                    return Err(TypeError::delivery(
                        "newBatsmanId",
                        "only allowed on a wicket delivery",
                    ));
                }
                if self.dismissed_id.is_some() {
                    return Err(TypeError::delivery(
                        "dismissedId",
                        "only allowed for run outs",
                    ));
                }
            }
        }

        Ok(())
    }
}
