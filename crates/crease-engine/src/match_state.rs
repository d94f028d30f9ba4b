use serde::{Deserialize, Serialize};

use crease_types::{InningsId, MatchId, TeamId};

use crate::error::{EngineError, EngineResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    NotStarted,
    Live,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TossDecision {
    Bat,
    Bowl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toss {
    pub winner: TeamId,
    pub decision: TossDecision,
}

/// Fields owned by match setup; the engine never changes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSetup {
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub overs: u32,
    pub toss: Toss,
}

impl MatchSetup {
    pub fn validate(&self) -> EngineResult<()> {
        if self.overs == 0 {
            return Err(EngineError::validation("overs", "must be at least 1"));
        }
        if self.team_a == self.team_b {
            return Err(EngineError::validation("teamB", "must differ from teamA"));
        }
        if self.toss.winner != self.team_a && self.toss.winner != self.team_b {
            return Err(EngineError::validation(
                "toss",
                "winner must be one of the two teams",
            ));
        }
        Ok(())
    }
}

/// A match as seen by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub id: MatchId,
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub overs: u32,
    pub toss: Toss,
    /// 1 or 2.
    pub current_inning: u8,
    pub status: MatchStatus,
    pub winner: Option<TeamId>,
    pub result_text: Option<String>,
    /// Innings started so far, in order.
    pub innings: Vec<InningsId>,
}

impl MatchState {
    pub fn new(id: MatchId, setup: MatchSetup) -> Self {
        Self {
            id,
            team_a: setup.team_a,
            team_b: setup.team_b,
            overs: setup.overs,
            toss: setup.toss,
            current_inning: 1,
            status: MatchStatus::NotStarted,
            winner: None,
            result_text: None,
            innings: Vec::new(),
        }
    }

    /// The side batting in innings `number`, decided by the toss.
    pub fn batting_team(&self, number: u8) -> TeamId {
        let toss_loser = if self.toss.winner == self.team_a {
            self.team_b
        } else {
            self.team_a
        };
        let first = match self.toss.decision {
            TossDecision::Bat => self.toss.winner,
            TossDecision::Bowl => toss_loser,
        };
        if number == 1 {
            first
        } else {
            self.other_team(first)
        }
    }

    pub fn bowling_team(&self, number: u8) -> TeamId {
        self.other_team(self.batting_team(number))
    }

    fn other_team(&self, team: TeamId) -> TeamId {
        if team == self.team_a {
            self.team_b
        } else {
            self.team_a
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(decision: TossDecision) -> MatchSetup {
        let team_a = TeamId::new();
        MatchSetup {
            team_a,
            team_b: TeamId::new(),
            overs: 20,
            toss: Toss {
                winner: team_a,
                decision,
            },
        }
    }

    #[test]
    fn toss_decides_batting_order() {
        let bat = MatchState::new(MatchId::new(), setup(TossDecision::Bat));
        assert_eq!(bat.batting_team(1), bat.team_a);
        assert_eq!(bat.bowling_team(1), bat.team_b);
        assert_eq!(bat.batting_team(2), bat.team_b);

        let bowl = MatchState::new(MatchId::new(), setup(TossDecision::Bowl));
        assert_eq!(bowl.batting_team(1), bowl.team_b);
        assert_eq!(bowl.batting_team(2), bowl.team_a);
    }

    #[test]
    fn setup_validation() {
        let mut bad = setup(TossDecision::Bat);
        bad.overs = 0;
        assert_eq!(bad.validate().unwrap_err().field(), Some("overs"));

        let mut bad = setup(TossDecision::Bat);
        bad.toss.winner = TeamId::new();
        assert_eq!(bad.validate().unwrap_err().field(), Some("toss"));

        let mut bad = setup(TossDecision::Bat);
        bad.team_b = bad.team_a;
        assert_eq!(bad.validate().unwrap_err().field(), Some("teamB"));
    }

    #[test]
    fn status_uses_snake_case() {
        let json = serde_json::to_value(MatchStatus::NotStarted).unwrap();
        assert_eq!(json, "not_started");
    }

}
