use serde::Serialize;

use crease_types::{TeamId, BALLS_PER_OVER};

use crate::innings::InningsAggregate;

/// How a match was won.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Margin {
    #[serde(rename_all = "camelCase")]
    Wickets {
        wickets: u32,
        balls_remaining: Option<u32>,
    },
    Runs { runs: u32 },
    Tie,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// `None` for a tie.
    pub winner: Option<TeamId>,
    pub margin: Margin,
    pub text: String,
}

/// Decides the result once the second innings has closed.
#[derive(Clone, Copy, Debug)]
pub struct ResultDeterminer {
    pub overs_limit: u32,
    /// Roster size of the chasing side.
    pub chasing_team_size: u32,
}

impl ResultDeterminer {
    pub fn determine(
        &self,
        first: &InningsAggregate,
        second: &InningsAggregate,
        team_name: impl Fn(&TeamId) -> String,
    ) -> MatchResult {
        if second.total_runs > first.total_runs {
            // Wickets in hand: the last batsman never has a partner to lose,
            // but a batter still at the crease is always one wicket.
            let wickets = if second.total_wickets < self.chasing_team_size {
                self.chasing_team_size
                    .saturating_sub(1)
                    .saturating_sub(second.total_wickets)
                    .max(1)
            } else {
                0
            };
            let balls_remaining = (self.overs_limit * BALLS_PER_OVER)
                .checked_sub(second.legal_balls())
                .filter(|balls| *balls > 0);

            let mut text = format!(
                "{} won by {wickets} {}",
                team_name(&second.batting_team),
                plural(wickets, "wicket")
            );
            if let Some(balls) = balls_remaining {
                text.push_str(&format!(" ({balls} {} remaining)", plural(balls, "ball")));
            }
            return MatchResult {
                winner: Some(second.batting_team),
                margin: Margin::Wickets {
                    wickets,
                    balls_remaining,
                },
                text,
            };
        }

        if first.total_runs > second.total_runs {
            let runs = first.total_runs - second.total_runs;
            return MatchResult {
                winner: Some(first.batting_team),
                margin: Margin::Runs { runs },
                text: format!(
                    "{} won by {runs} {}",
                    team_name(&first.batting_team),
                    plural(runs, "run")
                ),
            };
        }

        MatchResult {
            winner: None,
            margin: Margin::Tie,
            text: "Match tied".into(),
        }
    }
}

fn plural(count: u32, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}
