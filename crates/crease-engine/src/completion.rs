use std::fmt;

use serde::Serialize;

use crate::innings::InningsAggregate;

/// Match facts the completion check needs beyond the innings itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionContext {
    pub overs_limit: u32,
    /// Roster size of the batting side.
    pub team_size: u32,
    /// Runs needed to win, set for the second innings only.
    pub target: Option<u32>,
}

/// Why an innings closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionTrigger {
    TargetReached,
    AllOut,
    OversExhausted,
}

impl fmt::Display for CompletionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TargetReached => "target reached",
            Self::AllOut => "all out",
            Self::OversExhausted => "overs exhausted",
        })
    }
}

pub struct CompletionEvaluator;

impl CompletionEvaluator {
    /// Check termination after a delivery has been applied.
    ///
    /// A reached target wins over the other triggers so a chase can end
    /// mid-over or on the ball that would also have closed the innings.
    pub fn evaluate(
        innings: &InningsAggregate,
        context: &CompletionContext,
    ) -> Option<CompletionTrigger> {
        if context
            .target
            .is_some_and(|target| innings.total_runs >= target)
        {
            return Some(CompletionTrigger::TargetReached);
        }
        // Every registered player must be dismissed; the last batsman may
        // bat unpartnered.
        if innings.total_wickets >= context.team_size {
            return Some(CompletionTrigger::AllOut);
        }
        if innings.current_over >= context.overs_limit {
            return Some(CompletionTrigger::OversExhausted);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crease_types::{InningsId, MatchId, PlayerId, TeamId};

    use crate::innings::Openers;

    use super::*;

    fn innings(runs: u32, wickets: u32, over: u32) -> InningsAggregate {
        let mut innings = InningsAggregate::open(
            InningsId::new(),
            MatchId::new(),
            2,
            TeamId::new(),
            TeamId::new(),
            Openers {
                striker: PlayerId::new(),
                non_striker: PlayerId::new(),
                bowler: PlayerId::new(),
            },
        );
        innings.total_runs = runs;
        innings.total_wickets = wickets;
        innings.current_over = over;
        innings
    }

    const CONTEXT: CompletionContext = CompletionContext {
        overs_limit: 20,
        team_size: 11,
        target: None,
    };

    #[test]
    fn live_innings_has_no_trigger() {
        assert_eq!(CompletionEvaluator::evaluate(&innings(80, 10, 19), &CONTEXT), None);
    }

    #[test]
    fn all_out_needs_every_player_dismissed() {
        assert_eq!(
            CompletionEvaluator::evaluate(&innings(80, 11, 12), &CONTEXT),
            Some(CompletionTrigger::AllOut)
        );
    }

    #[test]
    fn overs_exhausted() {
        assert_eq!(
            CompletionEvaluator::evaluate(&innings(80, 2, 20), &CONTEXT),
            Some(CompletionTrigger::OversExhausted)
        );
    }

    #[test]
    fn target_takes_precedence() {
        let chase = CompletionContext {
            target: Some(121),
            ..CONTEXT
        };
        assert_eq!(CompletionEvaluator::evaluate(&innings(120, 3, 15), &chase), None);
        assert_eq!(
            CompletionEvaluator::evaluate(&innings(121, 11, 20), &chase),
            Some(CompletionTrigger::TargetReached)
        );
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// All out exactly when every registered player is dismissed.
            #[test]
            fn prop_all_out_at_team_size(team_size in 2u32..=15, wickets in 0u32..=15) {
                let context = CompletionContext { overs_limit: 20, team_size, target: None };
                let trigger = CompletionEvaluator::evaluate(&innings(50, wickets, 5), &context);
                prop_assert_eq!(trigger == Some(CompletionTrigger::AllOut), wickets >= team_size);
            }
        }
    }
}
