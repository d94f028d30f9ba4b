use crease_ledger::BallRecord;
use crease_types::BALLS_PER_OVER;

use crate::effect::DeliveryEffect;
use crate::error::{EngineError, EngineResult};
use crate::innings::InningsAggregate;

/// Reverses the last valid delivery of an innings.
pub struct UndoEngine;

impl UndoEngine {
    /// Compute the innings as it was before `record`.
    ///
    /// `effect` must be the diff journaled when `record` was appended. The
    /// ball pointer is rolled back one legal ball (into the previous over
    /// when it would go negative) and must land on the record's own
    /// position.
    pub fn revert(
        innings: &InningsAggregate,
        record: &BallRecord,
        effect: &DeliveryEffect,
    ) -> EngineResult<InningsAggregate> {
        if record.innings != innings.id {
            return Err(EngineError::invariant(format!(
                "record {} belongs to innings {}",
                record.seq, record.innings
            )));
        }
        if effect.total_runs != record.total_runs() {
            return Err(EngineError::invariant(format!(
                "journal for ball {} disagrees with the ledger",
                record.seq
            )));
        }

        let (over, ball) = Self::rolled_back_pointer(innings, record)?;
        if (over, ball) != (record.over_number, record.ball_number)
            || (over, ball) != (effect.prior.over, effect.prior.ball)
        {
            return Err(EngineError::invariant(format!(
                "undo lands on {over}.{ball} but ball {} was bowled at {}.{}",
                record.seq, record.over_number, record.ball_number
            )));
        }

        let mut prev = innings.clone();
        prev.current_over = over;
        prev.current_ball = ball;
        prev.total_runs = take(innings.total_runs, effect.total_runs, "total runs")?;
        prev.extras = innings
            .extras
            .checked_sub(&effect.extras)
            .ok_or_else(|| EngineError::invariant("extras would go negative"))?;

        let delta = &effect.batsman;
        let line = prev.batting.get_mut(&delta.player).ok_or_else(|| {
            EngineError::invariant(format!("no batting line for {}", delta.player))
        })?;
        line.runs = take(line.runs, delta.runs, "batsman runs")?;
        line.balls = take(line.balls, delta.balls, "batsman balls")?;
        line.fours = take(line.fours, delta.fours, "fours")?;
        line.sixes = take(line.sixes, delta.sixes, "sixes")?;
        line.refresh();

        let delta = &effect.bowler;
        if delta.created {
            prev.bowling.remove(&delta.player);
        } else {
            let line = prev.bowling.get_mut(&delta.player).ok_or_else(|| {
                EngineError::invariant(format!("no bowling line for {}", delta.player))
            })?;
            line.balls = take(line.balls, delta.balls, "bowler balls")?;
            line.runs_conceded = take(line.runs_conceded, delta.runs_conceded, "runs conceded")?;
            line.wickets = take(line.wickets, delta.wickets, "bowler wickets")?;
            line.maidens = take(line.maidens, delta.maidens, "maidens")?;
            line.refresh();
        }

        if let Some(dismissal) = &effect.dismissal {
            prev.total_wickets = take(innings.total_wickets, 1, "wickets")?;
            let line = prev.batting.get_mut(&dismissal.player).ok_or_else(|| {
                EngineError::invariant(format!("no batting line for {}", dismissal.player))
            })?;
            line.is_out = false;
            line.dismissal_type = None;
            line.dismissed_by = None;
            line.fielder = None;
            if let (Some(incoming), true) = (dismissal.new_batsman, dismissal.new_line_created) {
                prev.batting.remove(&incoming);
            }
        }

        prev.striker = effect.prior.striker;
        prev.non_striker = effect.prior.non_striker;
        prev.current_bowler = effect.prior.bowler;
        prev.over_runs_conceded = effect.prior.over_runs_conceded;
        prev.is_completed = false;

        prev.reconcile()?;
        Ok(prev)
    }

    fn rolled_back_pointer(
        innings: &InningsAggregate,
        record: &BallRecord,
    ) -> EngineResult<(u32, u32)> {
        if !record.is_legal() {
            return Ok((innings.current_over, innings.current_ball));
        }
        match innings.current_ball.checked_sub(1) {
            Some(ball) => Ok((innings.current_over, ball)),
            None => innings
                .current_over
                .checked_sub(1)
                .map(|over| (over, BALLS_PER_OVER - 1))
                .ok_or_else(|| {
                    EngineError::invariant("ball pointer would roll back before the first over")
                }),
        }
    }
}

fn take(value: u32, delta: u32, what: &str) -> EngineResult<u32> {
    value
        .checked_sub(delta)
        .ok_or_else(|| EngineError::invariant(format!("{what} would go negative")))
}

#[cfg(test)]
mod tests {
    use crease_ledger::{InMemoryBallLedger, LedgerWriter};
    use crease_types::{Delivery, InningsId, MatchId, PlayerId, TeamId, WicketType};

    use crate::completion::CompletionContext;
    use crate::config::EngineConfig;
    use crate::innings::Openers;
    use crate::processor::BallProcessor;

    use super::*;

    const CONTEXT: CompletionContext = CompletionContext {
        overs_limit: 20,
        team_size: 11,
        target: None,
    };

    struct Harness {
        ledger: InMemoryBallLedger,
        processor: BallProcessor,
        innings: InningsAggregate,
        history: Vec<(InningsAggregate, BallRecord, DeliveryEffect)>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                ledger: InMemoryBallLedger::new(),
                processor: BallProcessor::new(&EngineConfig::default()),
                innings: InningsAggregate::open(
                    InningsId::new(),
                    MatchId::new(),
                    1,
                    TeamId::new(),
                    TeamId::new(),
                    Openers {
                        striker: PlayerId::new(),
                        non_striker: PlayerId::new(),
                        bowler: PlayerId::new(),
                    },
                ),
                history: Vec::new(),
            }
        }

        fn bowl(&mut self, delivery: Delivery) {
            let processed = self
                .processor
                .apply(&self.innings, &delivery, &CONTEXT)
                .unwrap();
            let record = self.ledger.append(&processed.draft).unwrap();
            let before = std::mem::replace(&mut self.innings, processed.innings);
            self.history.push((before, record, processed.effect));
        }

        /// Undo the last ball and check it restores the earlier state exactly.
        fn undo_and_compare(&mut self) {
            let (before, record, effect) = self.history.pop().unwrap();
            let reverted = UndoEngine::revert(&self.innings, &record, &effect).unwrap();
            assert_eq!(reverted, before);
            self.innings = reverted;
        }
    }

    #[test]
    fn undo_is_exact_for_every_ball_type() {
        let mut h = Harness::new();
        let incoming = PlayerId::new();
        let fielder = PlayerId::new();
        h.bowl(Delivery::normal(4));
        h.bowl(Delivery::wide(2));
        h.bowl(Delivery::no_ball(1));
        h.bowl(Delivery::bye(2));
        h.bowl(Delivery::leg_bye(1));
        h.bowl(
            Delivery::wicket(WicketType::Caught)
                .with_fielder(fielder)
                .with_new_batsman(incoming),
        );

        while !h.history.is_empty() {
            h.undo_and_compare();
        }
        assert_eq!(h.innings.total_runs, 0);
        assert!(h.innings.bowling.is_empty());
        assert_eq!(h.innings.batting.len(), 2);
    }

    #[test]
    fn undo_first_ball_of_over_rolls_back_into_previous_over() {
        let mut h = Harness::new();
        for _ in 0..6 {
            h.bowl(Delivery::normal(0));
        }
        assert_eq!((h.innings.current_over, h.innings.current_ball), (1, 0));
        assert_eq!(h.innings.bowling.iter().next().unwrap().maidens, 1);

        h.undo_and_compare();
        assert_eq!((h.innings.current_over, h.innings.current_ball), (0, 5));
        assert_eq!(h.innings.bowling.iter().next().unwrap().maidens, 0);
    }

    #[test]
    fn undo_wide_leaves_pointer() {
        let mut h = Harness::new();
        h.bowl(Delivery::normal(1));
        h.bowl(Delivery::wide(0));
        h.undo_and_compare();
        assert_eq!(h.innings.current_ball, 1);
        assert_eq!(h.innings.extras.wides, 0);
    }

    #[test]
    fn undo_reopens_completed_innings() {
        let mut h = Harness::new();
        for _ in 0..11 {
            h.bowl(Delivery::wicket(WicketType::Bowled).with_new_batsman(PlayerId::new()));
        }
        assert!(h.innings.is_completed);
        assert_eq!(
            h.history.last().unwrap().2.completion,
            Some(crate::completion::CompletionTrigger::AllOut)
        );

        h.undo_and_compare();
        assert!(!h.innings.is_completed);
        assert_eq!(h.innings.total_wickets, 10);
    }

    #[test]
    fn mismatched_journal_is_rejected() {
        let mut h = Harness::new();
        h.bowl(Delivery::normal(2));
        h.bowl(Delivery::normal(3));
        let (_, first_record, _) = h.history[0].clone();
        let (_, _, last_effect) = h.history[1].clone();

        let err = UndoEngine::revert(&h.innings, &first_record, &last_effect).unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation { .. }));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn arb_delivery() -> impl Strategy<Value = Delivery> {
            prop_oneof![
                (0u32..=6).prop_map(Delivery::normal),
                (0u32..=4).prop_map(Delivery::wide),
                (0u32..=6).prop_map(Delivery::no_ball),
                (0u32..=4).prop_map(Delivery::bye),
                (0u32..=4).prop_map(Delivery::leg_bye),
                Just(Delivery::wicket(WicketType::Bowled)),
                (0u32..=3).prop_map(Delivery::run_out),
            ]
        }

        proptest! {
            /// Undoing every ball in reverse walks back through each prior state.
            #[test]
            fn prop_undo_is_left_inverse(
                deliveries in proptest::collection::vec(arb_delivery(), 1..40)
            ) {
                let mut h = Harness::new();
                for delivery in deliveries {
                    if h.innings.is_completed {
                        break;
                    }
                    let delivery = match delivery.ball_type {
                        crease_types::BallType::Wicket => {
                            delivery.with_new_batsman(PlayerId::new())
                        }
                        _ => delivery,
                    };
                    h.bowl(delivery);
                }
                while !h.history.is_empty() {
                    h.undo_and_compare();
                }
                prop_assert_eq!(h.innings.total_runs, 0);
                prop_assert_eq!(h.innings.total_wickets, 0);
                prop_assert_eq!((h.innings.current_over, h.innings.current_ball), (0, 0));
            }
        }
    }
}
