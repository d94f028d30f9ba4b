use crease_ledger::BallDraft;
use crease_types::{BallType, Delivery, PlayerId, WicketType, BALLS_PER_OVER};
use tracing::{debug, error};

use crate::completion::{CompletionContext, CompletionEvaluator};
use crate::config::EngineConfig;
use crate::effect::{BattingDelta, BowlingDelta, DeliveryEffect, PriorPointers};
use crate::error::{EngineError, EngineResult};
use crate::innings::{Extras, InningsAggregate};
use crate::lines::BowlingLine;
use crate::wicket;

/// Output of one delivery: the next aggregate, the ledger draft, and the
/// diff needed to undo it.
#[derive(Clone, Debug)]
pub struct ProcessedBall {
    pub innings: InningsAggregate,
    pub draft: BallDraft,
    pub effect: DeliveryEffect,
}

/// Applies the scoring rules to an innings without mutating it.
#[derive(Clone, Debug)]
pub struct BallProcessor {
    max_runs: u32,
}

impl BallProcessor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_runs: config.max_runs_per_delivery,
        }
    }

    /// Compute the innings after `delivery`.
    ///
    /// The ball is numbered from the pointer before any increment. Errors
    /// leave `innings` untouched.
    pub fn apply(
        &self,
        innings: &InningsAggregate,
        delivery: &Delivery,
        context: &CompletionContext,
    ) -> EngineResult<ProcessedBall> {
        innings.ensure_open()?;
        delivery.validate(self.max_runs)?;

        if innings.has_been_dismissed(&innings.striker) {
            return Err(EngineError::invalid_state(format!(
                "striker {} is out; replace the batsman or swap strike",
                innings.striker
            )));
        }

        let dismissed = match delivery.ball_type {
            BallType::Wicket => Some(self.check_dismissal(innings, delivery)?),
            _ => None,
        };
        // validate() guarantees a wicket type on wicket balls.
        let wicket_type = delivery.wicket_type.filter(|_| dismissed.is_some());

        let prior = PriorPointers {
            striker: innings.striker,
            non_striker: innings.non_striker,
            bowler: innings.current_bowler,
            over: innings.current_over,
            ball: innings.current_ball,
            over_runs_conceded: innings.over_runs_conceded,
        };
        let mut next = innings.clone();

        let rules = RuleOutcome::for_delivery(delivery);
        next.total_runs += delivery.total_runs();
        next.extras.add(&rules.extras);

        let batsman = BattingDelta {
            player: prior.striker,
            runs: rules.batsman_runs,
            balls: u32::from(delivery.ball_type.is_faced()),
            fours: u32::from(rules.boundary == Some(4)),
            sixes: u32::from(rules.boundary == Some(6)),
        };
        let line = next.batting.get_mut(&prior.striker).ok_or_else(|| {
            EngineError::invariant(format!("no batting line for striker {}", prior.striker))
        })?;
        line.runs += batsman.runs;
        line.balls += batsman.balls;
        line.fours += batsman.fours;
        line.sixes += batsman.sixes;
        line.refresh();

        let (bowling, created) = next
            .bowling
            .get_or_insert_with(prior.bowler, || BowlingLine::new(prior.bowler));
        let mut bowler = BowlingDelta {
            player: prior.bowler,
            created,
            balls: u32::from(delivery.is_legal()),
            runs_conceded: rules.conceded,
            wickets: u32::from(wicket_type.is_some_and(WicketType::credits_bowler)),
            maidens: 0,
        };
        bowling.balls += bowler.balls;
        bowling.runs_conceded += bowler.runs_conceded;
        bowling.wickets += bowler.wickets;
        bowling.refresh();
        next.over_runs_conceded += rules.conceded;

        if let (Some(kind), Some(player)) = (wicket_type, dismissed) {
            wicket::dismiss(&mut next, delivery, kind, player)?;
        }

        if rules.rotates {
            next.swap_ends();
        }

        let dismissal = dismissed.map(|player| wicket::replace(&mut next, player, delivery.new_batsman_id));

        let mut over_completed = false;
        if delivery.is_legal() {
            next.current_ball += 1;
            if next.current_ball == BALLS_PER_OVER {
                over_completed = true;
                next.current_ball = 0;
                next.current_over += 1;
                next.swap_ends();
                if next.over_runs_conceded == 0 {
                    bowler.maidens = 1;
                    if let Some(line) = next.bowling.get_mut(&prior.bowler) {
                        line.maidens += 1;
                    }
                }
                next.over_runs_conceded = 0;
            }
        }

        if let Err(err) = next.reconcile() {
            error!(innings = %innings.id, error = %err, "innings failed reconciliation");
            return Err(err);
        }

        let completion = CompletionEvaluator::evaluate(&next, context);
        if completion.is_some() {
            next.is_completed = true;
        }

        let draft = BallDraft {
            innings: innings.id,
            over_number: prior.over,
            ball_number: prior.ball,
            striker: prior.striker,
            non_striker: prior.non_striker,
            bowler: prior.bowler,
            runs: delivery.runs,
            ball_type: delivery.ball_type,
            wicket_type,
            dismissed,
            fielder: delivery
                .fielder_id
                .filter(|_| wicket_type.is_some_and(WicketType::requires_fielder)),
            new_batsman: delivery.new_batsman_id.filter(|_| dismissed.is_some()),
        };

        debug!(
            innings = %innings.id,
            over = prior.over,
            ball = prior.ball,
            ball_type = %delivery.ball_type,
            runs = delivery.runs,
            total = next.total_runs,
            wickets = next.total_wickets,
            "delivery processed"
        );

        Ok(ProcessedBall {
            innings: next,
            draft,
            effect: DeliveryEffect {
                prior,
                total_runs: delivery.total_runs(),
                extras: rules.extras,
                batsman,
                bowler,
                dismissal,
                over_completed,
                completion,
            },
        })
    }

    /// Resolve who is out and check the incoming batsman against the crease.
    fn check_dismissal(&self, innings: &InningsAggregate, delivery: &Delivery) -> EngineResult<PlayerId> {
        let dismissed = delivery.dismissed_id.unwrap_or(innings.striker);
        if !innings.is_at_crease(&dismissed) {
            return Err(EngineError::validation(
                "dismissedId",
                format!("{dismissed} is not at the crease"),
            ));
        }
        if innings.has_been_dismissed(&dismissed) {
            return Err(EngineError::validation(
                "dismissedId",
                format!("{dismissed} is already out"),
            ));
        }

        if let Some(incoming) = delivery.new_batsman_id {
            if innings.is_at_crease(&incoming) {
                return Err(EngineError::validation(
                    "newBatsmanId",
                    format!("{incoming} is already at the crease"),
                ));
            }
            if innings.has_been_dismissed(&incoming) {
                return Err(EngineError::validation(
                    "newBatsmanId",
                    format!("{incoming} has already been dismissed"),
                ));
            }
        }
        Ok(dismissed)
    }
}

/// Run attribution for one delivery.
struct RuleOutcome {
    batsman_runs: u32,
    conceded: u32,
    extras: Extras,
    boundary: Option<u32>,
    rotates: bool,
}

impl RuleOutcome {
    fn for_delivery(delivery: &Delivery) -> Self {
        let runs = delivery.runs;
        let odd = runs % 2 == 1;
        let mut extras = Extras::default();

        let (batsman_runs, conceded, rotates) = match delivery.ball_type {
            BallType::Normal => (runs, runs, odd),
            BallType::Wide => {
                extras.wides = 1;
                extras.wide_runs = 1 + runs;
                (0, 1 + runs, false)
            }
            BallType::NoBall => {
                extras.no_balls = 1;
                (runs, 1 + runs, odd)
            }
            BallType::Bye => {
                extras.byes = runs;
                (0, 0, odd)
            }
            BallType::LegBye => {
                extras.leg_byes = runs;
                (0, 0, odd)
            }
            // Non-run-out wickets carry zero runs, so only run-outs rotate.
            BallType::Wicket => (runs, runs, odd),
        };

        let boundary = match (delivery.ball_type, runs) {
            (BallType::Normal, 4 | 6) => Some(runs),
            _ => None,
        };

        Self {
            batsman_runs,
            conceded,
            extras,
            boundary,
            rotates,
        }
    }
}
