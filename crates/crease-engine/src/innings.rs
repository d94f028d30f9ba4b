use serde::Serialize;

use crease_types::{InningsId, MatchId, PlayerId, TeamId, BALLS_PER_OVER};

use crate::error::{EngineError, EngineResult};
use crate::lines::{BattingLine, BowlingLine, LineBook, Overs};

/// Runs not credited to a batsman.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extras {
    /// Number of wides bowled.
    pub wides: u32,
    /// Runs from wides, including runs taken off them.
    pub wide_runs: u32,
    /// Number of no-balls; each carries one penalty run.
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
}

impl Extras {
    pub fn total(&self) -> u32 {
        self.wide_runs + self.no_balls + self.byes + self.leg_byes
    }

    pub(crate) fn add(&mut self, delta: &Extras) {
        self.wides += delta.wides;
        self.wide_runs += delta.wide_runs;
        self.no_balls += delta.no_balls;
        self.byes += delta.byes;
        self.leg_byes += delta.leg_byes;
    }

    pub(crate) fn checked_sub(&self, delta: &Extras) -> Option<Extras> {
        Some(Extras {
            wides: self.wides.checked_sub(delta.wides)?,
            wide_runs: self.wide_runs.checked_sub(delta.wide_runs)?,
            no_balls: self.no_balls.checked_sub(delta.no_balls)?,
            byes: self.byes.checked_sub(delta.byes)?,
            leg_byes: self.leg_byes.checked_sub(delta.leg_byes)?,
        })
    }
}

/// Opening selections supplied by the caller when an innings starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Openers {
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
}

/// Mutable summary of an innings ledger prefix.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsAggregate {
    pub id: InningsId,
    pub match_id: MatchId,
    /// 1 or 2.
    pub number: u8,
    pub batting_team: TeamId,
    pub bowling_team: TeamId,
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub current_bowler: PlayerId,
    pub total_runs: u32,
    pub total_wickets: u32,
    pub current_over: u32,
    /// Legal balls bowled in the current over, always below six.
    pub current_ball: u32,
    pub extras: Extras,
    pub batting: LineBook<BattingLine>,
    pub bowling: LineBook<BowlingLine>,
    /// Runs charged to the bowler so far in the current over.
    pub over_runs_conceded: u32,
    pub is_completed: bool,
}

impl InningsAggregate {
    /// A fresh innings with zeroed lines for both openers.
    pub fn open(
        id: InningsId,
        match_id: MatchId,
        number: u8,
        batting_team: TeamId,
        bowling_team: TeamId,
        openers: Openers,
    ) -> Self {
        let mut innings = Self {
            id,
            match_id,
            number,
            batting_team,
            bowling_team,
            striker: openers.striker,
            non_striker: openers.non_striker,
            current_bowler: openers.bowler,
            total_runs: 0,
            total_wickets: 0,
            current_over: 0,
            current_ball: 0,
            extras: Extras::default(),
            batting: LineBook::default(),
            bowling: LineBook::default(),
            over_runs_conceded: 0,
            is_completed: false,
        };
        innings.ensure_batting_line(openers.striker);
        innings.ensure_batting_line(openers.non_striker);
        innings
    }

    /// Create a zeroed batting line unless one exists. Returns whether it was created.
    pub(crate) fn ensure_batting_line(&mut self, player: PlayerId) -> bool {
        self.batting
            .get_or_insert_with(player, || BattingLine::new(player))
            .1
    }

    /// Remove a line that has not faced a ball and is off the field.
    /// Returns whether the line was removed.
    pub(crate) fn drop_idle_line(&mut self, player: &PlayerId) -> bool {
        if self.is_at_crease(player)
            || !self.batting.get(player).is_some_and(BattingLine::is_untouched)
        {
            return false;
        }
        self.batting.remove(player).is_some()
    }

    pub(crate) fn swap_ends(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    pub fn is_at_crease(&self, player: &PlayerId) -> bool {
        self.striker == *player || self.non_striker == *player
    }

    pub fn has_been_dismissed(&self, player: &PlayerId) -> bool {
        self.batting.get(player).is_some_and(|line| line.is_out)
    }

    /// Legal balls bowled in the innings.
    pub fn legal_balls(&self) -> u32 {
        self.current_over * BALLS_PER_OVER + self.current_ball
    }

    pub fn overs(&self) -> Overs {
        Overs::from_balls(self.legal_balls())
    }

    pub fn run_rate(&self) -> f64 {
        crease_ledger::projection::run_rate(self.total_runs, self.legal_balls())
    }

    pub(crate) fn ensure_open(&self) -> EngineResult<()> {
        if self.is_completed {
            return Err(EngineError::invalid_state(format!(
                "innings {} is already complete",
                self.number
            )));
        }
        Ok(())
    }

    /// Batting runs plus extras must equal the total; the ball pointer
    /// must stay inside the over.
    pub(crate) fn reconcile(&self) -> EngineResult<()> {
        let batting: u32 = self.batting.iter().map(|line| line.runs).sum();
        if batting + self.extras.total() != self.total_runs {
            return Err(EngineError::invariant(format!(
                "batting runs {batting} + extras {} != total {}",
                self.extras.total(),
                self.total_runs
            )));
        }

        let wickets = self.batting.iter().filter(|line| line.is_out).count() as u32;
        if wickets != self.total_wickets {
            return Err(EngineError::invariant(format!(
                "{wickets} dismissed batsmen but {} wickets recorded",
                self.total_wickets
            )));
        }

        if self.current_ball >= BALLS_PER_OVER {
            return Err(EngineError::invariant(format!(
                "ball pointer {} outside the over",
                self.current_ball
            )));
        }
        Ok(())
    }
}
