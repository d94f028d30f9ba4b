use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crease_ledger::{
    BallRecord, ChaseState, InningsProjection, LedgerReader, LedgerWriter, ProjectionBuilder,
    StreamValidator,
};
use crease_types::{Delivery, InningsId, MatchId, PlayerId, TeamId, WicketType};

use crate::completion::{CompletionContext, CompletionTrigger};
use crate::config::EngineConfig;
use crate::effect::DeliveryEffect;
use crate::error::{EngineError, EngineResult};
use crate::innings::{InningsAggregate, Openers};
use crate::match_state::{MatchSetup, MatchState, MatchStatus, Toss};
use crate::processor::BallProcessor;
use crate::replay::{Replay, ReplayCheck};
use crate::result::ResultDeterminer;
use crate::roster::{InMemoryRoster, RosterProvider, TeamSnapshot};
use crate::undo::UndoEngine;

/// Result of a recorded delivery.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub record: BallRecord,
    pub innings: InningsAggregate,
    #[serde(rename = "match")]
    pub match_state: MatchState,
    pub completion: Option<CompletionTrigger>,
}

/// Result of undoing the last delivery.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoOutcome {
    /// The ledger record, now marked invalid.
    pub undone: BallRecord,
    pub innings: InningsAggregate,
    #[serde(rename = "match")]
    pub match_state: MatchState,
}

/// Display summary reconstructed from the ledger.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsSummary {
    pub innings: InningsId,
    pub number: u8,
    pub batting_team: String,
    pub score: String,
    pub overs: String,
    pub projection: InningsProjection,
    pub chase: Option<ChaseState>,
}

struct InningsSlot {
    aggregate: InningsAggregate,
    openers: Openers,
    /// Diffs of valid deliveries, keyed by ledger sequence.
    journal: HashMap<u64, DeliveryEffect>,
    /// Batsmen whose lines were opened by a replacement command rather
    /// than a delivery.
    substitutes: HashSet<PlayerId>,
}

struct MatchEntry {
    state: MatchState,
    innings: Vec<InningsSlot>,
}

/// Command surface of the engine.
///
/// Commands on one match are serialized by a per-match lock, so deliveries
/// and undos on the same innings never interleave. Different matches
/// proceed in parallel. Reads clone under the same lock and always observe
/// a committed state.
pub struct Scorer<R, L> {
    roster: R,
    ledger: L,
    config: EngineConfig,
    processor: BallProcessor,
    matches: RwLock<HashMap<MatchId, Arc<Mutex<MatchEntry>>>>,
    innings_index: RwLock<HashMap<InningsId, MatchId>>,
}

impl<R, L> Scorer<R, L>
where
    R: RosterProvider,
    L: LedgerReader + LedgerWriter,
{
    pub fn new(roster: R, ledger: L, config: EngineConfig) -> Self {
        Self {
            processor: BallProcessor::new(&config),
            roster,
            ledger,
            config,
            matches: RwLock::new(HashMap::new()),
            innings_index: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn roster(&self) -> &R {
        &self.roster
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    // ---- Match lifecycle ----

    pub fn register_match(&self, setup: MatchSetup) -> EngineResult<MatchState> {
        setup.validate()?;
        let id = MatchId::new();
        let state = MatchState::new(id, setup);

        write_lock(&self.matches)?.insert(
            id,
            Arc::new(Mutex::new(MatchEntry {
                state: state.clone(),
                innings: Vec::new(),
            })),
        );
        info!(match_id = %id, overs = setup.overs, "match registered");
        Ok(state)
    }

    /// Open the match's current innings with caller-selected openers.
    pub fn start_innings(&self, match_id: &MatchId, openers: Openers) -> EngineResult<InningsAggregate> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry)?;

        if entry.state.status == MatchStatus::Completed {
            return Err(EngineError::invalid_state("match is already completed"));
        }
        let number = entry.state.current_inning;
        if entry.innings.len() >= usize::from(number) {
            return Err(EngineError::invalid_state(format!(
                "innings {number} has already started"
            )));
        }

        let batting = entry.state.batting_team(number);
        let bowling = entry.state.bowling_team(number);
        if openers.striker == openers.non_striker {
            return Err(EngineError::validation(
                "nonStrikerId",
                "striker and non-striker must differ",
            ));
        }
        self.check_member(&batting, &openers.striker, "strikerId")?;
        self.check_member(&batting, &openers.non_striker, "nonStrikerId")?;
        self.check_member(&bowling, &openers.bowler, "bowlerId")?;

        let id = InningsId::new();
        let aggregate = InningsAggregate::open(id, *match_id, number, batting, bowling, openers);
        entry.innings.push(InningsSlot {
            aggregate: aggregate.clone(),
            openers,
            journal: HashMap::new(),
            substitutes: HashSet::new(),
        });
        entry.state.innings.push(id);
        entry.state.status = MatchStatus::Live;
        write_lock(&self.innings_index)?.insert(id, *match_id);

        info!(match_id = %match_id, innings = %id, number, "innings started");
        Ok(aggregate)
    }

    // ---- Deliveries ----

    pub fn record_delivery(
        &self,
        innings_id: &InningsId,
        delivery: &Delivery,
    ) -> EngineResult<DeliveryOutcome> {
        self.with_innings(innings_id, |entry, index| {
            let current = &entry.innings[index].aggregate;
            let number = current.number;
            if let Some(incoming) = delivery.new_batsman_id {
                self.check_member(&current.batting_team, &incoming, "newBatsmanId")?;
            }
            if let (Some(fielder), Some(true)) = (
                delivery.fielder_id,
                delivery.wicket_type.map(WicketType::requires_fielder),
            ) {
                self.check_member(&current.bowling_team, &fielder, "fielderId")?;
            }

            let context = self.completion_context(entry, number);
            let processed = self.processor.apply(current, delivery, &context)?;
            let record = self.ledger.append(&processed.draft)?;

            let completion = processed.effect.completion;
            let slot = &mut entry.innings[index];
            slot.aggregate = processed.innings;
            slot.journal.insert(record.seq, processed.effect);

            if let Some(trigger) = completion {
                self.close_innings(entry, number, trigger);
            }

            Ok(DeliveryOutcome {
                record,
                innings: entry.innings[index].aggregate.clone(),
                match_state: entry.state.clone(),
                completion,
            })
        })
    }

    /// Reverse the most recently appended valid delivery.
    pub fn undo_last_delivery(&self, innings_id: &InningsId) -> EngineResult<UndoOutcome> {
        self.with_innings(innings_id, |entry, index| {
            let slot = &entry.innings[index];
            let number = slot.aggregate.number;
            if usize::from(number) < entry.innings.len() {
                return Err(EngineError::invalid_state(format!(
                    "innings {number} is closed; the next innings has started"
                )));
            }

            let last = self
                .ledger
                .last_valid(innings_id)?
                .ok_or_else(|| EngineError::invalid_state("no deliveries to undo"))?;
            let Some(effect) = slot.journal.get(&last.seq) else {
                error!(innings = %innings_id, seq = last.seq, "no journal entry for last delivery");
                return Err(EngineError::invariant(format!(
                    "no undo journal entry for ball {}",
                    last.seq
                )));
            };
            let reverted = UndoEngine::revert(&slot.aggregate, &last, effect)?;
            let reopened = effect.completion.is_some();

            let undone = self.ledger.invalidate(innings_id, last.seq)?;
            let slot = &mut entry.innings[index];
            slot.aggregate = reverted;
            slot.journal.remove(&last.seq);
            // A replacement sent in for a dismissal that no longer stands.
            let aggregate = &mut slot.aggregate;
            slot.substitutes.retain(|player| !aggregate.drop_idle_line(player));

            if reopened {
                if number == 1 {
                    entry.state.current_inning = 1;
                } else {
                    entry.state.status = MatchStatus::Live;
                    entry.state.winner = None;
                    entry.state.result_text = None;
                }
                info!(innings = %innings_id, number, "innings reopened");
            }

            info!(
                innings = %innings_id,
                seq = last.seq,
                over = last.over_number,
                ball = last.ball_number,
                "delivery undone"
            );
            Ok(UndoOutcome {
                undone,
                innings: entry.innings[index].aggregate.clone(),
                match_state: entry.state.clone(),
            })
        })
    }

    // ---- Crease management ----

    pub fn swap_strike(&self, innings_id: &InningsId) -> EngineResult<InningsAggregate> {
        self.with_innings(innings_id, |entry, index| {
            let innings = &mut entry.innings[index].aggregate;
            innings.ensure_open()?;
            innings.swap_ends();
            debug!(innings = %innings_id, striker = %innings.striker, "strike swapped");
            Ok(innings.clone())
        })
    }

    pub fn set_current_bowler(
        &self,
        innings_id: &InningsId,
        bowler: PlayerId,
    ) -> EngineResult<InningsAggregate> {
        self.with_innings(innings_id, |entry, index| {
            let innings = &entry.innings[index].aggregate;
            innings.ensure_open()?;
            self.check_member(&innings.bowling_team, &bowler, "bowlerId")?;

            let innings = &mut entry.innings[index].aggregate;
            innings.current_bowler = bowler;
            info!(innings = %innings_id, bowler = %bowler, "bowler changed");
            Ok(innings.clone())
        })
    }

    /// Send in `batsman` for whichever crease player is out, striker first.
    /// With nobody out the striker is replaced as retired.
    pub fn replace_batsman(
        &self,
        innings_id: &InningsId,
        batsman: PlayerId,
    ) -> EngineResult<InningsAggregate> {
        self.with_innings(innings_id, |entry, index| {
            let innings = &entry.innings[index].aggregate;
            innings.ensure_open()?;
            self.check_member(&innings.batting_team, &batsman, "batsmanId")?;
            if innings.is_at_crease(&batsman) {
                return Err(EngineError::validation(
                    "batsmanId",
                    format!("{batsman} is already at the crease"),
                ));
            }
            if innings.has_been_dismissed(&batsman) {
                return Err(EngineError::validation(
                    "batsmanId",
                    format!("{batsman} has already been dismissed"),
                ));
            }

            let slot = &mut entry.innings[index];
            let innings = &mut slot.aggregate;
            let outgoing = if innings.has_been_dismissed(&innings.striker)
                || !innings.has_been_dismissed(&innings.non_striker)
            {
                &mut innings.striker
            } else {
                &mut innings.non_striker
            };
            let replaced = std::mem::replace(outgoing, batsman);
            if innings.ensure_batting_line(batsman) {
                slot.substitutes.insert(batsman);
            }

            info!(innings = %innings_id, incoming = %batsman, outgoing = %replaced, "batsman replaced");
            Ok(innings.clone())
        })
    }

    // ---- Queries ----

    pub fn innings(&self, innings_id: &InningsId) -> EngineResult<InningsAggregate> {
        self.with_innings(innings_id, |entry, index| {
            Ok(entry.innings[index].aggregate.clone())
        })
    }

    pub fn match_state(&self, match_id: &MatchId) -> EngineResult<MatchState> {
        let entry = self.entry(match_id)?;
        let entry = lock(&entry)?;
        Ok(entry.state.clone())
    }

    /// Every ledger record of the innings, invalidated ones included.
    pub fn ball_records(&self, innings_id: &InningsId) -> EngineResult<Vec<BallRecord>> {
        self.match_of(innings_id)?;
        Ok(self.ledger.read_all(innings_id)?)
    }

    pub fn summary(&self, innings_id: &InningsId) -> EngineResult<InningsSummary> {
        self.with_innings(innings_id, |entry, index| {
            let innings = &entry.innings[index].aggregate;
            let projection = ProjectionBuilder::innings(&self.ledger, innings_id)?;
            let chase = match (innings.number, entry.innings.first()) {
                (2, Some(first)) => {
                    Some(projection.chase(first.aggregate.total_runs + 1, entry.state.overs))
                }
                _ => None,
            };

            Ok(InningsSummary {
                innings: *innings_id,
                number: innings.number,
                batting_team: self.team_name(&innings.batting_team),
                score: format!("{}/{}", innings.total_runs, innings.total_wickets),
                overs: innings.overs().to_string(),
                projection,
                chase,
            })
        })
    }

    /// Rebuild the innings from its ledger and compare with live state.
    pub fn verify_replay(&self, innings_id: &InningsId) -> EngineResult<ReplayCheck> {
        self.with_innings(innings_id, |entry, index| {
            let slot = &entry.innings[index];
            let context = self.completion_context(entry, slot.aggregate.number);
            let records = self.ledger.read_all(innings_id)?;
            let rebuilt = Replay::rebuild(
                &slot.aggregate,
                slot.openers,
                &records,
                &self.processor,
                &context,
            )?;
            let report = StreamValidator::validate_stream(&self.ledger, innings_id)?;
            let differences = Replay::differences(&slot.aggregate, &rebuilt);

            if !differences.is_empty() || !report.is_valid() {
                warn!(
                    innings = %innings_id,
                    differences = differences.len(),
                    violations = report.violations.len(),
                    "replay check failed"
                );
            }
            Ok(ReplayCheck {
                converged: differences.is_empty(),
                chain_valid: report.is_valid(),
                differences,
            })
        })
    }

    // ---- Internals ----

    fn entry(&self, match_id: &MatchId) -> EngineResult<Arc<Mutex<MatchEntry>>> {
        read_lock(&self.matches)?
            .get(match_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("match", match_id))
    }

    fn match_of(&self, innings_id: &InningsId) -> EngineResult<MatchId> {
        read_lock(&self.innings_index)?
            .get(innings_id)
            .copied()
            .ok_or_else(|| EngineError::not_found("innings", innings_id))
    }

    /// Run `f` with the owning match locked and the innings' slot index.
    fn with_innings<T>(
        &self,
        innings_id: &InningsId,
        f: impl FnOnce(&mut MatchEntry, usize) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let entry = self.entry(&self.match_of(innings_id)?)?;
        let mut entry = lock(&entry)?;
        let index = entry
            .innings
            .iter()
            .position(|slot| slot.aggregate.id == *innings_id)
            .ok_or_else(|| EngineError::not_found("innings", innings_id))?;
        f(&mut entry, index)
    }

    fn team_size(&self, team: &TeamId) -> u32 {
        self.roster
            .team_size(team)
            .unwrap_or(self.config.default_team_size)
    }

    fn team_name(&self, team: &TeamId) -> String {
        self.roster
            .team_name(team)
            .unwrap_or_else(|| format!("Team {}", team.short_id()))
    }

    /// Membership is only enforced when the roster knows the team.
    fn check_member(&self, team: &TeamId, player: &PlayerId, field: &'static str) -> EngineResult<()> {
        if self.roster.team_size(team).is_some() && !self.roster.is_team_member(team, player) {
            return Err(EngineError::validation(
                field,
                format!("{player} is not a member of team {team}"),
            ));
        }
        Ok(())
    }

    fn completion_context(&self, entry: &MatchEntry, number: u8) -> CompletionContext {
        let target = match (number, entry.innings.first()) {
            (2, Some(first)) => Some(first.aggregate.total_runs + 1),
            _ => None,
        };
        CompletionContext {
            overs_limit: entry.state.overs,
            team_size: self.team_size(&entry.state.batting_team(number)),
            target,
        }
    }

    fn close_innings(&self, entry: &mut MatchEntry, number: u8, trigger: CompletionTrigger) {
        let match_id = entry.state.id;
        info!(match_id = %match_id, number, %trigger, "innings completed");

        if number == 1 {
            entry.state.current_inning = 2;
            return;
        }

        entry.state.status = MatchStatus::Completed;
        if let [first, second] = entry.innings.as_slice() {
            let determiner = ResultDeterminer {
                overs_limit: entry.state.overs,
                chasing_team_size: self.team_size(&second.aggregate.batting_team),
            };
            let result = determiner.determine(&first.aggregate, &second.aggregate, |team| {
                self.team_name(team)
            });
            info!(match_id = %match_id, result = %result.text, "match completed");
            entry.state.winner = result.winner;
            entry.state.result_text = Some(result.text);
        }
    }
}

impl<L> Scorer<Arc<InMemoryRoster>, L>
where
    L: LedgerReader + LedgerWriter,
{
    /// Record both team snapshots with the roster, then register the match.
    pub fn register_match_with_teams(
        &self,
        team_a: TeamSnapshot,
        team_b: TeamSnapshot,
        overs: u32,
        toss: Toss,
    ) -> EngineResult<MatchState> {
        let setup = MatchSetup {
            team_a: team_a.id,
            team_b: team_b.id,
            overs,
            toss,
        };
        setup.validate()?;
        for team in [&team_a, &team_b] {
            if team.players.len() < 2 {
                return Err(EngineError::validation(
                    "players",
                    format!("{} needs at least two players", team.name),
                ));
            }
        }

        self.roster.register(team_a)?;
        self.roster.register(team_b)?;
        self.register_match(setup)
    }
}

fn lock(entry: &Mutex<MatchEntry>) -> EngineResult<MutexGuard<'_, MatchEntry>> {
    entry
        .lock()
        .map_err(|_| EngineError::invariant("match lock poisoned"))
}

fn read_lock<T>(lock: &RwLock<T>) -> EngineResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| EngineError::invariant("scorer read lock poisoned"))
}

fn write_lock<T>(lock: &RwLock<T>) -> EngineResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| EngineError::invariant("scorer write lock poisoned"))
}
