//! JSON match scripts: two named teams, a toss, and per-innings events.
//!
//! ```json
//! {
//!   "overs": 20,
//!   "teams": [
//!     { "name": "Lions", "players": ["Asha", "Ben", "Cal"] },
//!     { "name": "Tigers", "players": ["Dev", "Eli", "Fay"] }
//!   ],
//!   "toss": { "winner": "Lions", "decision": "bat" },
//!   "innings": [
//!     {
//!       "striker": "Asha", "nonStriker": "Ben", "bowler": "Fay",
//!       "events": [
//!         { "ball": { "runs": 4 } },
//!         { "ball": { "ballType": "wicket", "wicketType": "caught", "fielder": "Dev", "newBatsman": "Cal" } },
//!         { "bowler": "Eli" },
//!         "swap",
//!         "undo"
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};

use crease_engine::{
    EngineConfig, InMemoryRoster, InningsAggregate, InningsSummary, MatchState, Openers,
    ReplayCheck, Scorer, TeamSnapshot, Toss, TossDecision,
};
use crease_ledger::InMemoryBallLedger;
use crease_types::{BallType, Delivery, InningsId, PlayerId, TeamId, WicketType};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScript {
    pub overs: u32,
    pub teams: [TeamScript; 2],
    pub toss: TossScript,
    #[serde(default)]
    pub innings: Vec<InningsScript>,
}

#[derive(Debug, Deserialize)]
pub struct TeamScript {
    pub name: String,
    pub players: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TossScript {
    pub winner: String,
    pub decision: TossDecision,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsScript {
    pub striker: String,
    pub non_striker: String,
    pub bowler: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Event {
    Ball(BallScript),
    Bowler(String),
    Batsman(String),
    Swap,
    Undo,
}

/// A delivery with players named instead of identified.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallScript {
    #[serde(default)]
    pub runs: u32,
    #[serde(default = "normal_ball")]
    pub ball_type: BallType,
    #[serde(default)]
    pub wicket_type: Option<WicketType>,
    #[serde(default)]
    pub fielder: Option<String>,
    #[serde(default)]
    pub new_batsman: Option<String>,
    #[serde(default)]
    pub dismissed: Option<String>,
}

fn normal_ball() -> BallType {
    BallType::Normal
}

/// Everything the scorecard printer needs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    #[serde(rename = "match")]
    pub state: MatchState,
    pub innings: Vec<InningsAggregate>,
    pub summaries: Vec<InningsSummary>,
    pub replay: Vec<ReplayCheck>,
    #[serde(skip)]
    pub players: HashMap<PlayerId, String>,
    #[serde(skip)]
    pub teams: HashMap<TeamId, String>,
}

impl MatchReport {
    pub fn player(&self, id: &PlayerId) -> &str {
        self.players.get(id).map(String::as_str).unwrap_or("?")
    }

    pub fn team(&self, id: &TeamId) -> &str {
        self.teams.get(id).map(String::as_str).unwrap_or("?")
    }
}

/// Player name lookup; names must be unique across both teams.
#[derive(Default)]
struct Names {
    ids: HashMap<String, PlayerId>,
}

impl Names {
    fn id(&self, name: &str) -> anyhow::Result<PlayerId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown player {name:?}"))
    }

    fn optional(&self, name: Option<&String>) -> anyhow::Result<Option<PlayerId>> {
        name.map(|n| self.id(n)).transpose()
    }
}

impl MatchScript {
    pub fn from_json(input: &str) -> anyhow::Result<Self> {
        serde_json::from_str(input).context("invalid match script")
    }

    /// Score the script on a fresh in-memory engine.
    pub fn run(&self, config: EngineConfig) -> anyhow::Result<MatchReport> {
        let mut names = Names::default();
        let mut players = HashMap::new();
        let mut teams = HashMap::new();
        let mut snapshots = Vec::with_capacity(2);

        for team in &self.teams {
            let snapshot = TeamSnapshot::generated(team.name.clone(), team.players.len());
            for (name, id) in team.players.iter().zip(&snapshot.players) {
                if names.ids.insert(name.clone(), *id).is_some() {
                    bail!("player name {name:?} appears more than once");
                }
                players.insert(*id, name.clone());
            }
            teams.insert(snapshot.id, team.name.clone());
            snapshots.push(snapshot);
        }

        let toss_winner = teams
            .iter()
            .find(|(_, name)| **name == self.toss.winner)
            .map(|(id, _)| *id)
            .ok_or_else(|| anyhow!("toss winner {:?} is not a team", self.toss.winner))?;

        let scorer = Scorer::new(
            Arc::new(InMemoryRoster::new()),
            InMemoryBallLedger::new(),
            config,
        );
        let team_b = snapshots.pop().ok_or_else(|| anyhow!("missing second team"))?;
        let team_a = snapshots.pop().ok_or_else(|| anyhow!("missing first team"))?;
        let registered = scorer.register_match_with_teams(
            team_a,
            team_b,
            self.overs,
            Toss {
                winner: toss_winner,
                decision: self.toss.decision,
            },
        )?;
        tracing::info!(match_id = %registered.id, overs = self.overs, "scoring script");

        for (number, innings) in self.innings.iter().enumerate() {
            let number = number + 1;
            let openers = Openers {
                striker: names.id(&innings.striker)?,
                non_striker: names.id(&innings.non_striker)?,
                bowler: names.id(&innings.bowler)?,
            };
            let started = scorer
                .start_innings(&registered.id, openers)
                .with_context(|| format!("innings {number} could not start"))?;

            for (index, event) in innings.events.iter().enumerate() {
                apply_event(&scorer, &names, &started.id, event)
                    .with_context(|| format!("innings {number}, event {}", index + 1))?;
            }
        }

        let state = scorer.match_state(&registered.id)?;
        let mut report = MatchReport {
            state,
            innings: Vec::new(),
            summaries: Vec::new(),
            replay: Vec::new(),
            players,
            teams,
        };
        for id in report.state.innings.clone() {
            report.innings.push(scorer.innings(&id)?);
            report.summaries.push(scorer.summary(&id)?);
            report.replay.push(scorer.verify_replay(&id)?);
        }
        Ok(report)
    }
}

fn apply_event<L>(
    scorer: &Scorer<Arc<InMemoryRoster>, L>,
    names: &Names,
    innings: &InningsId,
    event: &Event,
) -> anyhow::Result<()>
where
    L: crease_ledger::LedgerReader + crease_ledger::LedgerWriter,
{
    match event {
        Event::Ball(ball) => {
            let delivery = Delivery {
                runs: ball.runs,
                ball_type: ball.ball_type,
                wicket_type: ball.wicket_type,
                fielder_id: names.optional(ball.fielder.as_ref())?,
                new_batsman_id: names.optional(ball.new_batsman.as_ref())?,
                dismissed_id: names.optional(ball.dismissed.as_ref())?,
            };
            scorer.record_delivery(innings, &delivery)?;
        }
        Event::Bowler(name) => {
            scorer.set_current_bowler(innings, names.id(name)?)?;
        }
        Event::Batsman(name) => {
            scorer.replace_batsman(innings, names.id(name)?)?;
        }
        Event::Swap => {
            scorer.swap_strike(innings)?;
        }
        Event::Undo => {
            scorer.undo_last_delivery(innings)?;
        }
    }
    Ok(())
}
