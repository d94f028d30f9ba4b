use serde::Serialize;

use crease_ledger::BallRecord;

use crate::completion::CompletionContext;
use crate::error::EngineResult;
use crate::innings::{InningsAggregate, Openers};
use crate::lines::{BowlingLine, LineBook};
use crate::processor::BallProcessor;

/// Rebuilds an innings from its ledger alone.
pub struct Replay;

/// Outcome of comparing a live innings with its replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayCheck {
    pub converged: bool,
    pub chain_valid: bool,
    pub differences: Vec<String>,
}

impl Replay {
    /// Process every valid record in append order on top of a freshly
    /// opened innings.
    ///
    /// Crease pointers are taken from each record before it is applied, so
    /// manual strike swaps and bowler changes between balls replay as they
    /// happened.
    pub fn rebuild(
        template: &InningsAggregate,
        openers: Openers,
        records: &[BallRecord],
        processor: &BallProcessor,
        context: &CompletionContext,
    ) -> EngineResult<InningsAggregate> {
        let mut innings = InningsAggregate::open(
            template.id,
            template.match_id,
            template.number,
            template.batting_team,
            template.bowling_team,
            openers,
        );

        for record in records.iter().filter(|r| r.is_valid) {
            innings.striker = record.striker;
            innings.non_striker = record.non_striker;
            innings.current_bowler = record.bowler;
            innings.ensure_batting_line(record.striker);
            innings.ensure_batting_line(record.non_striker);

            innings = processor
                .apply(&innings, &record.to_delivery(), context)?
                .innings;
        }
        Ok(innings)
    }

    /// Differences between a live aggregate and its replay.
    ///
    /// Crease pointers are not compared: they can move between balls
    /// without a ledger record. Live batting lines nobody has faced a ball
    /// on yet are ignored for the same reason.
    pub fn differences(live: &InningsAggregate, rebuilt: &InningsAggregate) -> Vec<String> {
        let mut differences = Vec::new();
        let mut compare = |what: &str, live: String, rebuilt: String| {
            if live != rebuilt {
                differences.push(format!("{what}: live {live}, replay {rebuilt}"));
            }
        };

        compare("total runs", live.total_runs.to_string(), rebuilt.total_runs.to_string());
        compare(
            "wickets",
            live.total_wickets.to_string(),
            rebuilt.total_wickets.to_string(),
        );
        compare("overs", live.overs().to_string(), rebuilt.overs().to_string());
        compare("extras", format!("{:?}", live.extras), format!("{:?}", rebuilt.extras));
        compare(
            "completed",
            live.is_completed.to_string(),
            rebuilt.is_completed.to_string(),
        );

        for line in live.batting.iter().filter(|line| !line.is_untouched()) {
            compare(
                "batting line",
                format!("{line:?}"),
                format!("{:?}", rebuilt.batting.get(&line.player_id)),
            );
        }
        for line in rebuilt.batting.iter().filter(|line| !line.is_untouched()) {
            if !live.batting.contains(&line.player_id) {
                compare("batting line", "missing".into(), format!("{line:?}"));
            }
        }
        compare_bowling(&live.bowling, &rebuilt.bowling, &mut compare);

        differences
    }

    pub fn converges(live: &InningsAggregate, rebuilt: &InningsAggregate) -> bool {
        Self::differences(live, rebuilt).is_empty()
    }
}

fn compare_bowling(
    live: &LineBook<BowlingLine>,
    rebuilt: &LineBook<BowlingLine>,
    compare: &mut impl FnMut(&str, String, String),
) {
    if live.len() != rebuilt.len() {
        compare(
            "bowlers used",
            live.len().to_string(),
            rebuilt.len().to_string(),
        );
    }
    for line in live.iter() {
        compare(
            "bowling line",
            format!("{line:?}"),
            format!("{:?}", rebuilt.get(&line.player_id)),
        );
    }
}

#[cfg(test)]
mod tests {
    use crease_ledger::{InMemoryBallLedger, LedgerReader, LedgerWriter};
    use crease_types::{Delivery, InningsId, MatchId, PlayerId, TeamId, WicketType};

    use crate::config::EngineConfig;

    use super::*;

    const CONTEXT: CompletionContext = CompletionContext {
        overs_limit: 20,
        team_size: 11,
        target: None,
    };

    #[test]
    fn replay_matches_live_scoring() {
        let ledger = InMemoryBallLedger::new();
        let processor = BallProcessor::new(&EngineConfig::default());
        let openers = Openers {
            striker: PlayerId::new(),
            non_striker: PlayerId::new(),
            bowler: PlayerId::new(),
        };
        let mut live = InningsAggregate::open(
            InningsId::new(),
            MatchId::new(),
            1,
            TeamId::new(),
            TeamId::new(),
            openers,
        );

        let deliveries = [
            Delivery::normal(1),
            Delivery::wide(0),
            Delivery::normal(4),
            Delivery::wicket(WicketType::Bowled).with_new_batsman(PlayerId::new()),
            Delivery::no_ball(2),
            Delivery::leg_bye(1),
            Delivery::normal(6),
            Delivery::bye(0),
        ];
        for (index, delivery) in deliveries.iter().enumerate() {
            if index == 6 {
                // Bowler change that never reaches the ledger.
                live.current_bowler = PlayerId::new();
            }
            let processed = processor.apply(&live, delivery, &CONTEXT).unwrap();
            ledger.append(&processed.draft).unwrap();
            live = processed.innings;
        }

        let records = ledger.read_all(&live.id).unwrap();
        let rebuilt = Replay::rebuild(&live, openers, &records, &processor, &CONTEXT).unwrap();
        assert_eq!(Replay::differences(&live, &rebuilt), Vec::<String>::new());
        assert!(Replay::converges(&live, &rebuilt));
    }

    #[test]
    fn divergence_is_reported() {
        let processor = BallProcessor::new(&EngineConfig::default());
        let openers = Openers {
            striker: PlayerId::new(),
            non_striker: PlayerId::new(),
            bowler: PlayerId::new(),
        };
        let live = InningsAggregate::open(
            InningsId::new(),
            MatchId::new(),
            1,
            TeamId::new(),
            TeamId::new(),
            openers,
        );
        let scored = processor
            .apply(&live, &Delivery::normal(2), &CONTEXT)
            .unwrap()
            .innings;

        let rebuilt = Replay::rebuild(&live, openers, &[], &processor, &CONTEXT).unwrap();
        let differences = Replay::differences(&scored, &rebuilt);
        assert!(differences.iter().any(|d| d.starts_with("total runs")));
        assert!(!Replay::converges(&scored, &rebuilt));
    }
}
