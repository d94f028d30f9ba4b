use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crease_types::{BallType, Delivery, InningsId, PlayerId, WicketType};

use crate::error::LedgerError;

/// Delivery facts produced by the ball processor, before the ledger assigns
/// sequence, timestamp, and hash link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallDraft {
    pub innings: InningsId,
    pub over_number: u32,
    pub ball_number: u32,
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
    pub runs: u32,
    pub ball_type: BallType,
    pub wicket_type: Option<WicketType>,
    pub dismissed: Option<PlayerId>,
    pub fielder: Option<PlayerId>,
    pub new_batsman: Option<PlayerId>,
}

/// Immutable fact persisted per delivery.
///
/// Only `is_valid` ever changes after append, and it is excluded from the
/// record hash so the chain survives undo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallRecord {
    /// Monotonic position in the innings ledger, starting at 1.
    pub seq: u64,
    pub innings: InningsId,
    pub over_number: u32,
    pub ball_number: u32,
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
    pub runs: u32,
    pub ball_type: BallType,
    pub wicket_type: Option<WicketType>,
    pub dismissed: Option<PlayerId>,
    pub fielder: Option<PlayerId>,
    pub new_batsman: Option<PlayerId>,
    pub is_valid: bool,
    pub recorded_at: DateTime<Utc>,
    pub prev_hash: Option<[u8; 32]>,
    pub record_hash: [u8; 32],
}

impl BallRecord {
    pub(crate) fn from_draft(
        draft: &BallDraft,
        seq: u64,
        prev_hash: Option<[u8; 32]>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            seq,
            innings: draft.innings,
            over_number: draft.over_number,
            ball_number: draft.ball_number,
            striker: draft.striker,
            non_striker: draft.non_striker,
            bowler: draft.bowler,
            runs: draft.runs,
            ball_type: draft.ball_type,
            wicket_type: draft.wicket_type,
            dismissed: draft.dismissed,
            fielder: draft.fielder,
            new_batsman: draft.new_batsman,
            is_valid: true,
            recorded_at,
            prev_hash,
            record_hash: [0; 32],
        }
    }

    pub fn is_legal(&self) -> bool {
        self.ball_type.is_legal()
    }

    pub fn is_wicket(&self) -> bool {
        self.ball_type == BallType::Wicket
    }

    /// Runs this record added to the innings total.
    pub fn total_runs(&self) -> u32 {
        self.runs + self.ball_type.penalty()
    }

    /// The batsman dismissed on this ball, if any.
    pub fn dismissed_batsman(&self) -> Option<PlayerId> {
        if self.is_wicket() {
            Some(self.dismissed.unwrap_or(self.striker))
        } else {
            None
        }
    }

    /// Reconstruct the scorer input that produced this record.
    pub fn to_delivery(&self) -> Delivery {
        Delivery {
            runs: self.runs,
            ball_type: self.ball_type,
            wicket_type: self.wicket_type,
            fielder_id: self.fielder,
            new_batsman_id: self.new_batsman,
            dismissed_id: self.dismissed.filter(|id| *id != self.striker),
        }
    }

    /// Compact strip label: "1", "4", "Wd", "2Wd", "Nb+4", "1B", "2Lb", "W".
    pub fn label(&self) -> String {
        match self.ball_type {
            BallType::Normal => self.runs.to_string(),
            BallType::Wide if self.runs == 0 => "Wd".into(),
            BallType::Wide => format!("{}Wd", self.runs + 1),
            BallType::NoBall if self.runs == 0 => "Nb".into(),
            BallType::NoBall => format!("Nb+{}", self.runs),
            BallType::Bye => format!("{}B", self.runs),
            BallType::LegBye => format!("{}Lb", self.runs),
            BallType::Wicket if self.runs == 0 => "W".into(),
            BallType::Wicket => format!("{}W", self.runs),
        }
    }

    /// Over notation of the moment just after this ball ("15.2").
    pub fn over_label(&self) -> String {
        let ball = if self.is_legal() {
            self.ball_number + 1
        } else {
            self.ball_number
        };
        format!("{}.{}", self.over_number, ball)
    }

    pub(crate) fn compute_hash(&self) -> Result<[u8; 32], LedgerError> {
        let mut canonical = self.clone();
        canonical.record_hash = [0; 32];
        canonical.is_valid = true;

        let encoded = serde_json::to_vec(&canonical)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"crease-ball-v1:");
        hasher.update(&encoded);
        Ok(*hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(ball_type: BallType, runs: u32) -> BallDraft {
        BallDraft {
            innings: InningsId::new(),
            over_number: 15,
            ball_number: 1,
            striker: PlayerId::new(),
            non_striker: PlayerId::new(),
            bowler: PlayerId::new(),
            runs,
            ball_type,
            wicket_type: None,
            dismissed: None,
            fielder: None,
            new_batsman: None,
        }
    }

    fn record(ball_type: BallType, runs: u32) -> BallRecord {
        BallRecord::from_draft(&draft(ball_type, runs), 1, None, Utc::now())
    }

    #[test]
    fn labels_cover_every_ball_type() {
        assert_eq!(record(BallType::Normal, 0).label(), "0");
        assert_eq!(record(BallType::Normal, 6).label(), "6");
        assert_eq!(record(BallType::Wide, 0).label(), "Wd");
        assert_eq!(record(BallType::Wide, 1).label(), "2Wd");
        assert_eq!(record(BallType::NoBall, 0).label(), "Nb");
        assert_eq!(record(BallType::NoBall, 4).label(), "Nb+4");
        assert_eq!(record(BallType::Bye, 1).label(), "1B");
        assert_eq!(record(BallType::LegBye, 2).label(), "2Lb");
        assert_eq!(record(BallType::Wicket, 0).label(), "W");
    }

    #[test]
    fn over_label_counts_only_legal_balls() {
        assert_eq!(record(BallType::Normal, 1).over_label(), "15.2");
        assert_eq!(record(BallType::Wide, 0).over_label(), "15.1");
    }

    #[test]
    fn hash_ignores_validity_flag() {
        let mut r = record(BallType::Normal, 4);
        let before = r.compute_hash().unwrap();
        r.is_valid = false;
        assert_eq!(r.compute_hash().unwrap(), before);
        r.runs = 6;
        assert_ne!(r.compute_hash().unwrap(), before);
    }

    #[test]
    fn delivery_roundtrip_keeps_non_striker_run_out() {
        let mut d = draft(BallType::Wicket, 1);
        d.wicket_type = Some(WicketType::RunOut);
        d.dismissed = Some(d.non_striker);
        let r = BallRecord::from_draft(&d, 1, None, Utc::now());
        assert_eq!(r.dismissed_batsman(), Some(d.non_striker));
        assert_eq!(r.to_delivery().dismissed_id, Some(d.non_striker));
    }
}
