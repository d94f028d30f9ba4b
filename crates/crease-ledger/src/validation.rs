use std::collections::HashSet;

use crease_types::{InningsId, BALLS_PER_OVER};

use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Result of stream validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub innings: InningsId,
    pub record_count: u64,
    pub valid_records: u64,
    pub hash_chain_valid: bool,
    pub sequence_monotonic: bool,
    pub ball_numbers_in_range: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub seq: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    SequenceGap,
    HashChainBreak,
    HashMismatch,
    BallOutOfRange,
    ForeignRecord,
}

/// Stream integrity validator.
pub struct StreamValidator;

impl StreamValidator {
    /// Validate a single innings stream for all invariants.
    pub fn validate_stream<R: LedgerReader>(
        reader: &R,
        innings: &InningsId,
    ) -> Result<ValidationReport, LedgerError> {
        let records = reader.read_all(innings)?;
        let mut violations = Vec::new();
        let mut hash_chain_valid = true;
        let mut sequence_monotonic = true;
        let mut ball_numbers_in_range = true;
        let mut seen_hashes = HashSet::new();

        for (index, record) in records.iter().enumerate() {
            let expected_seq = (index + 1) as u64;
            if record.seq != expected_seq {
                sequence_monotonic = false;
                violations.push(Violation {
                    seq: record.seq,
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected seq {expected_seq}, got {}", record.seq),
                });
            }

            if record.innings != *innings {
                violations.push(Violation {
                    seq: record.seq,
                    kind: ViolationKind::ForeignRecord,
                    description: format!("record belongs to innings {}", record.innings),
                });
            }

            let expected_prev = index.checked_sub(1).map(|i| records[i].record_hash);
            if record.prev_hash != expected_prev {
                hash_chain_valid = false;
                violations.push(Violation {
                    seq: record.seq,
                    kind: ViolationKind::HashChainBreak,
                    description: "previous hash link mismatch".into(),
                });
            }

            if let Ok(computed) = record.compute_hash() {
                if computed != record.record_hash || !seen_hashes.insert(computed) {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        seq: record.seq,
                        kind: ViolationKind::HashMismatch,
                        description: "record hash does not match computed".into(),
                    });
                }
            }

            if record.ball_number >= BALLS_PER_OVER {
                ball_numbers_in_range = false;
                violations.push(Violation {
                    seq: record.seq,
                    kind: ViolationKind::BallOutOfRange,
                    description: format!(
                        "ball number {} outside 0..{BALLS_PER_OVER}",
                        record.ball_number
                    ),
                });
            }
        }

        Ok(ValidationReport {
            innings: *innings,
            record_count: records.len() as u64,
            valid_records: records.iter().filter(|r| r.is_valid).count() as u64,
            hash_chain_valid,
            sequence_monotonic,
            ball_numbers_in_range,
            violations,
        })
    }
}
