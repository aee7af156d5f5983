//! Body part recovery tracking: days since each part was last trained

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::db::TrainingRecord;
use crate::exercises::{ExerciseTaxonomy, UNKNOWN_BODY_PART};

/// Recovery age reported for a body part with no records
pub const NEVER_TRAINED_DAYS: i64 = 999;

/// Recovery state of a single body part
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPartRecovery {
    pub body_part: String,
    pub last_trained: Option<NaiveDate>,
    /// Whole days since `last_trained`, or [`NEVER_TRAINED_DAYS`]
    pub days_since: i64,
}

impl BodyPartRecovery {
    pub fn is_never_trained(&self) -> bool {
        self.last_trained.is_none()
    }
}

/// Tracks recovery age per body part from training history
pub struct RecoveryTracker {
    parts: Vec<BodyPartRecovery>,
}

impl RecoveryTracker {
    /// Build tracker from records, classifying each by its exercise's body part
    pub fn from_records(records: &[TrainingRecord], taxonomy: &ExerciseTaxonomy, today: NaiveDate) -> Self {
        let mut last_trained: HashMap<&str, NaiveDate> = HashMap::new();

        for record in records {
            let body_part = taxonomy.body_part_of(&record.exercise);
            if body_part == UNKNOWN_BODY_PART {
                continue;
            }
            last_trained
                .entry(body_part)
                .and_modify(|d| *d = (*d).max(record.date))
                .or_insert(record.date);
        }

        let parts = taxonomy
            .body_parts()
            .map(|part| {
                let last = last_trained.get(part).copied();
                BodyPartRecovery {
                    body_part: part.to_string(),
                    last_trained: last,
                    days_since: last.map(|d| (today - d).num_days()).unwrap_or(NEVER_TRAINED_DAYS),
                }
            })
            .collect();

        Self { parts }
    }

    /// All body parts in taxonomy order
    pub fn parts(&self) -> &[BodyPartRecovery] {
        &self.parts
    }

    pub fn get(&self, body_part: &str) -> Option<&BodyPartRecovery> {
        self.parts.iter().find(|p| p.body_part == body_part)
    }

    /// Days since `body_part` was trained; unknown parts count as never trained
    pub fn days_since(&self, body_part: &str) -> i64 {
        self.get(body_part).map(|p| p.days_since).unwrap_or(NEVER_TRAINED_DAYS)
    }

    /// Body part with the largest recovery age; the earliest declared wins a tie
    pub fn most_rested(&self) -> Option<&BodyPartRecovery> {
        self.parts.iter().fold(None, |best, part| match best {
            Some(b) if b.days_since >= part.days_since => Some(b),
            _ => Some(part),
        })
    }

    /// Most in need of attention first, taxonomy order on ties
    pub fn sorted_by_need(&self) -> Vec<&BodyPartRecovery> {
        let mut parts: Vec<_> = self.parts.iter().collect();
        parts.sort_by(|a, b| b.days_since.cmp(&a.days_since));
        parts
    }

    /// Report lines for the `recovery` command
    pub fn report(&self) -> Vec<(String, String, &'static str)> {
        self.sorted_by_need()
            .into_iter()
            .map(|p| {
                let (age, bar) = match p.last_trained {
                    None => ("never".to_string(), "[!!!!]"),
                    Some(_) => {
                        let bar = match p.days_since {
                            d if d >= 7 => "[!!!.]",
                            d if d >= 4 => "[!!..]",
                            d if d >= 2 => "[!...]",
                            _ => "[....]",
                        };
                        (format!("{}d", p.days_since), bar)
                    }
                };
                (p.body_part.clone(), age, bar)
            })
            .collect()
    }
}
