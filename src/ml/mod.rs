//! ML module - Progressive overload analytics
//!
//! Features:
//! - Last session and personal record per exercise
//! - Estimated one-rep-max (Epley) series for trend charts
//! - Body part recovery age and what to train next
//! - Next working weight using linear regression (linfa)

pub mod predictor;
pub mod recommender;
pub mod recovery;

pub use predictor::{WeightPrediction, WeightPredictor};
pub use recommender::{Recommendation, Recommender};
pub use recovery::{BodyPartRecovery, NEVER_TRAINED_DAYS, RecoveryTracker};

use chrono::NaiveDate;

use crate::db::TrainingRecord;
use crate::exercises::ExerciseTaxonomy;

/// Estimated one-rep-max, Epley formula: `weight * (1 + reps / 30)`
pub fn one_rep_max(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + reps as f64 / 30.0)
}

/// One point of the estimated 1RM trend
#[derive(Debug, Clone, PartialEq)]
pub struct OneRepMaxPoint {
    pub date: NaiveDate,
    pub weight: f64,
    pub reps: u32,
    pub one_rep_max: f64,
}

/// History digest for one exercise
#[derive(Debug, Clone)]
pub struct ExerciseSummary {
    pub exercise: String,
    pub sessions: usize,
    /// Latest date; on a date tie the record logged last
    pub last: TrainingRecord,
    /// Heaviest weight; on a tie the earliest record
    pub personal_record: TrainingRecord,
    /// Oldest first
    pub one_rep_max_series: Vec<OneRepMaxPoint>,
}

/// Training analytics over one user's records
pub struct Analytics {
    records: Vec<TrainingRecord>,
}

impl Analytics {
    pub fn new(records: Vec<TrainingRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TrainingRecord] {
        &self.records
    }

    /// Records of `exercise`, date ascending, insertion order within a date
    fn history(&self, exercise: &str) -> Vec<&TrainingRecord> {
        let mut history: Vec<_> = self.records.iter().filter(|r| r.exercise == exercise).collect();
        // sort_by_key is stable
        history.sort_by_key(|r| r.date);
        history
    }

    pub fn last_record(&self, exercise: &str) -> Option<&TrainingRecord> {
        self.history(exercise).last().copied()
    }

    pub fn personal_record(&self, exercise: &str) -> Option<&TrainingRecord> {
        let history = self.history(exercise);
        let (first, rest) = history.split_first()?;

        let mut best: &TrainingRecord = first;
        for &record in rest {
            let heavier = record.weight() > best.weight();
            // a real number beats a cell that only coerced to the same value
            let same_but_valid =
                record.weight() == best.weight() && best.weight_kg.is_none() && record.weight_kg.is_some();
            if heavier || same_but_valid {
                best = record;
            }
        }
        Some(best)
    }

    pub fn one_rep_max_series(&self, exercise: &str) -> Vec<OneRepMaxPoint> {
        self.history(exercise)
            .into_iter()
            .map(|r| OneRepMaxPoint {
                date: r.date,
                weight: r.weight(),
                reps: r.rep_count(),
                one_rep_max: one_rep_max(r.weight(), r.rep_count()),
            })
            .collect()
    }

    /// `None` means the exercise has no history yet
    pub fn summary(&self, exercise: &str) -> Option<ExerciseSummary> {
        let last = self.last_record(exercise)?.clone();
        let personal_record = self.personal_record(exercise)?.clone();
        let one_rep_max_series = self.one_rep_max_series(exercise);

        Some(ExerciseSummary {
            exercise: exercise.to_string(),
            sessions: one_rep_max_series.len(),
            last,
            personal_record,
            one_rep_max_series,
        })
    }

    /// Short "60kg x 8 (05/01)" label for exercise lists
    pub fn last_record_label(&self, exercise: &str) -> String {
        match self.last_record(exercise) {
            Some(r) => format!("{}kg x {} ({})", r.weight(), r.rep_count(), r.date.format("%m/%d")),
            None => "no records".to_string(),
        }
    }

    /// Most recent record across all exercises
    pub fn latest(&self) -> Option<&TrainingRecord> {
        // max_by_key keeps the last of equal maxima
        self.records.iter().max_by_key(|r| r.date)
    }
}

/// Everything the detail view shows for one exercise, computed on demand
#[derive(Debug, Clone)]
pub struct AnalyticsSnapshot {
    pub exercise: String,
    pub body_part: String,
    pub summary: Option<ExerciseSummary>,
    pub prediction: Option<WeightPrediction>,
    /// Taxonomy order
    pub recovery: Vec<BodyPartRecovery>,
    pub recommendation: Option<Recommendation>,
}

impl AnalyticsSnapshot {
    pub fn compute(
        records: &[TrainingRecord],
        taxonomy: &ExerciseTaxonomy,
        exercise: &str,
        today: NaiveDate,
    ) -> Self {
        let analytics = Analytics::new(records.to_vec());
        let recommender = Recommender::new(records, taxonomy, today);

        Self {
            exercise: exercise.to_string(),
            body_part: taxonomy.body_part_of(exercise).to_string(),
            summary: analytics.summary(exercise),
            prediction: WeightPredictor::train(records, exercise).map(|p| p.predict(today)),
            recovery: recommender.tracker().parts().to_vec(),
            recommendation: recommender.get_recommendation(),
        }
    }
}
