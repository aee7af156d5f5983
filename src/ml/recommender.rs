//! What to train next, based on body part recovery

use std::collections::HashMap;

use chrono::NaiveDate;

use super::recovery::RecoveryTracker;
use crate::db::TrainingRecord;
use crate::exercises::ExerciseTaxonomy;

/// A recommendation with explanation
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub body_part: String,
    pub days_since: i64,
    /// Exercise within `body_part` done least recently, if the part has any
    pub exercise: Option<String>,
    pub reason: String,
}

/// Recovery-based recommendation engine
pub struct Recommender<'a> {
    tracker: RecoveryTracker,
    taxonomy: &'a ExerciseTaxonomy,
    last_done: HashMap<&'a str, NaiveDate>,
}

impl<'a> Recommender<'a> {
    pub fn new(records: &'a [TrainingRecord], taxonomy: &'a ExerciseTaxonomy, today: NaiveDate) -> Self {
        let tracker = RecoveryTracker::from_records(records, taxonomy, today);

        let mut last_done: HashMap<&str, NaiveDate> = HashMap::new();
        for record in records {
            last_done
                .entry(record.exercise.as_str())
                .and_modify(|d| *d = (*d).max(record.date))
                .or_insert(record.date);
        }

        Self { tracker, taxonomy, last_done }
    }

    pub fn tracker(&self) -> &RecoveryTracker {
        &self.tracker
    }

    /// Exercise of `body_part` to pick: never done first, then the stalest
    fn pick_exercise(&self, body_part: &str) -> Option<&'a str> {
        let taxonomy: &'a ExerciseTaxonomy = self.taxonomy;
        taxonomy
            .exercises(body_part)
            .iter()
            .map(String::as_str)
            // None sorts before Some, min_by_key keeps the first of equal minima
            .min_by_key(|name| self.last_done.get(name).copied())
    }

    /// Body part with the largest recovery age, plus an exercise for it
    pub fn get_recommendation(&self) -> Option<Recommendation> {
        let part = self.tracker.most_rested()?;
        let exercise = self.pick_exercise(&part.body_part);

        let reason = if part.is_never_trained() {
            "never trained".to_string()
        } else {
            format!("rested {} days", part.days_since)
        };

        Some(Recommendation {
            body_part: part.body_part.clone(),
            days_since: part.days_since,
            exercise: exercise.map(str::to_string),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::recovery::NEVER_TRAINED_DAYS;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn record_days_ago(exercise: &str, days_ago: i64) -> TrainingRecord {
        TrainingRecord::new(today() - Duration::days(days_ago), "", exercise, 60.0, 5, "amy").unwrap()
    }

    fn chest_and_back() -> ExerciseTaxonomy {
        ExerciseTaxonomy::from_parts(vec![
            ("Chest".to_string(), vec!["Bench Press".to_string(), "Dips".to_string()]),
            ("Back".to_string(), vec!["Deadlift".to_string(), "Chin-up".to_string()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_recommends_never_trained_part() {
        let taxonomy = chest_and_back();
        let records = vec![record_days_ago("Bench Press", 10)];
        let rec = Recommender::new(&records, &taxonomy, today()).get_recommendation().unwrap();

        assert_eq!(rec.body_part, "Back");
        assert_eq!(rec.days_since, NEVER_TRAINED_DAYS);
        assert_eq!(rec.exercise.as_deref(), Some("Deadlift"));
        assert_eq!(rec.reason, "never trained");
    }

    #[test]
    fn test_all_never_trained_picks_first_declared() {
        let taxonomy = chest_and_back();
        let rec = Recommender::new(&[], &taxonomy, today()).get_recommendation().unwrap();
        assert_eq!(rec.body_part, "Chest");
        assert_eq!(rec.exercise.as_deref(), Some("Bench Press"));
    }

    #[test]
    fn test_recommends_longest_rested_part() {
        let taxonomy = chest_and_back();
        let records = vec![
            record_days_ago("Bench Press", 2),
            record_days_ago("Deadlift", 6),
            record_days_ago("Chin-up", 9),
        ];
        let rec = Recommender::new(&records, &taxonomy, today()).get_recommendation().unwrap();

        assert_eq!(rec.body_part, "Back");
        assert_eq!(rec.days_since, 6);
        assert_eq!(rec.exercise.as_deref(), Some("Chin-up"));
        assert_eq!(rec.reason, "rested 6 days");
    }

    #[test]
    fn test_untried_exercise_preferred_within_part() {
        let taxonomy = chest_and_back();
        let records = vec![record_days_ago("Bench Press", 20), record_days_ago("Deadlift", 1)];
        let rec = Recommender::new(&records, &taxonomy, today()).get_recommendation().unwrap();

        assert_eq!(rec.body_part, "Chest");
        assert_eq!(rec.exercise.as_deref(), Some("Dips"));
    }

    #[test]
    fn test_empty_taxonomy_has_no_recommendation() {
        let taxonomy = ExerciseTaxonomy::empty();
        assert!(Recommender::new(&[], &taxonomy, today()).get_recommendation().is_none());
    }
}
