//! Next working weight prediction using linear regression (linfa)

use chrono::NaiveDate;
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};

use crate::db::TrainingRecord;

/// Minimum data points required for training
const MIN_DATA_POINTS: usize = 3;

/// Weight trend for one exercise: kg as a linear function of days since the first session
pub struct WeightPredictor {
    slope: f64,
    intercept: f64,
    r2_score: f64,
    data_points: usize,
    first_date: NaiveDate,
}

/// Prediction result for display
#[derive(Debug, Clone, PartialEq)]
pub struct WeightPrediction {
    /// Rounded to one decimal, not clamped
    pub predicted_kg: f64,
    /// Day offset the prediction was evaluated at
    pub day_offset: i64,
    pub daily_progress: f64,
    pub r2_score: f64,
    pub data_points: usize,
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl WeightPredictor {
    /// Fit on records of `exercise` with a numeric weight.
    ///
    /// Returns `None` below three usable points or when the fit fails. Points
    /// that all share one day give a flat line through their mean.
    pub fn train(records: &[TrainingRecord], exercise: &str) -> Option<Self> {
        let points: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter(|r| r.exercise == exercise)
            .filter_map(|r| r.weight_kg.map(|w| (r.date, w)))
            .collect();

        if points.len() < MIN_DATA_POINTS {
            return None;
        }

        let first_date = points.iter().map(|(d, _)| *d).min()?;

        // X = days since first session, Y = weight
        let x_data: Vec<f64> = points
            .iter()
            .map(|(date, _)| (*date - first_date).num_days() as f64)
            .collect();
        let y_data: Vec<f64> = points.iter().map(|(_, w)| *w).collect();

        let n_samples = x_data.len();
        if x_data.iter().all(|x| *x == x_data[0]) {
            let mean = y_data.iter().sum::<f64>() / n_samples as f64;
            return Some(Self {
                slope: 0.0,
                intercept: mean,
                r2_score: 0.0,
                data_points: n_samples,
                first_date,
            });
        }

        let features = Array2::from_shape_vec((n_samples, 1), x_data).ok()?;
        let targets = Array1::from_vec(y_data);
        let dataset = Dataset::new(features, targets);

        let model = LinearRegression::default().fit(&dataset).ok()?;

        let slope = model.params()[0];
        let intercept = model.intercept();
        if !slope.is_finite() || !intercept.is_finite() {
            return None;
        }

        let predictions = model.predict(&dataset);
        let r2_score = predictions.r2(&dataset).unwrap_or(0.0);

        Some(Self {
            slope,
            intercept,
            r2_score,
            data_points: n_samples,
            first_date,
        })
    }

    /// Unrounded weight on `date`, extrapolating past the last session
    pub fn weight_at(&self, date: NaiveDate) -> f64 {
        let days_from_start = (date - self.first_date).num_days() as f64;
        self.slope * days_from_start + self.intercept
    }

    /// Get daily progress (slope, kg/day)
    pub fn daily_progress(&self) -> f64 {
        self.slope
    }

    /// Get R2 score (model fit quality, 0-1)
    pub fn r2_score(&self) -> f64 {
        self.r2_score
    }

    /// Suggested working weight for `today`
    pub fn predict(&self, today: NaiveDate) -> WeightPrediction {
        WeightPrediction {
            predicted_kg: round_one_decimal(self.weight_at(today)),
            day_offset: (today - self.first_date).num_days(),
            daily_progress: self.slope,
            r2_score: self.r2_score,
            data_points: self.data_points,
        }
    }
}

impl WeightPrediction {
    /// Format prediction for terminal output
    pub fn format(&self) -> String {
        let trend = self.daily_progress * 7.0;
        let trend_str = if trend >= 0.0 {
            format!("+{:.2}", trend)
        } else {
            format!("{:.2}", trend)
        };

        [
            "--- Trend ---".to_string(),
            format!("Suggested today: {:.1} kg", self.predicted_kg),
            format!("Trend: {} kg/week", trend_str),
            format!("Fit: R2 {:.2} over {} sets", self.r2_score, self.data_points),
        ]
        .join("\n")
    }
}

/// Shorthand for callers that only need the number
pub fn predict_next_weight(records: &[TrainingRecord], exercise: &str, today: NaiveDate) -> Option<f64> {
    WeightPredictor::train(records, exercise).map(|p| p.predict(today).predicted_kg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn create_record(exercise: &str, weight: f64, day: i64) -> TrainingRecord {
        TrainingRecord::new(base_date() + Duration::days(day), "Chest", exercise, weight, 8, "amy").unwrap()
    }

    #[test]
    fn test_predictor_insufficient_data() {
        let records = vec![
            create_record("Bench Press", 50.0, 0),
            create_record("Bench Press", 52.5, 7),
        ];
        assert!(WeightPredictor::train(&records, "Bench Press").is_none());
        assert!(predict_next_weight(&[], "Bench Press", base_date()).is_none());
    }

    #[test]
    fn test_predictor_no_matching_exercise() {
        let records = vec![
            create_record("Squat", 100.0, 0),
            create_record("Squat", 102.5, 7),
            create_record("Squat", 105.0, 14),
        ];
        assert!(WeightPredictor::train(&records, "Bench Press").is_none());
    }

    #[test]
    fn test_non_numeric_weights_do_not_count() {
        let mut broken = create_record("Bench Press", 1.0, 3);
        broken.weight_kg = None;
        let records = vec![
            create_record("Bench Press", 50.0, 0),
            broken,
            create_record("Bench Press", 52.5, 7),
        ];
        assert!(WeightPredictor::train(&records, "Bench Press").is_none());
    }

    #[test]
    fn test_same_day_sets_predict_their_mean() {
        let records = vec![
            create_record("Bench Press", 60.0, 0),
            create_record("Bench Press", 60.0, 0),
            create_record("Bench Press", 62.5, 0),
        ];
        let predictor = WeightPredictor::train(&records, "Bench Press").unwrap();
        assert_eq!(predictor.daily_progress(), 0.0);
        assert_eq!(predictor.r2_score(), 0.0);

        let kg = predict_next_weight(&records, "Bench Press", base_date() + Duration::days(3));
        assert_eq!(kg, Some(60.8));
    }

    #[test]
    fn test_colinear_extrapolation() {
        // +2.5 kg every 7 days
        let records = vec![
            create_record("Bench Press", 50.0, 0),
            create_record("Bench Press", 52.5, 7),
            create_record("Bench Press", 55.0, 14),
        ];
        let predictor = WeightPredictor::train(&records, "Bench Press").unwrap();

        assert!((predictor.daily_progress() - 2.5 / 7.0).abs() < 1e-6);
        assert!(predictor.r2_score() > 0.99, "R2 score: {}", predictor.r2_score());

        let prediction = predictor.predict(base_date() + Duration::days(21));
        assert!((prediction.predicted_kg - 57.5).abs() <= 0.5, "{:?}", prediction);
        assert_eq!(prediction.day_offset, 21);
        assert_eq!(prediction.data_points, 3);

        let next_day = predictor.weight_at(base_date() + Duration::days(15));
        assert!((next_day - (55.0 + 2.5 / 7.0)).abs() < 1e-6);
    }

    #[test]
    fn test_prediction_extrapolates_to_today() {
        let records = vec![
            create_record("Squat", 100.0, 0),
            create_record("Squat", 101.0, 10),
            create_record("Squat", 102.0, 20),
        ];
        let later = predict_next_weight(&records, "Squat", base_date() + Duration::days(60)).unwrap();
        assert!((later - 106.0).abs() < 0.05, "prediction: {}", later);
    }

    #[test]
    fn test_prediction_is_rounded_to_one_decimal() {
        let records = vec![
            create_record("Squat", 100.0, 0),
            create_record("Squat", 100.0, 3),
            create_record("Squat", 101.0, 7),
        ];
        let kg = predict_next_weight(&records, "Squat", base_date() + Duration::days(9)).unwrap();
        assert!(((kg * 10.0).round() - kg * 10.0).abs() < 1e-9, "not rounded: {}", kg);
    }

    #[test]
    fn test_negative_trend_is_not_clamped() {
        let records = vec![
            create_record("Dips", 20.0, 0),
            create_record("Dips", 10.0, 7),
            create_record("Dips", 1.0, 14),
        ];
        let kg = predict_next_weight(&records, "Dips", base_date() + Duration::days(60)).unwrap();
        assert!(kg < 0.0, "prediction: {}", kg);
    }

    #[test]
    fn test_format_prediction() {
        let records = vec![
            create_record("Bench Press", 50.0, 0),
            create_record("Bench Press", 52.5, 7),
            create_record("Bench Press", 55.0, 14),
        ];
        let prediction = WeightPredictor::train(&records, "Bench Press")
            .unwrap()
            .predict(base_date() + Duration::days(21));
        let formatted = prediction.format();

        assert!(formatted.contains("Suggested today: 57.5 kg"), "Format: {}", formatted);
        assert!(formatted.contains("Trend: +2.50 kg/week"), "Format: {}", formatted);
    }
}
