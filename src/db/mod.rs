//! Database module - training records kept in a header + string-cell sheet

pub mod sheet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LiftError, Result};
pub use sheet::{MemorySheet, Sheet, SqliteSheet};

/// Column names, in the order a fresh sheet is created with
pub const HEADER: [&str; 6] = ["date", "body_part", "exercise", "weight_kg", "reps", "owner_id"];

/// Owner for rows written before the owner column existed
pub const DEFAULT_OWNER: &str = "guest";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One logged set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub date: NaiveDate,
    pub body_part: String,
    pub exercise: String,
    /// `None` when the stored cell is not a usable number
    pub weight_kg: Option<f64>,
    pub reps: Option<u32>,
    pub owner_id: String,
}

impl TrainingRecord {
    /// Build a record from form input, rejecting non-positive weight or reps
    pub fn new(
        date: NaiveDate,
        body_part: impl Into<String>,
        exercise: impl Into<String>,
        weight_kg: f64,
        reps: u32,
        owner_id: impl Into<String>,
    ) -> Result<Self> {
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(LiftError::Validation(format!("weight must be > 0, got {}", weight_kg)));
        }
        if reps == 0 {
            return Err(LiftError::Validation("reps must be > 0".to_string()));
        }

        let exercise = exercise.into();
        let owner_id = owner_id.into();
        if exercise.trim().is_empty() {
            return Err(LiftError::Validation("exercise name is empty".to_string()));
        }
        if owner_id.trim().is_empty() {
            return Err(LiftError::Validation("user name is empty".to_string()));
        }

        Ok(Self {
            date,
            body_part: body_part.into(),
            exercise,
            weight_kg: Some(weight_kg),
            reps: Some(reps),
            owner_id,
        })
    }

    /// Weight with non-numeric cells coerced to 0
    pub fn weight(&self) -> f64 {
        self.weight_kg.unwrap_or(0.0)
    }

    /// Reps with non-numeric cells coerced to 0
    pub fn rep_count(&self) -> u32 {
        self.reps.unwrap_or(0)
    }

    fn cell(&self, column: &str) -> String {
        match column {
            "date" => self.date.format(DATE_FORMAT).to_string(),
            "body_part" => self.body_part.clone(),
            "exercise" => self.exercise.clone(),
            "weight_kg" => self.weight_kg.map(|w| w.to_string()).unwrap_or_default(),
            "reps" => self.reps.map(|r| r.to_string()).unwrap_or_default(),
            "owner_id" => self.owner_id.clone(),
            _ => String::new(),
        }
    }

    /// Cells laid out to match `header`
    fn to_cells(&self, header: &[String]) -> Vec<String> {
        header.iter().map(|column| self.cell(column.trim())).collect()
    }
}

fn parse_weight(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= 0.0)
}

fn parse_reps(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    cell.parse::<u32>().ok().or_else(|| {
        // "8.0" style cells written by other tools
        cell.parse::<f64>()
            .ok()
            .filter(|r| r.is_finite() && *r >= 0.0 && r.fract() == 0.0 && *r <= u32::MAX as f64)
            .map(|r| r as u32)
    })
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    NaiveDate::parse_from_str(cell, DATE_FORMAT)
        .ok()
        // "2024-03-01 00:00:00" style timestamps
        .or_else(|| cell.get(..10).and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok()))
}

/// Header positions of the expected columns
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    body_part: usize,
    exercise: usize,
    weight: usize,
    reps: usize,
    owner: usize,
}

impl Columns {
    fn locate(header: &[String]) -> Option<Self> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        Some(Self {
            date: find("date")?,
            body_part: find("body_part")?,
            exercise: find("exercise")?,
            weight: find("weight_kg")?,
            reps: find("reps")?,
            owner: find("owner_id")?,
        })
    }

    fn owner_of<'a>(&self, cells: &'a [String]) -> &'a str {
        match cells.get(self.owner).map(|c| c.trim()) {
            Some(owner) if !owner.is_empty() => owner,
            _ => DEFAULT_OWNER,
        }
    }

    fn parse(&self, cells: &[String], line: usize) -> Option<TrainingRecord> {
        let cell = |idx: usize| cells.get(idx).map(String::as_str).unwrap_or("");

        let Some(date) = parse_date(cell(self.date)) else {
            warn!("Skipping sheet row {}: unreadable date '{}'", line, cell(self.date));
            return None;
        };

        let weight_kg = parse_weight(cell(self.weight));
        if weight_kg.is_none() && !cell(self.weight).trim().is_empty() {
            debug!("Sheet row {}: non-numeric weight '{}'", line, cell(self.weight));
        }

        Some(TrainingRecord {
            date,
            body_part: cell(self.body_part).trim().to_string(),
            exercise: cell(self.exercise).trim().to_string(),
            weight_kg,
            reps: parse_reps(cell(self.reps)),
            owner_id: self.owner_of(cells).to_string(),
        })
    }
}

/// Typed training records over any [`Sheet`]
pub struct RecordStore<S: Sheet> {
    sheet: S,
}

/// The on-disk store used by the CLI and TUI
pub type Database = RecordStore<SqliteSheet>;

impl Database {
    /// Open or create the SQLite-backed store
    pub fn open(path: &str) -> Result<Self> {
        info!("Opening training sheet at {}", path);
        Ok(Self::new(SqliteSheet::open(path)?))
    }
}

impl<S: Sheet> RecordStore<S> {
    pub fn new(sheet: S) -> Self {
        Self { sheet }
    }

    pub fn sheet(&self) -> &S {
        &self.sheet
    }

    /// Read the sheet, adding any missing header column once
    fn load(&self) -> Result<(Vec<String>, Columns, Vec<Vec<String>>)> {
        let mut rows = self.sheet.read_all()?;
        if rows.is_empty() {
            let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
            let columns = Columns::locate(&header)
                .ok_or_else(|| LiftError::DataUnavailable("default header is incomplete".to_string()))?;
            return Ok((header, columns, Vec::new()));
        }

        let mut header = rows.remove(0);
        for name in HEADER {
            if !header.iter().any(|h| h.trim() == name) {
                warn!(
                    "Sheet header is missing column '{}', appending it; existing rows read it as empty",
                    name
                );
                self.sheet.update_cell(0, header.len(), name)?;
                header.push(name.to_string());
            }
        }

        let columns = Columns::locate(&header)
            .ok_or_else(|| LiftError::DataUnavailable("sheet header could not be repaired".to_string()))?;
        Ok((header, columns, rows))
    }

    /// All readable records of `owner_id`, in insertion order
    pub fn read_all(&self, owner_id: &str) -> Result<Vec<TrainingRecord>> {
        let (_, columns, rows) = self.load()?;
        Ok(rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| columns.owner_of(cells) == owner_id)
            .filter_map(|(idx, cells)| columns.parse(cells, idx + 2))
            .collect())
    }

    /// Append one record, writing the header first on an empty sheet
    pub fn append(&self, record: &TrainingRecord) -> Result<()> {
        if self.sheet.read_all()?.is_empty() {
            let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
            self.sheet.append_row(&header)?;
        }
        let (header, _, _) = self.load()?;
        self.sheet.append_row(&record.to_cells(&header))?;
        info!(
            "Logged {} {}kg x {} for {}",
            record.exercise,
            record.weight(),
            record.rep_count(),
            record.owner_id
        );
        Ok(())
    }

    /// Replace every row of `owner_id` with `records`; other owners keep their rows
    pub fn overwrite_all(&self, owner_id: &str, records: &[TrainingRecord]) -> Result<()> {
        let (header, columns, rows) = self.load()?;

        let mut out = Vec::with_capacity(rows.len() + 1);
        out.push(header.clone());
        out.extend(
            rows.into_iter()
                .filter(|cells| columns.owner_of(cells) != owner_id),
        );
        out.extend(records.iter().map(|r| r.to_cells(&header)));

        self.sheet.clear_and_write(&out)?;
        info!("Rewrote {} records for {}", records.len(), owner_id);
        Ok(())
    }

    /// Remove the most recently logged record of `owner_id`
    pub fn undo_last(&self, owner_id: &str) -> Result<Option<TrainingRecord>> {
        let mut records = self.read_all(owner_id)?;
        let removed = records.pop();
        if removed.is_some() {
            self.overwrite_all(owner_id, &records)?;
        }
        Ok(removed)
    }

    /// Rename an exercise across the owner's history, returns rows changed
    pub fn rename_exercise(&self, owner_id: &str, from: &str, to: &str, body_part: &str) -> Result<usize> {
        let mut records = self.read_all(owner_id)?;
        let mut changed = 0;
        for record in records.iter_mut().filter(|r| r.exercise == from) {
            record.exercise = to.to_string();
            record.body_part = body_part.to_string();
            changed += 1;
        }
        if changed > 0 {
            self.overwrite_all(owner_id, &records)?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn record(day: &str, exercise: &str, weight: f64, reps: u32, owner: &str) -> TrainingRecord {
        TrainingRecord::new(date(day), "Chest", exercise, weight, reps, owner).unwrap()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_new_rejects_non_positive_input() {
        let day = date("2024-05-01");
        assert!(matches!(
            TrainingRecord::new(day, "Chest", "Bench Press", 0.0, 5, "amy"),
            Err(LiftError::Validation(_))
        ));
        assert!(matches!(
            TrainingRecord::new(day, "Chest", "Bench Press", 60.0, 0, "amy"),
            Err(LiftError::Validation(_))
        ));
        assert!(matches!(
            TrainingRecord::new(day, "Chest", "Bench Press", f64::NAN, 5, "amy"),
            Err(LiftError::Validation(_))
        ));
    }

    #[test]
    fn test_first_append_writes_header() {
        let store = RecordStore::new(MemorySheet::new());
        store.append(&record("2024-05-01", "Bench Press", 60.0, 8, "amy")).unwrap();

        let rows = store.sheet().rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], row(&HEADER));
        assert_eq!(rows[1], row(&["2024-05-01", "Chest", "Bench Press", "60", "8", "amy"]));
    }

    #[test]
    fn test_round_trip_memory() {
        let store = RecordStore::new(MemorySheet::new());
        let logged = record("2024-05-01", "Bench Press", 62.5, 8, "amy");
        store.append(&logged).unwrap();

        let read = store.read_all("amy").unwrap();
        assert_eq!(read, vec![logged]);
    }

    #[test]
    fn test_round_trip_sqlite() {
        let store = Database::open(":memory:").unwrap();
        let first = record("2024-05-01", "Bench Press", 62.5, 8, "amy");
        let second = record("2024-05-03", "Dips", 10.25, 12, "amy");
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let read = store.read_all("amy").unwrap();
        assert_eq!(read, vec![first, second]);
        assert_eq!(read[0].weight(), 62.5);
        assert_eq!(read[1].rep_count(), 12);
    }

    #[test]
    fn test_read_all_partitions_by_owner() {
        let store = RecordStore::new(MemorySheet::new());
        store.append(&record("2024-05-01", "Bench Press", 60.0, 8, "amy")).unwrap();
        store.append(&record("2024-05-01", "Squat", 100.0, 5, "bob")).unwrap();

        let amy = store.read_all("amy").unwrap();
        assert_eq!(amy.len(), 1);
        assert_eq!(amy[0].exercise, "Bench Press");
        assert!(store.read_all("carol").unwrap().is_empty());
    }

    #[test]
    fn test_short_rows_and_bad_numbers_do_not_fail() {
        let sheet = MemorySheet::with_rows(vec![
            row(&HEADER),
            row(&["2024-05-01", "Chest", "Bench Press", "heavy", "x", "amy"]),
            row(&["2024-05-02", "Chest", "Bench Press"]),
        ]);
        let store = RecordStore::new(sheet);

        let read = store.read_all("amy").unwrap();
        // short row has no owner cell, so it belongs to the default owner
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].weight_kg, None);
        assert_eq!(read[0].weight(), 0.0);
        assert_eq!(read[0].rep_count(), 0);

        let guest = store.read_all(DEFAULT_OWNER).unwrap();
        assert_eq!(guest.len(), 1);
        assert_eq!(guest[0].weight_kg, None);
    }

    #[test]
    fn test_unreadable_date_skips_row() {
        let sheet = MemorySheet::with_rows(vec![
            row(&HEADER),
            row(&["yesterday", "Chest", "Bench Press", "60", "8", "amy"]),
            row(&["2024-05-02 00:00:00", "Chest", "Bench Press", "62.5", "8.0", "amy"]),
        ]);
        let store = RecordStore::new(sheet);

        let read = store.read_all("amy").unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].date, date("2024-05-02"));
        assert_eq!(read[0].reps, Some(8));
    }

    #[test]
    fn test_schema_drift_appends_owner_column_once() {
        let sheet = MemorySheet::with_rows(vec![
            row(&["date", "body_part", "exercise", "weight_kg", "reps"]),
            row(&["2024-05-01", "Legs", "Squat", "100", "5"]),
        ]);
        let store = RecordStore::new(sheet);

        let legacy = store.read_all(DEFAULT_OWNER).unwrap();
        assert_eq!(legacy.len(), 1);
        assert_eq!(legacy[0].exercise, "Squat");
        assert_eq!(store.sheet().rows()[0], row(&HEADER));

        // second read finds a complete header and changes nothing
        store.read_all(DEFAULT_OWNER).unwrap();
        assert_eq!(store.sheet().rows()[0].len(), HEADER.len());
    }

    #[test]
    fn test_reordered_columns_are_located_by_name() {
        let sheet = MemorySheet::with_rows(vec![
            row(&["owner_id", "exercise", "reps", "weight_kg", "body_part", "date"]),
            row(&["amy", "Deadlift", "3", "140", "Back", "2024-05-01"]),
        ]);
        let store = RecordStore::new(sheet);
        store.append(&record("2024-05-02", "Bench Press", 60.0, 8, "amy")).unwrap();

        let read = store.read_all("amy").unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].weight_kg, Some(140.0));
        assert_eq!(read[0].body_part, "Back");
        assert_eq!(store.sheet().rows()[2][0], "amy");
    }

    #[test]
    fn test_overwrite_all_keeps_other_owners() {
        let store = RecordStore::new(MemorySheet::new());
        store.append(&record("2024-05-01", "Bench Press", 60.0, 8, "amy")).unwrap();
        store.append(&record("2024-05-01", "Squat", 100.0, 5, "bob")).unwrap();
        store.append(&record("2024-05-02", "Bench Press", 62.5, 8, "amy")).unwrap();

        let replacement = vec![record("2024-05-03", "Dips", 0.5, 10, "amy")];
        store.overwrite_all("amy", &replacement).unwrap();

        assert_eq!(store.read_all("amy").unwrap(), replacement);
        assert_eq!(store.read_all("bob").unwrap().len(), 1);
    }

    #[test]
    fn test_undo_last_removes_latest_append() {
        let store = Database::open(":memory:").unwrap();
        store.append(&record("2024-05-02", "Bench Press", 60.0, 8, "amy")).unwrap();
        store.append(&record("2024-05-01", "Dips", 10.0, 10, "amy")).unwrap();

        let removed = store.undo_last("amy").unwrap().unwrap();
        assert_eq!(removed.exercise, "Dips");
        assert_eq!(store.read_all("amy").unwrap().len(), 1);
        assert!(store.undo_last("bob").unwrap().is_none());
    }

    #[test]
    fn test_rename_exercise() {
        let store = RecordStore::new(MemorySheet::new());
        store.append(&record("2024-05-01", "Bench", 60.0, 8, "amy")).unwrap();
        store.append(&record("2024-05-02", "Dips", 10.0, 8, "amy")).unwrap();

        let changed = store.rename_exercise("amy", "Bench", "Bench Press", "Chest").unwrap();
        assert_eq!(changed, 1);

        let read = store.read_all("amy").unwrap();
        assert_eq!(read[0].exercise, "Bench Press");
        assert_eq!(read[1].exercise, "Dips");
    }
}
