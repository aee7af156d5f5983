//! Exercise taxonomy - body part to exercise mapping

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{info, warn};

use crate::error::{LiftError, Result};

/// Body part reported for exercises missing from the taxonomy
pub const UNKNOWN_BODY_PART: &str = "unknown";

/// Built-in taxonomy, used when no document is available
pub const DEFAULT_EXERCISES: &[(&str, &[&str])] = &[
    (
        "Chest",
        &[
            "Bench Press",
            "Incline Bench Press",
            "Incline Dumbbell Press",
            "Dips",
            "Pec Fly",
            "Machine Press",
        ],
    ),
    ("Back", &["Deadlift", "Front Pulldown", "Lat Pulldown", "Low Row", "Chin-up"]),
    (
        "Legs",
        &["Squat", "Leg Extension", "Leg Curl", "Leg Press", "Bulgarian Split Squat"],
    ),
    (
        "Shoulders",
        &["Side Raise", "Dumbbell Shoulder Press", "Barbell Shoulder Press"],
    ),
    ("Arms", &["Skull Crusher", "Incline Curl", "Barbell Curl", "Cable Pushdown"]),
];

/// Ordered body parts, each with an ordered list of exercise names.
///
/// Exercise names are unique across the whole taxonomy, so every name maps
/// back to exactly one body part.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseTaxonomy {
    parts: Vec<(String, Vec<String>)>,
    /// exercise -> body part
    index: HashMap<String, String>,
}

impl Default for ExerciseTaxonomy {
    fn default() -> Self {
        let parts = DEFAULT_EXERCISES
            .iter()
            .map(|(part, exercises)| {
                (part.to_string(), exercises.iter().map(|e| e.to_string()).collect())
            })
            .collect();
        let mut taxonomy = Self { parts, index: HashMap::new() };
        taxonomy.rebuild_index();
        taxonomy
    }
}

impl ExerciseTaxonomy {
    /// Taxonomy with no body parts
    pub fn empty() -> Self {
        Self { parts: Vec::new(), index: HashMap::new() }
    }

    /// Build from ordered (body part, exercises) pairs, rejecting duplicates
    pub fn from_parts<P, E>(parts: P) -> Result<Self>
    where
        P: IntoIterator<Item = (String, E)>,
        E: IntoIterator<Item = String>,
    {
        let mut taxonomy = Self::empty();
        for (part, exercises) in parts {
            taxonomy.ensure_part(part.trim());
            for exercise in exercises {
                taxonomy.add(&part, &exercise)?;
            }
        }
        Ok(taxonomy)
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .parts
            .iter()
            .flat_map(|(part, exercises)| exercises.iter().map(move |e| (e.clone(), part.clone())))
            .collect();
    }

    fn ensure_part(&mut self, body_part: &str) -> usize {
        match self.parts.iter().position(|(p, _)| p == body_part) {
            Some(idx) => idx,
            None => {
                self.parts.push((body_part.to_string(), Vec::new()));
                self.parts.len() - 1
            }
        }
    }

    /// Register `exercise` under `body_part`, creating the part if needed
    pub fn add(&mut self, body_part: &str, exercise: &str) -> Result<()> {
        let body_part = body_part.trim();
        let exercise = exercise.trim();
        if body_part.is_empty() || exercise.is_empty() {
            return Err(LiftError::Validation("body part and exercise must not be empty".to_string()));
        }
        if body_part == UNKNOWN_BODY_PART {
            return Err(LiftError::Validation(format!("'{}' is reserved", UNKNOWN_BODY_PART)));
        }
        if let Some(existing) = self.index.get(exercise) {
            return Err(LiftError::DuplicateExercise {
                exercise: exercise.to_string(),
                body_part: existing.clone(),
            });
        }

        let idx = self.ensure_part(body_part);
        self.parts[idx].1.push(exercise.to_string());
        self.rebuild_index();
        Ok(())
    }

    /// Remove `exercise` from `body_part`; the body part itself stays
    pub fn remove(&mut self, body_part: &str, exercise: &str) -> Result<()> {
        let body_part = body_part.trim();
        let exercise = exercise.trim();
        let not_found = || LiftError::ExerciseNotFound {
            body_part: body_part.to_string(),
            exercise: exercise.to_string(),
        };

        let (_, exercises) = self
            .parts
            .iter_mut()
            .find(|(p, _)| p == body_part)
            .ok_or_else(not_found)?;
        let pos = exercises.iter().position(|e| e == exercise).ok_or_else(not_found)?;
        exercises.remove(pos);

        self.rebuild_index();
        Ok(())
    }

    /// Body part of `exercise`, or [`UNKNOWN_BODY_PART`]
    pub fn body_part_of(&self, exercise: &str) -> &str {
        self.index.get(exercise).map(String::as_str).unwrap_or(UNKNOWN_BODY_PART)
    }

    pub fn contains(&self, exercise: &str) -> bool {
        self.index.contains_key(exercise)
    }

    /// Body parts in declaration order
    pub fn body_parts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(p, _)| p.as_str())
    }

    pub fn exercises(&self, body_part: &str) -> &[String] {
        self.parts
            .iter()
            .find(|(p, _)| p == body_part)
            .map(|(_, e)| e.as_slice())
            .unwrap_or(&[])
    }

    /// Every exercise, grouped by body part in declaration order
    pub fn all_exercises(&self) -> Vec<&str> {
        self.parts
            .iter()
            .flat_map(|(_, exercises)| exercises.iter().map(String::as_str))
            .collect()
    }

    /// Read a taxonomy document, falling back to the built-in set
    pub fn load_or_default(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                info!("No taxonomy at {} ({}), using built-in exercises", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(taxonomy) => taxonomy,
            Err(e) => {
                warn!("Invalid taxonomy at {}: {}; using built-in exercises", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|e| LiftError::Taxonomy(e.to_string()))?;
        fs::write(path, text).map_err(|e| LiftError::Taxonomy(format!("{}: {}", path.display(), e)))
    }
}

impl Serialize for ExerciseTaxonomy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.parts.len()))?;
        for (part, exercises) in &self.parts {
            map.serialize_entry(part, exercises)?;
        }
        map.end()
    }
}

struct TaxonomyVisitor;

impl<'de> Visitor<'de> for TaxonomyVisitor {
    type Value = ExerciseTaxonomy;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of body part to a list of exercise names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        // keep document order, a BTreeMap would sort the body parts
        let mut parts: Vec<(String, Vec<String>)> = Vec::new();
        while let Some((part, exercises)) = access.next_entry::<String, Vec<String>>()? {
            parts.push((part, exercises));
        }
        ExerciseTaxonomy::from_parts(parts).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for ExerciseTaxonomy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(TaxonomyVisitor)
    }
}

/// A taxonomy tied to its document, rewritten after every change
pub struct TaxonomyFile {
    path: PathBuf,
    taxonomy: ExerciseTaxonomy,
}

impl TaxonomyFile {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let taxonomy = ExerciseTaxonomy::load_or_default(&path);
        Self { path, taxonomy }
    }

    pub fn taxonomy(&self) -> &ExerciseTaxonomy {
        &self.taxonomy
    }

    pub fn add(&mut self, body_part: &str, exercise: &str) -> Result<()> {
        let mut next = self.taxonomy.clone();
        next.add(body_part, exercise)?;
        self.commit(next)?;
        info!("Added exercise '{}' to {}", exercise.trim(), body_part.trim());
        Ok(())
    }

    pub fn remove(&mut self, body_part: &str, exercise: &str) -> Result<()> {
        let mut next = self.taxonomy.clone();
        next.remove(body_part, exercise)?;
        self.commit(next)?;
        info!("Removed exercise '{}' from {}", exercise.trim(), body_part.trim());
        Ok(())
    }

    fn commit(&mut self, next: ExerciseTaxonomy) -> Result<()> {
        next.save(&self.path)?;
        self.taxonomy = next;
        Ok(())
    }
}
