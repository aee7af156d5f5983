//! Per-user view state, passed explicitly to every handler

use crate::coach::Advice;
use crate::db::DEFAULT_OWNER;
use crate::exercises::ExerciseTaxonomy;

/// Which screen is showing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Detail(String),
}

/// Session context: created at login, cleared at logout
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    owner: Option<String>,
    view: View,
    /// `None` shows every body part
    filter: Option<String>,
    selected: usize,
    advice: Option<Advice>,
}

impl Session {
    /// Blank names fall back to the default owner
    pub fn start(owner: &str) -> Self {
        let owner = owner.trim();
        let owner = if owner.is_empty() { DEFAULT_OWNER } else { owner };
        Self {
            owner: Some(owner.to_string()),
            view: View::Dashboard,
            filter: None,
            selected: 0,
            advice: None,
        }
    }

    pub fn logout(&mut self) {
        self.owner = None;
        self.view = View::Dashboard;
        self.filter = None;
        self.selected = 0;
        self.advice = None;
    }

    pub fn is_active(&self) -> bool {
        self.owner.is_some()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn advice(&self) -> Option<&Advice> {
        self.advice.as_ref()
    }

    pub fn set_advice(&mut self, advice: Advice) {
        self.advice = Some(advice);
    }

    /// Exercises listed on the dashboard under the current filter
    pub fn visible_exercises<'t>(&self, taxonomy: &'t ExerciseTaxonomy) -> Vec<&'t str> {
        match &self.filter {
            Some(part) => taxonomy.exercises(part).iter().map(String::as_str).collect(),
            None => taxonomy.all_exercises(),
        }
    }

    pub fn selected_exercise<'t>(&self, taxonomy: &'t ExerciseTaxonomy) -> Option<&'t str> {
        self.visible_exercises(taxonomy).get(self.selected).copied()
    }

    pub fn select_next(&mut self, taxonomy: &ExerciseTaxonomy) {
        let len = self.visible_exercises(taxonomy).len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_previous(&mut self, taxonomy: &ExerciseTaxonomy) {
        let len = self.visible_exercises(taxonomy).len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Cycle All -> first part -> ... -> last part -> All
    pub fn next_filter(&mut self, taxonomy: &ExerciseTaxonomy) {
        let parts: Vec<&str> = taxonomy.body_parts().collect();
        self.filter = match self.filter.as_deref() {
            None => parts.first().map(|p| p.to_string()),
            Some(current) => match parts.iter().position(|p| *p == current) {
                Some(idx) => parts.get(idx + 1).map(|p| p.to_string()),
                None => None,
            },
        };
        self.selected = 0;
    }

    pub fn previous_filter(&mut self, taxonomy: &ExerciseTaxonomy) {
        let parts: Vec<&str> = taxonomy.body_parts().collect();
        self.filter = match self.filter.as_deref() {
            None => parts.last().map(|p| p.to_string()),
            Some(current) => match parts.iter().position(|p| *p == current) {
                Some(idx) if idx > 0 => Some(parts[idx - 1].to_string()),
                _ => None,
            },
        };
        self.selected = 0;
    }

    /// Open the detail view for the highlighted exercise
    pub fn open_selected(&mut self, taxonomy: &ExerciseTaxonomy) -> bool {
        match self.selected_exercise(taxonomy) {
            Some(exercise) => {
                self.view = View::Detail(exercise.to_string());
                true
            }
            None => false,
        }
    }

    pub fn back(&mut self) {
        self.view = View::Dashboard;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::FallbackReason;

    fn taxonomy() -> ExerciseTaxonomy {
        ExerciseTaxonomy::from_parts(vec![
            ("Chest".to_string(), vec!["Bench Press".to_string(), "Dips".to_string()]),
            ("Back".to_string(), vec!["Deadlift".to_string()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_start_and_logout() {
        let mut session = Session::start("amy");
        assert!(session.is_active());
        assert_eq!(session.owner(), Some("amy"));

        session.next_filter(&taxonomy());
        session.select_next(&taxonomy());
        assert!(session.open_selected(&taxonomy()));
        assert_eq!(session.view(), &View::Detail("Dips".to_string()));
        session.set_advice(Advice::Fallback { reason: FallbackReason::NoData, line: "go" });

        session.logout();
        assert!(!session.is_active());
        assert_eq!(session.view(), &View::Dashboard);
        assert!(session.filter().is_none());
        assert!(session.advice().is_none());
    }

    #[test]
    fn test_blank_owner_is_guest() {
        assert_eq!(Session::start("  ").owner(), Some(DEFAULT_OWNER));
    }

    #[test]
    fn test_filter_cycles_through_parts() {
        let taxonomy = taxonomy();
        let mut session = Session::start("amy");
        assert_eq!(session.visible_exercises(&taxonomy), vec!["Bench Press", "Dips", "Deadlift"]);

        session.next_filter(&taxonomy);
        assert_eq!(session.filter(), Some("Chest"));
        assert_eq!(session.visible_exercises(&taxonomy), vec!["Bench Press", "Dips"]);

        session.next_filter(&taxonomy);
        assert_eq!(session.filter(), Some("Back"));
        session.next_filter(&taxonomy);
        assert!(session.filter().is_none());

        session.previous_filter(&taxonomy);
        assert_eq!(session.filter(), Some("Back"));
        session.previous_filter(&taxonomy);
        assert_eq!(session.filter(), Some("Chest"));
        session.previous_filter(&taxonomy);
        assert!(session.filter().is_none());
    }

    #[test]
    fn test_selection_wraps_and_opens_detail() {
        let taxonomy = taxonomy();
        let mut session = Session::start("amy");

        session.select_previous(&taxonomy);
        assert_eq!(session.selected_exercise(&taxonomy), Some("Deadlift"));
        session.select_next(&taxonomy);
        assert_eq!(session.selected_exercise(&taxonomy), Some("Bench Press"));

        assert!(session.open_selected(&taxonomy));
        assert_eq!(session.view(), &View::Detail("Bench Press".to_string()));
        session.back();
        assert_eq!(session.view(), &View::Dashboard);
    }

    #[test]
    fn test_empty_taxonomy_has_nothing_to_open() {
        let taxonomy = ExerciseTaxonomy::empty();
        let mut session = Session::start("amy");
        session.select_next(&taxonomy);
        assert!(!session.open_selected(&taxonomy));
        assert_eq!(session.view(), &View::Dashboard);
    }
}
