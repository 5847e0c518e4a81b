//! Admin dashboard view-model: the fetched list plus the sort, search and
//! selection state layered over it.

use crate::filters::{SortConfig, SortKey, project};
use crate::selection::Selection;
use crate::submission::Submission;
use chrono::NaiveDate;

/// Figures shown on the dashboard stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdminStats {
    pub total: usize,
    pub today: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionTable {
    submissions: Vec<Submission>,
    sort: SortConfig,
    search_term: String,
    selection: Selection,
}

impl SubmissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a freshly fetched list. Selection starts over.
    pub fn replace(&mut self, submissions: Vec<Submission>) {
        self.submissions = submissions;
        self.selection.clear();
    }

    /// Forgets the list, the search term and the selection.
    pub fn clear(&mut self) {
        self.submissions.clear();
        self.search_term.clear();
        self.selection.clear();
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.sort = sort;
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Rows to display, in order.
    pub fn rows(&self) -> Vec<&Submission> {
        project(&self.submissions, &self.sort, &self.search_term)
    }

    pub fn toggle_one(&mut self, id: &str) {
        self.selection.toggle_one(id);
    }

    pub fn toggle_all(&mut self) {
        let visible = project(&self.submissions, &self.sort, &self.search_term);
        self.selection.toggle_all(&visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected(&self.rows())
    }

    /// Selected rows in fetched-list order, regardless of the current filter.
    pub fn selected_submissions(&self) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|s| self.selection.contains(&s.id))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    pub fn stats(&self, today: NaiveDate) -> AdminStats {
        AdminStats {
            total: self.submissions.len(),
            today: self
                .submissions
                .iter()
                .filter(|s| s.submitted_on() == Some(today))
                .count(),
        }
    }
}
