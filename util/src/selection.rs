use crate::submission::Submission;
use std::collections::HashSet;

/// Ids of the rows the admin has ticked. Independent of sort and search, so a
/// row hidden by the current filter keeps its state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn toggle_one(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// True when the view has rows and every one of them is selected.
    pub fn is_all_selected(&self, visible: &[&Submission]) -> bool {
        !visible.is_empty() && visible.iter().all(|s| self.ids.contains(&s.id))
    }

    /// Something is selected, but not the whole visible view.
    pub fn is_some_selected(&self, visible: &[&Submission]) -> bool {
        !self.ids.is_empty() && !self.is_all_selected(visible)
    }

    /// Deselects the visible rows if they are all selected, otherwise selects
    /// them all. Hidden rows are left alone; an empty view is a no-op.
    pub fn toggle_all(&mut self, visible: &[&Submission]) {
        if visible.is_empty() {
            return;
        }

        if self.is_all_selected(visible) {
            for row in visible {
                self.ids.remove(&row.id);
            }
        } else {
            for row in visible {
                self.ids.insert(row.id.clone());
            }
        }
    }

    /// Drops ids that no longer appear in `submissions`.
    pub fn retain_existing(&mut self, submissions: &[Submission]) {
        let live: HashSet<&str> = submissions.iter().map(|s| s.id.as_str()).collect();
        self.ids.retain(|id| live.contains(id.as_str()));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
