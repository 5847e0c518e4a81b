use crate::submission::Submission;
use std::cmp::Ordering;

/// Column the submission table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    StudentName,
    Grade,
    ClassNumber,
    Category,
    WorkTitle,
    FileName,
    StoredFileName,
    FileType,
    FileSize,
    SubmittedAt,
}

impl SortKey {
    /// Three-way comparison of two submissions on this column.
    pub fn compare(self, a: &Submission, b: &Submission) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::StudentName => a.student_name.cmp(&b.student_name),
            SortKey::Grade => a.grade.cmp(&b.grade),
            SortKey::ClassNumber => a.class_number.cmp(&b.class_number),
            SortKey::Category => a.category.as_str().cmp(b.category.as_str()),
            SortKey::WorkTitle => a.work_title.cmp(&b.work_title),
            SortKey::FileName => a.file_name.cmp(&b.file_name),
            SortKey::StoredFileName => a.stored_file_name.cmp(&b.stored_file_name),
            SortKey::FileType => a.file_type.cmp(&b.file_type),
            SortKey::FileSize => a.file_size.cmp(&b.file_size),
            // ISO-8601 strings order chronologically
            SortKey::SubmittedAt => a.submitted_at.cmp(&b.submitted_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    /// Newest submissions first.
    fn default() -> Self {
        Self {
            key: SortKey::SubmittedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Selecting the current key flips the direction; a new key starts ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn compare(&self, a: &Submission, b: &Submission) -> Ordering {
        let ord = self.key.compare(a, b);
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Stable sort into a new vector of borrowed rows; the input is untouched.
pub fn sort_submissions<'a>(submissions: &'a [Submission], sort: &SortConfig) -> Vec<&'a Submission> {
    let mut rows: Vec<&Submission> = submissions.iter().collect();
    rows.sort_by(|a, b| sort.compare(a, b));
    rows
}

/// Normalizes a raw search box value: trimmed and lower-cased.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// `term` must already be normalized. Matches on student name (case-insensitive)
/// or on the class number written in decimal.
pub fn matches_search(submission: &Submission, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    submission.student_name.to_lowercase().contains(term)
        || submission.class_number.to_string().contains(term)
}

/// Sorted, filtered projection of `submissions` for display. An empty result is valid.
pub fn project<'a>(
    submissions: &'a [Submission],
    sort: &SortConfig,
    search_term: &str,
) -> Vec<&'a Submission> {
    let term = normalize_term(search_term);
    let mut rows = sort_submissions(submissions, sort);
    if !term.is_empty() {
        rows.retain(|s| matches_search(s, &term));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::tests::sample;

    fn ids(rows: &[&Submission]) -> Vec<String> {
        rows.iter().map(|s| s.id.clone()).collect()
    }

    fn roster() -> Vec<Submission> {
        vec![
            sample("1", "Charlie", 4, 2, "2025-01-03T09:00:00Z"),
            sample("2", "alice", 3, 11, "2025-01-01T09:00:00Z"),
            sample("3", "Bob", 3, 1, "2025-01-02T09:00:00Z"),
            sample("4", "Alicia", 4, 2, "2025-01-04T09:00:00Z"),
        ]
    }

    #[test]
    fn toggle_cycles_from_ascending() {
        let mut sort = SortConfig::default();
        sort.toggle(SortKey::StudentName);
        assert_eq!(sort.direction, SortDirection::Asc);
        sort.toggle(SortKey::StudentName);
        assert_eq!(sort.direction, SortDirection::Desc);
        sort.toggle(SortKey::StudentName);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn new_key_resets_to_ascending() {
        let mut sort = SortConfig::new(SortKey::Grade, SortDirection::Desc);
        sort.toggle(SortKey::ClassNumber);
        assert_eq!(sort, SortConfig::new(SortKey::ClassNumber, SortDirection::Asc));
    }

    #[test]
    fn default_sort_is_newest_first() {
        let list = roster();
        let rows = sort_submissions(&list, &SortConfig::default());
        assert_eq!(ids(&rows), vec!["4", "1", "3", "2"]);
    }

    #[test]
    fn sort_is_stable_in_both_directions() {
        let list = roster();

        let asc = sort_submissions(&list, &SortConfig::new(SortKey::Grade, SortDirection::Asc));
        assert_eq!(ids(&asc), vec!["2", "3", "1", "4"]);

        let desc = sort_submissions(&list, &SortConfig::new(SortKey::Grade, SortDirection::Desc));
        assert_eq!(ids(&desc), vec!["1", "4", "2", "3"]);
    }

    #[test]
    fn sorting_does_not_touch_input() {
        let list = roster();
        let before = list.clone();
        let _ = project(&list, &SortConfig::new(SortKey::StudentName, SortDirection::Asc), "a");
        assert_eq!(list, before);
    }

    #[test]
    fn search_matches_name_case_insensitively() {
        let list = roster();
        let rows = project(&list, &SortConfig::new(SortKey::Id, SortDirection::Asc), "  ALI ");
        assert_eq!(ids(&rows), vec!["2", "4"]);
    }

    #[test]
    fn search_matches_class_number_digits() {
        let list = roster();
        let rows = project(&list, &SortConfig::new(SortKey::Id, SortDirection::Asc), "1");
        // class 11 and class 1
        assert_eq!(ids(&rows), vec!["2", "3"]);
    }

    #[test]
    fn filtered_rows_are_a_matching_subset() {
        let list = roster();
        for term in ["a", "b", "2", "zz", "LIC", ""] {
            let rows = project(&list, &SortConfig::default(), term);
            let normalized = normalize_term(term);
            assert!(rows.len() <= list.len());
            for row in rows {
                assert!(list.iter().any(|s| s.id == row.id));
                assert!(matches_search(row, &normalized));
            }
        }
    }

    #[test]
    fn empty_result_is_fine() {
        let list = roster();
        assert!(project(&list, &SortConfig::default(), "nobody").is_empty());
    }
}
