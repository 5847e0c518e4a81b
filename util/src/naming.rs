use crate::submission::{Submission, ViewMode};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

const TITLE_MAX_CHARS: usize = 20;

/// Suffix starting at the last `.` of `file_name`, or empty.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => "",
    }
}

/// Replaces characters that are illegal in file names with `_` and keeps at
/// most 20 characters.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .take(TITLE_MAX_CHARS)
        .collect()
}

/// `{grade}年级_{class:02}班_{name}_{title}{ext}`
pub fn download_name(submission: &Submission) -> String {
    format!(
        "{}年级_{:02}班_{}_{}{}",
        submission.grade,
        submission.class_number,
        submission.student_name,
        sanitize_title(&submission.work_title),
        file_extension(&submission.file_name)
    )
}

/// Directory inside a batch archive holding every entry.
pub fn archive_folder_name(contest_name: &str, mode: ViewMode) -> String {
    format!("{}_{}", contest_name, mode.label())
}

/// Date stamped into archive names: the UTC calendar day of `now`.
pub fn archive_date<Tz: TimeZone>(now: DateTime<Tz>) -> NaiveDate {
    now.with_timezone(&Utc).date_naive()
}

pub fn archive_file_name(mode: ViewMode, date: NaiveDate, file_count: usize) -> String {
    format!(
        "批量下载_{}_{}_{}个文件.zip",
        mode.label(),
        date.format("%Y-%m-%d"),
        file_count
    )
}
