use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contest track a work is entered under.
/// Serialized in `UPPERCASE`, matching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Programming,
    Aigc,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Programming, Category::Aigc];

    /// Wire value, also used for ordering when sorting by category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Programming => "PROGRAMMING",
            Category::Aigc => "AIGC",
        }
    }

    /// Human-facing track name.
    pub fn label(self) -> &'static str {
        match self {
            Category::Programming => "图形化编程",
            Category::Aigc => "AIGC 创意",
        }
    }

    /// Lower-case extensions (with the leading dot) accepted for upload.
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Category::Programming => &[".sb3", ".mp"],
            Category::Aigc => &[".png", ".jpg", ".jpeg"],
        }
    }

    /// Case-insensitive check on the suffix from the last `.`.
    /// A name without any dot is never accepted.
    pub fn accepts(self, file_name: &str) -> bool {
        match file_name.rfind('.') {
            Some(idx) => {
                let ext = file_name[idx..].to_lowercase();
                self.allowed_extensions().contains(&ext.as_str())
            }
            None => false,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROGRAMMING" => Ok(Category::Programming),
            "AIGC" => Ok(Category::Aigc),
            other => Err(format!("unknown category '{other}' (expected PROGRAMMING or AIGC)")),
        }
    }
}

/// Which backend listing the dashboard is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Full submission history.
    #[default]
    All,
    /// Latest submission per student per category, computed by the backend.
    Final,
}

impl ViewMode {
    /// Label used in archive folder and file names.
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::All => "全部提交",
            ViewMode::Final => "最终作品",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            ViewMode::All => "所有提交历史",
            ViewMode::Final => "最终作品列表",
        }
    }
}

/// A submission record as returned by the backend. Read-only on this side.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub student_name: String,
    pub grade: u8,
    pub class_number: u8,
    pub category: Category,
    pub work_title: String,
    pub file_name: String,
    pub stored_file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub submitted_at: String,
}

impl Submission {
    fn submitted_local(&self) -> Option<DateTime<Local>> {
        DateTime::parse_from_rfc3339(&self.submitted_at)
            .ok()
            .map(|t| t.with_timezone(&Local))
    }

    /// Local calendar date of submission. Accepts RFC 3339 timestamps or a
    /// bare `YYYY-MM-DD`.
    pub fn submitted_on(&self) -> Option<NaiveDate> {
        self.submitted_local()
            .map(|t| t.date_naive())
            .or_else(|| NaiveDate::parse_from_str(&self.submitted_at, "%Y-%m-%d").ok())
    }

    pub fn display_time(&self) -> String {
        match self.submitted_local() {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.submitted_at.clone(),
        }
    }
}
