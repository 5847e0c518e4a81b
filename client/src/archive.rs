//! Batch download: fetch every selected submission's file concurrently and
//! pack the ones that arrived into a single zip.

use crate::api::FileFetcher;
use crate::session::AuthToken;
use bytes::Bytes;
use chrono::NaiveDate;
use futures::future::join_all;
use log::{info, warn};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use util::naming::{archive_file_name, archive_folder_name, download_name};
use util::submission::{Submission, ViewMode};
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The finished archive, ready to be written out.
#[derive(Debug, Clone)]
pub struct BatchArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Number of files that were fetched successfully.
    pub fetched: usize,
    /// Ids whose fetch failed; they are absent from the archive.
    pub failed_ids: Vec<String>,
    /// Set when any fetch was rejected with 401.
    pub unauthorized: bool,
}

/// What goes into one batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    pub submissions: &'a [&'a Submission],
    pub token: &'a AuthToken,
    pub mode: ViewMode,
    pub contest_name: &'a str,
    pub date: NaiveDate,
}

/// Fetches all files at once and waits for every fetch to settle. A failed
/// fetch only drops that file; the archive is still produced, empty if
/// nothing arrived. Only zip assembly itself can fail the batch.
pub async fn build_batch_archive<F: FileFetcher>(
    fetcher: &F,
    request: BatchRequest<'_>,
) -> Result<BatchArchive, ArchiveError> {
    let downloads = request.submissions.iter().map(|submission| async move {
        match fetcher.fetch_file(&submission.id, request.token).await {
            Ok(bytes) => Ok((download_name(submission), bytes)),
            Err(e) => {
                warn!("batch: skipping submission {}: {}", submission.id, e);
                Err((submission.id.clone(), e.is_unauthorized()))
            }
        }
    });

    let mut files = Vec::new();
    let mut failed_ids = Vec::new();
    let mut unauthorized = false;
    for outcome in join_all(downloads).await {
        match outcome {
            Ok(file) => files.push(file),
            Err((id, rejected)) => {
                unauthorized |= rejected;
                failed_ids.push(id);
            }
        }
    }

    let fetched = files.len();
    let folder = archive_folder_name(request.contest_name, request.mode);
    let bytes = tokio::task::spawn_blocking(move || zip_entries(&folder, files)).await??;

    info!(
        "batch: packed {} of {} files ({} failed)",
        fetched,
        request.submissions.len(),
        failed_ids.len()
    );

    Ok(BatchArchive {
        file_name: archive_file_name(request.mode, request.date, fetched),
        bytes,
        fetched,
        failed_ids,
        unauthorized,
    })
}

/// Writes `files` under `folder/` in memory. Entries sharing a name collapse
/// into one, holding the later file's content at the earlier file's position.
pub fn zip_entries(folder: &str, files: Vec<(String, Bytes)>) -> Result<Vec<u8>, ArchiveError> {
    let mut entries: Vec<(String, Bytes)> = Vec::with_capacity(files.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (name, bytes) in files {
        match positions.get(&name) {
            Some(&idx) => entries[idx].1 = bytes,
            None => {
                positions.insert(name.clone(), entries.len());
                entries.push((name, bytes));
            }
        }
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options: zip::write::FileOptions<'_, ()> =
        zip::write::FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.add_directory(format!("{folder}/"), options.clone())?;
    for (name, bytes) in entries {
        zip.start_file(format!("{folder}/{name}"), options.clone())?;
        zip.write_all(&bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ClientError};
    use std::collections::HashSet;
    use std::future::Future;
    use std::io::Read;
    use util::submission::Category;
    use zip::ZipArchive;

    struct StubFetcher {
        failing: HashSet<String>,
        status: u16,
    }

    impl StubFetcher {
        fn failing(ids: &[&str]) -> Self {
            Self {
                failing: ids.iter().map(|s| s.to_string()).collect(),
                status: 500,
            }
        }

        fn rejecting(ids: &[&str]) -> Self {
            Self {
                status: 401,
                ..Self::failing(ids)
            }
        }
    }

    impl FileFetcher for StubFetcher {
        fn fetch_file(
            &self,
            id: &str,
            _token: &AuthToken,
        ) -> impl Future<Output = Result<Bytes, ClientError>> + Send {
            let result = if self.failing.contains(id) {
                Err(ClientError::from_api(ApiError::generic(self.status)))
            } else {
                Ok(Bytes::from(format!("content of {id}")))
            };
            async move { result }
        }
    }

    fn submission(id: &str, name: &str, title: &str) -> Submission {
        Submission {
            id: id.into(),
            student_name: name.into(),
            grade: 3,
            class_number: 1,
            category: Category::Programming,
            work_title: title.into(),
            file_name: "work.sb3".into(),
            stored_file_name: format!("{id}.sb3"),
            file_type: "application/octet-stream".into(),
            file_size: 10,
            submitted_at: "2025-01-05T08:00:00Z".into(),
        }
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .filter_map(|i| {
                let file = archive.by_index(i).unwrap();
                (!file.is_dir()).then(|| file.name().to_string())
            })
            .collect()
    }

    async fn run(fetcher: &StubFetcher, subs: &[Submission]) -> BatchArchive {
        let refs: Vec<&Submission> = subs.iter().collect();
        let token = AuthToken::new("t");
        build_batch_archive(
            fetcher,
            BatchRequest {
                submissions: &refs,
                token: &token,
                mode: ViewMode::Final,
                contest_name: "2025图形化编程创意赛",
                date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn one_failed_fetch_leaves_the_rest() {
        let subs = vec![
            submission("1", "Alice", "Maze"),
            submission("2", "Bob", "Racer"),
            submission("3", "Cathy", "Garden"),
        ];
        let archive = run(&StubFetcher::failing(&["2"]), &subs).await;

        assert_eq!(archive.fetched, 2);
        assert_eq!(archive.failed_ids, vec!["2".to_string()]);
        assert!(!archive.unauthorized);
        assert_eq!(archive.file_name, "批量下载_最终作品_2025-01-06_2个文件.zip");
        assert_eq!(
            entry_names(&archive.bytes),
            vec![
                "2025图形化编程创意赛_最终作品/3年级_01班_Alice_Maze.sb3".to_string(),
                "2025图形化编程创意赛_最终作品/3年级_01班_Cathy_Garden.sb3".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn all_failed_still_yields_an_archive() {
        let subs = vec![submission("1", "Alice", "Maze")];
        let archive = run(&StubFetcher::failing(&["1"]), &subs).await;
        assert_eq!(archive.fetched, 0);
        assert!(entry_names(&archive.bytes).is_empty());
        assert!(ZipArchive::new(Cursor::new(&archive.bytes)).is_ok());
    }

    #[tokio::test]
    async fn rejected_token_is_reported() {
        let subs = vec![submission("1", "Alice", "Maze"), submission("2", "Bob", "Racer")];
        let archive = run(&StubFetcher::rejecting(&["2"]), &subs).await;
        assert!(archive.unauthorized);
        assert_eq!(archive.fetched, 1);
        assert_eq!(archive.failed_ids, vec!["2".to_string()]);
    }

    #[tokio::test]
    async fn entries_carry_fetched_content() {
        let subs = vec![submission("7", "Dan", "Rocket")];
        let archive = run(&StubFetcher::failing(&[]), &subs).await;

        let mut zip = ZipArchive::new(Cursor::new(&archive.bytes)).unwrap();
        let mut file = zip
            .by_name("2025图形化编程创意赛_最终作品/3年级_01班_Dan_Rocket.sb3")
            .unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "content of 7");
    }

    #[test]
    fn duplicate_names_keep_the_later_file() {
        let bytes = zip_entries(
            "box",
            vec![
                ("same.sb3".into(), Bytes::from_static(b"old")),
                ("other.sb3".into(), Bytes::from_static(b"x")),
                ("same.sb3".into(), Bytes::from_static(b"new")),
            ],
        )
        .unwrap();

        assert_eq!(entry_names(&bytes), vec!["box/same.sb3", "box/other.sb3"]);
        let mut zip = ZipArchive::new(Cursor::new(&bytes)).unwrap();
        let mut content = String::new();
        zip.by_name("box/same.sb3").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "new");
    }
}
