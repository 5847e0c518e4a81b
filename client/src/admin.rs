//! Admin dashboard controller: session, data loading and the actions wired
//! to the submission table. Every failure comes back as a message ready to
//! show; nothing here is fatal.

use crate::api::ApiClient;
use crate::archive::{BatchArchive, BatchRequest, build_batch_archive};
use crate::error::ClientError;
use crate::session::{AuthToken, Session};
use bytes::Bytes;
use chrono::NaiveDate;
use log::{error, info, warn};
use util::naming::download_name;
use util::submission::ViewMode;
use util::table::SubmissionTable;

pub const MSG_BAD_PASSWORD: &str = "密码错误或服务不可用";
pub const MSG_LOGIN_FAILED: &str = "登录失败，请稍后重试";
pub const MSG_LOAD_FAILED: &str = "加载数据失败，请稍后重试";
pub const MSG_DOWNLOAD_FAILED: &str = "下载失败，请稍后重试";
pub const MSG_ARCHIVE_FAILED: &str = "打包失败，请稍后重试";
pub const MSG_SESSION_EXPIRED: &str = "登录已过期，请重新登录";
pub const MSG_NOT_LOGGED_IN: &str = "请先登录";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    Unauthenticated,
    Loading,
    Idle,
}

/// A single file ready to be saved under its generated name.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

pub struct AdminController {
    api: ApiClient,
    session: Session,
    table: SubmissionTable,
    view_mode: ViewMode,
    contest_name: String,
    loading: bool,
}

impl AdminController {
    pub fn new(api: ApiClient, session: Session, contest_name: impl Into<String>) -> Self {
        Self {
            api,
            session,
            table: SubmissionTable::new(),
            view_mode: ViewMode::default(),
            contest_name: contest_name.into(),
            loading: false,
        }
    }

    pub fn state(&self) -> AdminState {
        if !self.session.is_active() {
            AdminState::Unauthenticated
        } else if self.loading {
            AdminState::Loading
        } else {
            AdminState::Idle
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_active()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn table(&self) -> &SubmissionTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut SubmissionTable {
        &mut self.table
    }

    fn token(&self) -> Option<AuthToken> {
        self.session.token().cloned()
    }

    fn end_session(&mut self) {
        if let Err(e) = self.session.end() {
            warn!("could not remove stored token: {e}");
        }
    }

    /// Drops the session after the backend rejected the token.
    fn expire(&mut self) -> String {
        info!("token rejected, returning to login");
        self.end_session();
        self.table.clear();
        MSG_SESSION_EXPIRED.to_string()
    }

    /// Exchanges the password for a token, stores it and loads the current view.
    pub async fn login(&mut self, password: &str) -> Result<(), String> {
        let response = match self.api.login(password).await {
            Ok(r) => r,
            Err(ClientError::Unauthorized(_)) => return Err(MSG_BAD_PASSWORD.to_string()),
            Err(ClientError::Api(e)) => return Err(e.message),
            Err(e) => {
                error!("login failed: {e}");
                return Err(MSG_LOGIN_FAILED.to_string());
            }
        };

        if let Err(e) = self.session.begin(AuthToken::new(response.access_token)) {
            error!("could not persist token: {e}");
            return Err(MSG_LOGIN_FAILED.to_string());
        }
        info!("admin logged in");
        self.refresh().await
    }

    /// Refetches the list for the current view mode. Selection starts over.
    pub async fn refresh(&mut self) -> Result<(), String> {
        let Some(token) = self.token() else {
            return Err(MSG_NOT_LOGGED_IN.to_string());
        };

        self.loading = true;
        self.table.clear_selection();
        let result = self.api.list_submissions(&token, self.view_mode).await;
        self.loading = false;

        match result {
            Ok(list) => {
                info!("loaded {} submissions ({:?})", list.len(), self.view_mode);
                self.table.replace(list);
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(self.expire()),
            Err(e) => {
                error!("loading submissions failed: {e}");
                Err(MSG_LOAD_FAILED.to_string())
            }
        }
    }

    /// Switches between full history and the final list, refetching.
    pub async fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), String> {
        self.view_mode = mode;
        self.refresh().await
    }

    pub fn logout(&mut self) {
        self.end_session();
        self.table.clear();
        info!("admin logged out");
    }

    pub async fn download_one(&mut self, id: &str) -> Result<DownloadedFile, String> {
        let Some(token) = self.token() else {
            return Err(MSG_NOT_LOGGED_IN.to_string());
        };
        let Some(submission) = self.table.find(id) else {
            return Err(MSG_DOWNLOAD_FAILED.to_string());
        };
        let file_name = download_name(submission);

        match self.api.download_file(id, &token).await {
            Ok(bytes) => Ok(DownloadedFile { file_name, bytes }),
            Err(e) if e.is_unauthorized() => Err(self.expire()),
            Err(e) => {
                error!("download of {id} failed: {e}");
                Err(MSG_DOWNLOAD_FAILED.to_string())
            }
        }
    }

    /// Packs every selected submission into one archive. `Ok(None)` when there
    /// is nothing to do. Files that fail to download are left out silently;
    /// the selection is cleared once the archive is built. A 401 on any file
    /// ends the session instead.
    pub async fn batch_download(&mut self, date: NaiveDate) -> Result<Option<BatchArchive>, String> {
        let Some(token) = self.token() else {
            return Ok(None);
        };
        if self.table.selection().is_empty() {
            return Ok(None);
        }

        let selected = self.table.selected_submissions();
        let request = BatchRequest {
            submissions: &selected,
            token: &token,
            mode: self.view_mode,
            contest_name: &self.contest_name,
            date,
        };

        match build_batch_archive(&self.api, request).await {
            Ok(archive) if archive.unauthorized => Err(self.expire()),
            Ok(archive) => {
                self.table.clear_selection();
                Ok(Some(archive))
            }
            Err(e) => {
                error!("building archive failed: {e}");
                Err(MSG_ARCHIVE_FAILED.to_string())
            }
        }
    }
}
