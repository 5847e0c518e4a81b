//! Student submission flow: local validation, daily quota check, upload.

use crate::api::{ApiClient, CreateSubmission};
use crate::error::ClientError;
use common::format_validation_errors;
use log::{info, warn};
use util::submission::{Category, Submission};
use validator::{Validate, ValidationError};

pub const MSG_FILE_MISSING: &str = "请先上传作品文件";
pub const MSG_QUOTA_EXCEEDED: &str = "您今天已经提交过作品了，请明天再试。";
pub const MSG_SUBMIT_FAILED: &str = "提交过程中发生错误，请稍后重试";

/// Form order, used to report validation messages top to bottom.
const FIELD_ORDER: [&str; 4] = ["student_name", "grade", "class_number", "work_title"];

fn name_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("请填写学生姓名".into()));
    }
    Ok(())
}

fn title_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("请填写作品名称".into()));
    }
    Ok(())
}

/// The uploaded work: original file name and content.
#[derive(Debug, Clone)]
pub struct WorkFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Validate)]
pub struct SubmissionForm {
    #[validate(custom(function = "name_not_blank"))]
    pub student_name: String,
    #[validate(range(min = 1, max = 6, message = "请选择年级（1-6）"))]
    pub grade: u8,
    #[validate(range(min = 1, max = 12, message = "请选择班级（1-12）"))]
    pub class_number: u8,
    pub category: Category,
    #[validate(custom(function = "title_not_blank"))]
    pub work_title: String,
    pub file: Option<WorkFile>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Caught locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error("{}", MSG_QUOTA_EXCEEDED)]
    QuotaExceeded,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(msg) => msg.clone(),
            SubmitError::QuotaExceeded => MSG_QUOTA_EXCEEDED.to_string(),
            SubmitError::Client(e) => e
                .api_message()
                .map(str::to_string)
                .unwrap_or_else(|| MSG_SUBMIT_FAILED.to_string()),
        }
    }
}

/// Rejects files whose extension is not allowed for `category`.
pub fn check_extension(category: Category, file_name: &str) -> Result<(), SubmitError> {
    if category.accepts(file_name) {
        return Ok(());
    }
    Err(SubmitError::Validation(format!(
        "格式错误：支持的格式为 {}",
        category.allowed_extensions().join(", ")
    )))
}

impl SubmissionForm {
    /// Everything that can be checked without the network.
    pub fn check(&self) -> Result<&WorkFile, SubmitError> {
        self.validate()
            .map_err(|e| SubmitError::Validation(format_validation_errors(&e, &FIELD_ORDER)))?;

        let file = self
            .file
            .as_ref()
            .ok_or_else(|| SubmitError::Validation(MSG_FILE_MISSING.to_string()))?;
        check_extension(self.category, &file.name)?;
        Ok(file)
    }
}

/// Validates, asks the backend whether the student may still submit today,
/// then uploads. Names and titles are sent trimmed.
pub async fn submit(api: &ApiClient, form: SubmissionForm) -> Result<Submission, SubmitError> {
    let file = form.check()?.clone();
    let student_name = form.student_name.trim().to_string();

    let quota = api.check_quota(&student_name).await?;
    if !quota.can_submit {
        warn!("quota exhausted for {student_name}");
        return Err(SubmitError::QuotaExceeded);
    }

    let created = api
        .create_submission(CreateSubmission {
            student_name,
            grade: form.grade,
            class_number: form.class_number,
            category: form.category,
            work_title: form.work_title.trim().to_string(),
            file_name: file.name,
            file_bytes: file.bytes,
        })
        .await?;

    info!("submission {} created", created.id);
    Ok(created)
}
