use once_cell::sync::OnceCell;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub api_base_url: String,
    pub contest_name: String,
    pub school_name: String,
    pub contest_deadline: String,
    pub token_file: String,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    /// Reads the configuration from the process environment without caching it.
    pub fn load() -> Self {
        let project_name = env::var("PROJECT_NAME").unwrap_or_else(|_| "contest-portal".into());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/portal.log".into());
        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();
        let contest_name =
            env::var("CONTEST_NAME").unwrap_or_else(|_| "2025图形化编程创意赛".into());
        let school_name =
            env::var("SCHOOL_NAME").unwrap_or_else(|_| "中山市光正实验学校".into());
        let contest_deadline = env::var("CONTEST_DEADLINE")
            .unwrap_or_else(|_| "2025-12-30T23:59:59.000Z".into());
        let token_file =
            env::var("TOKEN_FILE").unwrap_or_else(|_| ".portal/admin_token".into());

        Config {
            project_name,
            log_level,
            log_file,
            api_base_url,
            contest_name,
            school_name,
            contest_deadline,
            token_file,
        }
    }

    /// Loads `env_path` (if present) into the environment and caches the result.
    pub fn init(env_path: &str) -> &'static Self {
        dotenvy::from_filename(env_path).ok();
        CONFIG.get_or_init(Self::load)
    }
}
