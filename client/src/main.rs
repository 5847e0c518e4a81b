use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use client::admin::AdminController;
use client::countdown::run_countdown;
use client::submit::{SubmissionForm, WorkFile, submit};
use client::{ApiClient, Session, TokenStore};
use common::config::Config;
use common::logger::init_logger;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use util::countdown::time_left;
use util::filters::{SortConfig, SortDirection, SortKey};
use util::naming::archive_date;
use util::paths::write_output;
use util::submission::{Category, Submission, ViewMode};

#[derive(Parser, Debug)]
#[command(version, about = "Command-line client for the contest submission portal")]
struct Cli {
    /// dotenv file to load before reading configuration
    #[arg(long, default_value = ".env")]
    env_file: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortColumn {
    Name,
    Grade,
    Class,
    Category,
    Title,
    Size,
    Time,
}

impl From<SortColumn> for SortKey {
    fn from(col: SortColumn) -> Self {
        match col {
            SortColumn::Name => SortKey::StudentName,
            SortColumn::Grade => SortKey::Grade,
            SortColumn::Class => SortKey::ClassNumber,
            SortColumn::Category => SortKey::Category,
            SortColumn::Title => SortKey::WorkTitle,
            SortColumn::Size => SortKey::FileSize,
            SortColumn::Time => SortKey::SubmittedAt,
        }
    }
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Use the de-duplicated final list instead of the full history
    #[arg(long = "final")]
    final_view: bool,
    /// Filter by student name or class number
    #[arg(long)]
    search: Option<String>,
    /// Column to sort by (default: newest first)
    #[arg(long, value_enum)]
    sort: Option<SortColumn>,
    /// Sort descending
    #[arg(long)]
    desc: bool,
}

impl ViewArgs {
    fn mode(&self) -> ViewMode {
        if self.final_view { ViewMode::Final } else { ViewMode::All }
    }

    fn sort(&self) -> SortConfig {
        match self.sort {
            Some(col) => {
                let direction = if self.desc { SortDirection::Desc } else { SortDirection::Asc };
                SortConfig::new(col.into(), direction)
            }
            None => SortConfig::default(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in as administrator and remember the token
    Login {
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show submissions
    List(ViewArgs),
    /// Show totals for the chosen view
    Stats {
        #[arg(long = "final")]
        final_view: bool,
    },
    /// Download one submission's file
    Download {
        id: String,
        #[arg(long = "final")]
        final_view: bool,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Download several submissions as one zip archive
    Batch {
        #[command(flatten)]
        view: ViewArgs,
        /// Submission ids to include
        ids: Vec<String>,
        /// Include every row matching the current search
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Ask whether a student may still submit today
    Quota { name: String },
    /// Submit a work file
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        grade: u8,
        #[arg(long = "class")]
        class_number: u8,
        #[arg(long)]
        category: Category,
        #[arg(long)]
        title: String,
        file: PathBuf,
    },
    /// Time left until the submission deadline
    Countdown {
        /// Print once instead of ticking every second
        #[arg(long)]
        once: bool,
    },
}

fn controller(api: ApiClient, config: &Config) -> Result<AdminController> {
    let session = Session::init(TokenStore::new(&config.token_file))
        .context("reading stored token")?;
    Ok(AdminController::new(api, session, config.contest_name.clone()))
}

/// Loads the requested view, or fails with the message the controller produced.
async fn load(admin: &mut AdminController, mode: ViewMode) -> Result<()> {
    if !admin.is_authenticated() {
        bail!("{}", client::admin::MSG_NOT_LOGGED_IN);
    }
    if let Err(msg) = admin.set_view_mode(mode).await {
        bail!("{msg}");
    }
    Ok(())
}

fn print_row(s: &Submission, selected: bool) {
    println!(
        "{} {:<24} {:<8} {}年级 {:02}班  {:<10} {:<20} {}",
        if selected { "[x]" } else { "[ ]" },
        s.id,
        s.student_name,
        s.grade,
        s.class_number,
        s.category.label(),
        s.work_title,
        s.display_time()
    );
}

fn save(out: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    write_output(out, file_name, bytes).with_context(|| format!("writing {file_name}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::init(&cli.env_file);
    init_logger(&config.log_level, &config.log_file).context("initializing logger")?;
    log::info!("{} using backend {}", config.project_name, config.api_base_url);
    let api = ApiClient::new(&config.api_base_url).context("building HTTP client")?;

    match cli.command {
        Command::Login { password } => {
            let mut admin = controller(api, config)?;
            if let Err(msg) = admin.login(&password).await {
                bail!("{msg}");
            }
            println!("登录成功，共 {} 条提交记录", admin.table().submissions().len());
        }

        Command::Logout => {
            let mut admin = controller(api, config)?;
            admin.logout();
            println!("已退出登录");
        }

        Command::List(view) => {
            let mut admin = controller(api, config)?;
            load(&mut admin, view.mode()).await?;
            let table = admin.table_mut();
            table.set_sort(view.sort());
            table.set_search_term(view.search.clone().unwrap_or_default());

            println!("{}", view.mode().heading());
            let rows = table.rows();
            if rows.is_empty() {
                println!("（无匹配记录）");
            }
            for row in rows {
                print_row(row, false);
            }
        }

        Command::Stats { final_view } => {
            let mode = if final_view { ViewMode::Final } else { ViewMode::All };
            let mut admin = controller(api, config)?;
            load(&mut admin, mode).await?;
            let stats = admin.table().stats(Local::now().date_naive());
            let label = match mode {
                ViewMode::Final => "最终有效作品数",
                ViewMode::All => "总提交人次",
            };
            println!("{label}: {}", stats.total);
            println!("今日新增: +{}", stats.today);
        }

        Command::Download { id, final_view, out } => {
            let mode = if final_view { ViewMode::Final } else { ViewMode::All };
            let mut admin = controller(api, config)?;
            load(&mut admin, mode).await?;
            match admin.download_one(&id).await {
                Ok(file) => {
                    let path = save(&out, &file.file_name, &file.bytes)?;
                    println!("已保存 {}", path.display());
                }
                Err(msg) => bail!("{msg}"),
            }
        }

        Command::Batch { view, ids, all, out } => {
            let mut admin = controller(api, config)?;
            load(&mut admin, view.mode()).await?;
            let table = admin.table_mut();
            table.set_sort(view.sort());
            table.set_search_term(view.search.clone().unwrap_or_default());

            if all {
                table.toggle_all();
            }
            for id in &ids {
                if table.find(id).is_none() {
                    log::warn!("batch: id {id} is not in the current list");
                    continue;
                }
                if !table.selection().contains(id) {
                    table.toggle_one(id);
                }
            }

            for row in table.selected_submissions() {
                print_row(row, true);
            }
            println!("已选中 {} 项", table.selection().len());

            match admin.batch_download(archive_date(Local::now())).await {
                Ok(Some(archive)) => {
                    let path = save(&out, &archive.file_name, &archive.bytes)?;
                    println!("已保存 {}", path.display());
                }
                Ok(None) => println!("未选择任何作品"),
                Err(msg) => bail!("{msg}"),
            }
        }

        Command::Quota { name } => match api.check_quota(name.trim()).await {
            Ok(q) if q.can_submit => println!("{name} 今天还可以提交"),
            Ok(_) => println!("{}", client::submit::MSG_QUOTA_EXCEEDED),
            Err(e) => bail!("{}", e.api_message().unwrap_or(client::submit::MSG_SUBMIT_FAILED)),
        },

        Command::Submit { name, grade, class_number, category, title, file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let form = SubmissionForm {
                student_name: name,
                grade,
                class_number,
                category,
                work_title: title,
                file: Some(WorkFile { name: file_name, bytes }),
            };

            match submit(&api, form).await {
                Ok(created) => {
                    println!("提交成功！");
                    println!("太棒了，{}同学！你的{}作品已收到。", created.student_name, created.category.label());
                    println!("作品: {}", created.work_title);
                    println!("文件: {}", created.file_name);
                    println!("时间: {}", Local::now().format("%H:%M:%S"));
                }
                Err(e) => bail!("{}", e.user_message()),
            }
        }

        Command::Countdown { once } => {
            println!("{} · {}", config.school_name, config.contest_name);
            if once {
                println!("距离截止 {}", time_left(&config.contest_deadline, Utc::now()));
                return Ok(());
            }

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_signal.cancel();
                }
            });

            run_countdown(&config.contest_deadline, Duration::from_secs(1), cancel, |left| {
                print!("\r距离截止 {left}");
                let _ = std::io::stdout().flush();
            })
            .await;
            println!();
        }
    }

    Ok(())
}
