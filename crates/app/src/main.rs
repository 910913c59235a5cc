use std::fmt;

use edu_core::model::LearnerId;
use edu_core::video::embed_url;
use services::{AppServices, Clock};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingLearner,
    InvalidLearner { raw: String },
    InvalidLimit { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingLearner => write!(f, "--learner is required"),
            ArgsError::InvalidLearner { raw } => write!(f, "invalid --learner value: {raw}"),
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Courses,
    Progress,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "courses" => Some(Self::Courses),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    learner: Option<LearnerId>,
    limit: u32,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("EDU_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut learner = std::env::var("EDU_LEARNER_ID")
            .ok()
            .and_then(|value| LearnerId::new(value).ok());
        let mut limit = 64;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--learner" => {
                    let value = require_value(args, "--learner")?;
                    let parsed = LearnerId::new(value.clone())
                        .map_err(|_| ArgsError::InvalidLearner { raw: value })?;
                    learner = Some(parsed);
                }
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    limit = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            learner,
            limit,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- courses  [--db <sqlite_url>] [--limit <n>]");
    eprintln!("  cargo run -p app -- progress [--db <sqlite_url>] --learner <id>");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:dev.sqlite3");
    eprintln!("  --limit 64");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EDU_DB_URL, EDU_LEARNER_ID");
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn show_courses(services: &AppServices, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let courses = services.course_service().list_courses(limit).await?;
    if courses.is_empty() {
        println!("No courses in the catalog.");
        return Ok(());
    }

    for course in courses {
        let quizzed = course
            .modules()
            .iter()
            .filter(|m| m.quiz().is_some())
            .count();
        println!(
            "{}  {} [{}] by {} — {} modules ({} quizzed)",
            course.id(),
            course.title(),
            course.subject(),
            course.professor(),
            course.modules().len(),
            quizzed,
        );
        for module in course.modules() {
            if let Some(video) = module.video_url() {
                match embed_url(video) {
                    Some(embed) => println!("    {}: video {embed}", module.title()),
                    None => println!("    {}: video {video} (not embeddable)", module.title()),
                }
            }
        }
    }
    Ok(())
}

async fn show_progress(
    services: &AppServices,
    learner: &LearnerId,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = services.progress_service();

    println!("Completed courses for {learner}:");
    for row in progress.completed_courses(learner).await? {
        println!(
            "  {}  {} [{}] — {}%",
            row.completed_at.format("%Y-%m-%d"),
            row.title,
            row.subject,
            row.score,
        );
    }

    println!("Averages:");
    for average in progress.course_averages(learner).await? {
        println!("  {}: {:.1}", average.label, average.average);
    }

    println!("Trend:");
    for point in progress.score_trend(learner).await? {
        println!("  {}  {}", point.completed_at.format("%Y-%m-%d"), point.score);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Courses,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Courses,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup; the services stay storage-agnostic.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;

    match cmd {
        Command::Courses => show_courses(&services, parsed.limit).await,
        Command::Progress => {
            let learner = parsed.learner.ok_or(ArgsError::MissingLearner)?;
            show_progress(&services, &learner).await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
