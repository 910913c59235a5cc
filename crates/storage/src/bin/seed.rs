use std::fmt;

use chrono::{DateTime, Duration, Utc};
use edu_core::model::{
    Assignment, Course, CourseId, LearnerId, Module, Question, Quiz, Score,
};
use storage::repository::{IdentityRecord, Storage, StorageError};
use url::Url;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    course_id: Option<CourseId>,
    title: String,
    learner: LearnerId,
    completions: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCourseId { raw: String },
    InvalidLearner { raw: String },
    InvalidCompletions { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCourseId { raw } => write!(f, "invalid --course-id value: {raw}"),
            ArgsError::InvalidLearner { raw } => write!(f, "invalid --learner value: {raw}"),
            ArgsError::InvalidCompletions { raw } => {
                write!(f, "invalid --completions value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("EDU_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut course_id = std::env::var("EDU_COURSE_ID")
            .ok()
            .and_then(|value| value.parse::<CourseId>().ok());
        let mut title =
            std::env::var("EDU_COURSE_TITLE").unwrap_or_else(|_| "Intro to Astronomy".into());
        let mut learner = std::env::var("EDU_LEARNER_ID")
            .ok()
            .and_then(|value| LearnerId::new(value).ok());
        let mut completions = std::env::var("EDU_COMPLETIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--course-id" => {
                    let value = require_value(&mut args, "--course-id")?;
                    let parsed = value
                        .parse::<CourseId>()
                        .map_err(|_| ArgsError::InvalidCourseId { raw: value.clone() })?;
                    course_id = Some(parsed);
                }
                "--title" => {
                    let value = require_value(&mut args, "--title")?;
                    title = value;
                }
                "--learner" => {
                    let value = require_value(&mut args, "--learner")?;
                    let parsed = LearnerId::new(value.clone())
                        .map_err(|_| ArgsError::InvalidLearner { raw: value })?;
                    learner = Some(parsed);
                }
                "--completions" => {
                    let value = require_value(&mut args, "--completions")?;
                    completions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidCompletions { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let learner = match learner {
            Some(learner) => learner,
            None => LearnerId::new("user_seed")
                .map_err(|_| ArgsError::InvalidLearner { raw: "user_seed".into() })?,
        };

        Ok(Self {
            db_url,
            course_id,
            title,
            learner,
            completions,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --course-id <hex24>       Course id to upsert (default: generated)");
    eprintln!("  --title <name>            Course title (default: Intro to Astronomy)");
    eprintln!("  --learner <id>            Learner id to seed (default: user_seed)");
    eprintln!("  --completions <n>         Number of completions to append (default: 3)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  EDU_DB_URL, EDU_COURSE_ID, EDU_COURSE_TITLE, EDU_LEARNER_ID, EDU_COMPLETIONS");
}

fn sample_modules() -> Result<Vec<Module>, Box<dyn std::error::Error>> {
    let lecture = Url::parse("https://www.youtube.com/watch?v=0rHUDWjR5gg")?;
    let questions = vec![
        Question::new(
            "Which planet is closest to the Sun?",
            vec!["Venus".into(), "Mercury".into(), "Mars".into()],
            1,
        )?,
        Question::new(
            "What force keeps planets in orbit?",
            vec!["Magnetism".into(), "Gravity".into()],
            1,
        )?,
    ];

    Ok(vec![
        Module::new(
            "The Solar System",
            "Eight planets orbit the Sun.\nThe inner four are rocky worlds.",
            Some(lecture),
            Some(Quiz::new(questions, None)),
        )?,
        Module::new(
            "Stars and Light",
            "Stars fuse hydrogen into helium.\nTheir color tells us their temperature.",
            None,
            None,
        )?,
    ])
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let course_id = args.course_id.clone().unwrap_or_else(CourseId::generate);

    let course = Course::new(
        course_id.clone(),
        args.title.clone(),
        "A guided tour of the night sky.",
        "Science",
        "Prof. Tycho",
        sample_modules()?,
        now,
        now,
    )?;

    match storage.courses.insert_course(&course).await {
        Ok(()) => {}
        Err(StorageError::Conflict) => storage.courses.update_course(&course).await?,
        Err(other) => return Err(other.into()),
    }

    storage
        .profiles
        .upsert_identity(&IdentityRecord {
            learner_id: args.learner.clone(),
            full_name: Some("Seed Learner".into()),
            email: Some("seed@example.com".into()),
            image_url: None,
        })
        .await?;

    for i in 0..args.completions {
        let completed_at = now - Duration::days(i64::from(i) * 2);
        let score = Score::percent((i as usize) % 3 + 1, 3);
        let _ = storage
            .profiles
            .record_completion(&args.learner, &course_id, score, completed_at)
            .await?;
    }

    let assignment = Assignment::new(
        course_id.clone(),
        "Observation log",
        "Record three naked-eye observations of the Moon.",
        now + Duration::days(14),
        now,
    )?;
    storage.assignments.insert_assignment(&assignment).await?;

    println!(
        "Seeded course {} ({}) with {} completions for {} into {}",
        course_id,
        args.title,
        args.completions,
        args.learner,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
