//! Command-line front end for the registrar.
//!
//! # Responsibility
//! - Resolve configuration (flags over environment over defaults).
//! - Run one registrar operation and print the result as JSON.
//! - Exit with status 2 and a stable error code when a request is rejected.

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand};
use log::info;
use registrar_core::db::migrations::latest_version;
use registrar_core::db::open_db;
use registrar_core::{
    init_logging, schedule_file_name, seed_demo_data, EnrollmentError, EnrollmentService,
    RegistrarConfig, SqliteRegistrarRepository, TermFilter,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

const REJECTED_EXIT_CODE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "registrar", version)]
#[command(about = "Course enrollment with schedule conflict checks")]
struct Cli {
    /// SQLite database file [env: REGISTRAR_DB_PATH]
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error [env: REGISTRAR_LOG_LEVEL]
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database or migrate it to the latest schema.
    Init,
    /// Load the demo catalogue into an empty database.
    Seed,
    /// List students ordered by last name.
    Students,
    /// Enroll a student into a section.
    Enroll(PairArgs),
    /// Withdraw a student from a section.
    Withdraw(PairArgs),
    /// Show a student's enrolled sections.
    Schedule(StudentTermArgs),
    /// List open sections the student is not enrolled in.
    Available(StudentTermArgs),
    /// Write the printable schedule to a text file.
    Print {
        #[command(flatten)]
        target: StudentTermArgs,

        /// Output directory.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Debug, Args)]
struct PairArgs {
    #[arg(long)]
    student: Uuid,

    #[arg(long)]
    section: Uuid,
}

#[derive(Debug, Args)]
struct StudentTermArgs {
    #[arg(long)]
    student: Uuid,

    /// Exact semester label, e.g. `Fall`.
    #[arg(long)]
    semester: Option<String>,

    #[arg(long)]
    year: Option<i32>,
}

impl StudentTermArgs {
    fn term_filter(&self) -> TermFilter {
        TermFilter {
            semester: self.semester.clone(),
            year: self.year,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match rejection(&err) {
            Some((body, code)) => {
                println!("{body}");
                ExitCode::from(code)
            }
            None => {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Maps a rejected enrollment request to its JSON body and exit status.
///
/// Returns `None` for internal failures and non-enrollment errors.
fn rejection(err: &anyhow::Error) -> Option<(Value, u8)> {
    let rejected = err.downcast_ref::<EnrollmentError>()?;
    if matches!(rejected, EnrollmentError::Repo(_)) {
        return None;
    }
    let body = json!({
        "error": rejected.code(),
        "message": rejected.to_string(),
    });
    Some((body, REJECTED_EXIT_CODE))
}

fn run(cli: Cli) -> Result<()> {
    let mut config = RegistrarConfig::from_env()?;
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }
    if let Some(level) = cli.log_level {
        config = config.with_log_level(level);
    }
    init_logging(&config.log_level, config.log_target())?;

    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;

    match cli.command {
        Command::Init => print_json(&json!({
            "db_path": config.db_path,
            "schema_version": latest_version(),
        })),
        Command::Seed => {
            let summary = seed_demo_data(&mut conn)?;
            print_json(&json!({
                "students": summary.students,
                "sections": summary.sections,
                "enrollments": summary.enrollments,
            }))
        }
        Command::Students => {
            let service = EnrollmentService::new(SqliteRegistrarRepository::new(&mut conn));
            print_json(&service.students()?)
        }
        Command::Enroll(args) => {
            let mut service = EnrollmentService::new(SqliteRegistrarRepository::new(&mut conn));
            print_json(&service.enroll(args.student, args.section)?)
        }
        Command::Withdraw(args) => {
            let mut service = EnrollmentService::new(SqliteRegistrarRepository::new(&mut conn));
            print_json(&service.withdraw(args.student, args.section)?)
        }
        Command::Schedule(args) => {
            let service = EnrollmentService::new(SqliteRegistrarRepository::new(&mut conn));
            print_json(&service.schedule(args.student, &args.term_filter())?)
        }
        Command::Available(args) => {
            let service = EnrollmentService::new(SqliteRegistrarRepository::new(&mut conn));
            print_json(&service.available_sections(args.student, &args.term_filter())?)
        }
        Command::Print { target, out_dir } => {
            let service = EnrollmentService::new(SqliteRegistrarRepository::new(&mut conn));
            let filter = target.term_filter();
            let student = service.student(target.student)?;
            let today = Local::now();
            let document = service.schedule_document(
                target.student,
                &filter,
                Some(format!("Generated on {}", today.format("%B %-d, %Y"))),
            )?;

            let path = out_dir.join(schedule_file_name(
                &student.student_code,
                &filter,
                today.year(),
            ));
            std::fs::write(&path, document.render())
                .with_context(|| format!("failed to write `{}`", path.display()))?;
            info!(
                "event=schedule_print module=cli status=ok pages={}",
                document.page_count()
            );

            print_json(&json!({
                "path": path,
                "pages": document.page_count(),
                "total_credits": document.total_credits,
            }))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
