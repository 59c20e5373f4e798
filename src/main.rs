//! CLI entry point for the relative grading tool.
//!
//! Provides subcommands for grading a single course sheet, grading a
//! multi-subject semester sheet with grace marks, and writing an input
//! template.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relative_grader::{
    chart::{render_bars, render_boundaries, render_svg},
    config::{ConfigOverrides, CourseType, GradingConfig, Protocol},
    grading::{CourseOutcome, GradingEngine},
    output::{
        CourseReport, print_pretty, write_boundaries, write_json, write_results_file,
        write_results_stdout, write_template,
    },
    parser::read_class_file,
    semester::{grade_semester, read_semester_file, write_detailed, write_master_sheet},
    summary::CourseSummary,
};
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "relative_grader")]
#[command(about = "Computes relative grades for a class from raw exam marks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a single course from a CSV of id, marks, attendance, ese_marks
    Grade {
        /// Student CSV to grade
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// CSV file to write results to, or `-` for stdout
        #[arg(short, long, default_value = "final_grades.csv")]
        output: PathBuf,

        /// Optional: JSON grading config (CLI flags take precedence)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Total course marks (internal + ESE)
        #[arg(long)]
        total_max: Option<f64>,

        /// ESE maximum marks, used for the 20% rule
        #[arg(long)]
        ese_max: Option<f64>,

        /// Course type
        #[arg(long, value_enum)]
        course_type: Option<CourseType>,

        /// Statistical protocol: a (exclusive) or b (inclusive)
        #[arg(short, long, value_enum)]
        protocol: Option<Protocol>,

        /// Optional: write the boundary cut-offs to this CSV
        #[arg(long)]
        boundaries: Option<PathBuf>,

        /// Optional: write the grade distribution as an SVG chart
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Optional: write a JSON report of the run
        #[arg(long)]
        json: Option<PathBuf>,

        /// Gzip compress the results CSV
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Grade a multi-subject semester CSV, applying grace marks and SGPA
    Semester {
        /// Semester CSV to grade
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// CSV file to write the master sheet to
        #[arg(short, long, default_value = "master_sheet.csv")]
        output: PathBuf,

        /// Optional: write every subject entry with grade points and thresholds
        #[arg(short, long)]
        detailed: Option<PathBuf>,

        /// Statistical protocol: a (exclusive) or b (inclusive)
        #[arg(short, long, value_enum, default_value_t = Protocol::Exclusive)]
        protocol: Protocol,
    },
    /// Write a sample input CSV
    Template {
        #[arg(short, long, default_value = "template.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/relative_grader.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("relative_grader.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grade {
            input,
            output,
            config,
            total_max,
            ese_max,
            course_type,
            protocol,
            boundaries,
            chart,
            json,
            gzip,
        } => {
            let overrides = ConfigOverrides {
                total_max_marks: total_max,
                ese_max_marks: ese_max,
                course_type,
                protocol,
            };
            let config = load_config(config.as_deref(), &overrides)?;

            grade_course(&input, &output, config, boundaries, chart, json, gzip)?;
        }
        Commands::Semester {
            input,
            output,
            detailed,
            protocol,
        } => {
            grade_semester_sheet(&input, &output, detailed.as_deref(), protocol)?;
        }
        Commands::Template { output } => {
            let file = File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            write_template(file)?;
            info!(path = %output.display(), "Template written");
        }
    }

    Ok(())
}

/// Builds the course config from defaults, an optional JSON file and CLI flags.
fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<GradingConfig> {
    let base = match path {
        Some(path) => GradingConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GradingConfig::default(),
    };
    let config = overrides.apply(base);
    config.validate()?;
    Ok(config)
}

/// Grades one course sheet, prints the report and writes the requested files.
#[tracing::instrument(skip(config, boundaries_path, chart_path, json_path), fields(input = %input.display()))]
fn grade_course(
    input: &Path,
    output: &Path,
    config: GradingConfig,
    boundaries_path: Option<PathBuf>,
    chart_path: Option<PathBuf>,
    json_path: Option<PathBuf>,
    gzip: bool,
) -> Result<()> {
    let sheet = read_class_file(input)
        .with_context(|| format!("Failed to read class sheet {}", input.display()))?;

    info!(
        total_max = config.total_max_marks,
        ese_max = config.ese_max(),
        course_type = %config.course_type,
        protocol = %config.protocol,
        pass_marks = config.pass_marks(),
        ese_hurdle = config.ese_hurdle(),
        floor = config.floor_marks(),
        "Rules in effect"
    );

    let engine = GradingEngine::new(config.clone())?;
    let outcome = engine.process(sheet.students);
    let summary = CourseSummary::from_outcome(&outcome, config.attendance_threshold);

    let text = render_summary(&summary, &outcome);
    let to_stdout = output == Path::new("-");
    // Results own stdout when piped, so the summary moves to stderr.
    if to_stdout {
        eprint!("{text}");
        write_results_stdout(&sheet.extra_columns, &outcome.students, gzip)
            .context("Failed to write results to stdout")?;
    } else {
        print!("{text}");
        write_results_file(output, &sheet.extra_columns, &outcome.students, gzip)
            .with_context(|| format!("Failed to write results {}", output.display()))?;
    }

    if let Some(path) = boundaries_path {
        write_boundaries(&path, &outcome.boundaries)
            .with_context(|| format!("Failed to write boundaries {}", path.display()))?;
    }

    if let Some(path) = chart_path {
        std::fs::write(&path, render_svg(&summary.distribution))
            .with_context(|| format!("Failed to write chart {}", path.display()))?;
        info!(path = %path.display(), "Chart written");
    }

    let report = CourseReport::new(&config, &outcome, &summary);
    print_pretty(&report);
    if let Some(path) = json_path {
        write_json(&path, &report)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    Ok(())
}

/// Formats the metrics, events, distribution and cut-offs shown after grading.
fn render_summary(summary: &CourseSummary, outcome: &CourseOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total students:  {}\n", summary.total_students));
    out.push_str(&format!("Raw average:     {:.2}\n", summary.raw_average));
    out.push_str(&format!("Method used:     {}\n", summary.method));
    out.push_str(&format!("Pass percentage: {:.1}%\n\n", summary.pass_percentage));
    for event in &outcome.events {
        out.push_str(&format!("- {event}\n"));
    }
    out.push_str("\nGrade distribution\n");
    out.push_str(&render_bars(&summary.distribution));
    out.push('\n');
    out.push_str(&render_boundaries(&outcome.boundaries));
    out
}

/// Grades a semester sheet and writes the master sheet (and detail sheet).
#[tracing::instrument(skip(detailed), fields(input = %input.display()))]
fn grade_semester_sheet(
    input: &Path,
    output: &Path,
    detailed: Option<&Path>,
    protocol: Protocol,
) -> Result<()> {
    let rows = read_semester_file(input)
        .with_context(|| format!("Failed to read semester sheet {}", input.display()))?;
    let outcome = grade_semester(rows, protocol)?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    write_master_sheet(file, &outcome)?;
    info!(path = %output.display(), "Master sheet written");

    if let Some(path) = detailed {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_detailed(file, &outcome)?;
        info!(path = %path.display(), "Detailed sheet written");
    }

    let graced: usize = outcome.summaries.iter().map(|s| s.graced_count).sum();
    println!("Students: {}", outcome.summaries.len());
    println!("Subjects: {}", outcome.subjects.join(", "));
    println!("Graced:   {graced}");

    Ok(())
}
