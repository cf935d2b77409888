//! Command-line syllabus settings editor with auto-save.
//!
//! Reads `field=value` lines from stdin and applies them to the settings
//! document, which is saved automatically after a quiet period.
//!
//! Commands: `:save` saves now, `:status` prints the save status, `:reset`
//! clears the status, `:fields` lists editable fields. End of input saves and
//! exits.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;

use syllabus::config::AppConfig;
use syllabus::constants::DEFAULT_DOCUMENT_FILENAME;
use syllabus::save::JsonFilePersister;
use syllabus::{AutoSaveController, AutoSaveOptions, SaveIndicator, SaveOutcome, SyllabusSettings};

#[derive(Debug, Parser)]
#[command(name = "syllabus-autosave", version, about = "Edit a syllabus settings document with auto-save")]
struct Cli {
    /// Settings document to edit
    #[arg(long, default_value = DEFAULT_DOCUMENT_FILENAME)]
    file: PathBuf,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the auto-save delay in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Only save on `:save` and at exit
    #[arg(long)]
    no_auto_save: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match AppConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {:?}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::load_from_default_path().unwrap_or_default(),
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let local = LocalSet::new();
    match local.block_on(&runtime, run(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Application error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = load_document(&cli.file).await?;

    let mut options = AutoSaveOptions::from_config(&config.auto_save);
    if let Some(delay_ms) = cli.delay_ms {
        options = options.delay(Duration::from_millis(delay_ms));
    }
    if cli.no_auto_save {
        options = options.enabled(false);
    }

    let persister = JsonFilePersister::new(&cli.file);
    log::info!("Editing {:?}", persister.path());
    let controller = AutoSaveController::start(settings.clone(), persister, options);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            ":save" => report(&controller.manual_save().await),
            ":status" => print_status(&controller),
            ":reset" => controller.reset_status(),
            ":fields" => println!("{}", SyllabusSettings::FIELDS.join(", ")),
            _ => match line.split_once('=') {
                Some((field, value)) => match settings.set_field(field.trim(), value.trim()) {
                    Ok(()) => controller.observe(settings.clone()),
                    Err(e) => eprintln!("{}", e),
                },
                None => eprintln!("Expected field=value or a :command"),
            },
        }
    }

    // Auto-save off means the final flush has to be explicit.
    if !controller.is_enabled() {
        controller.set_enabled(true);
    }
    if let Some(outcome) = controller.flush().await {
        report(&outcome);
    }
    controller.dispose();
    Ok(())
}

async fn load_document(path: &Path) -> Result<SyllabusSettings, Box<dyn std::error::Error>> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            log::info!("Loaded document from {:?}", path);
            Ok(serde_json::from_str(&json)?)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No document at {:?}, starting empty", path);
            Ok(SyllabusSettings::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn report(outcome: &SaveOutcome) {
    match outcome {
        SaveOutcome::Saved => println!("Saved"),
        SaveOutcome::Failed(message) => eprintln!("Save failed: {}", message),
        SaveOutcome::Skipped(reason) => println!("Save skipped ({:?})", reason),
        SaveOutcome::Discarded => {}
    }
}

fn print_status(controller: &AutoSaveController<SyllabusSettings>) {
    let session = controller.session();
    let status = session.status.name();
    match SaveIndicator::from_session(&session, Utc::now()).label() {
        Some(label) => println!("[{}] {}", status, label),
        None => println!("[{}] No changes saved yet", status),
    }
}
