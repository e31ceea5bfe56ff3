// Calendar layout preview
// Fetches one view's window and prints the computed layout as JSON

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use calendar_engine::models::event::CalendarEvent;
use calendar_engine::models::settings::Settings;
use calendar_engine::models::view::{Navigation, ViewKind};
use calendar_engine::services::controller::{FetchOutcome, ViewController};
use calendar_engine::services::event_store::{EventStore, HttpEventStore, InMemoryEventStore};
use calendar_engine::services::settings::SettingsService;
use chrono::{NaiveDate, Utc};

const USAGE: &str = "Usage: calendar-preview [--date YYYY-MM-DD] [--view day|week|month|year] \
[--config PATH] [--events FILE.json]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    date: Option<NaiveDate>,
    view: Option<ViewKind>,
    config: Option<PathBuf>,
    events: Option<PathBuf>,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut iter = raw.into_iter();

    while let Some(flag) = iter.next() {
        let mut value = || iter.next().ok_or_else(|| anyhow!("{} needs a value\n{}", flag, USAGE));
        match flag.as_str() {
            "--date" => {
                let raw = value()?;
                args.date = Some(
                    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .with_context(|| format!("Invalid date '{}'", raw))?,
                );
            }
            "--view" => args.view = Some(value()?.parse().map_err(|e: String| anyhow!(e))?),
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--events" => args.events = Some(PathBuf::from(value()?)),
            other => bail!("Unknown argument '{}'\n{}", other, USAGE),
        }
    }

    Ok(args)
}

fn load_events(path: &Path) -> Result<Vec<CalendarEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events from {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid event JSON in {}", path.display()))
}

fn render<S: EventStore>(store: S, settings: &Settings, args: &Args) -> Result<String> {
    let now = Utc::now();

    let mut controller = ViewController::new(store, settings, now);
    if let Some(kind) = args.view {
        controller.navigate(Navigation::SwitchView(kind), now);
    }
    if let Some(date) = args.date {
        controller.navigate(Navigation::JumpTo(date), now);
    }

    if let FetchOutcome::Failed = controller.refresh() {
        let err = controller
            .last_error()
            .map(|e| format!("{:#}", e))
            .unwrap_or_default();
        bail!("Could not load events: {}", err);
    }

    let layout = controller
        .compose()
        .ok_or_else(|| anyhow!("No events resolved"))?
        .context("Layout failed")?;
    serde_json::to_string_pretty(&layout).context("Failed to serialize layout")
}

fn run() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let service = match &args.config {
        Some(path) => SettingsService::new(path),
        None => SettingsService::from_environment(),
    };
    let settings = service.load_or_default();

    let output = match &args.events {
        Some(path) => {
            let store = InMemoryEventStore::with_events(load_events(path)?);
            render(store, &settings, &args)?
        }
        None => render(HttpEventStore::new(&settings.store)?, &settings, &args)?,
    };

    println!("{}", output);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    log::info!("Starting calendar preview");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
