use anyhow::{Context, anyhow};
use chrono::{DateTime, Local, Utc};
use prazo_core::theme::{load_theme, save_theme};
use prazo_core::{
    DeadlineMonitor, KeyValueStore, Lifecycle, MoveOutcome, Registry, Stage, TaskDraft, TaskId,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::cli::{Command, ThemeArg};
use crate::config::Config;
use crate::render::Renderer;
use crate::watch;

const ABOUT_TEXT: &str = "\
Prazo keeps a three-stage task list (to do, in progress, completed).
Every task carries a deadline; once it passes, a reminder is shown once
and the terminal bell rings. `prazo watch` keeps a live clock and checks
deadlines every minute.";

const CONTACT_TEXT: &str = "\
Questions and bug reports: open an issue in the project repository.";

#[instrument(skip(lifecycle, cfg, renderer))]
pub fn dispatch<S: KeyValueStore>(
    lifecycle: &mut Lifecycle<S>,
    cfg: &Config,
    renderer: &mut Renderer,
    command: Command,
) -> anyhow::Result<()> {
    let now = Utc::now();
    debug!(?command, "dispatching command");

    match command {
        Command::Add {
            text,
            amount,
            unit,
            date,
        } => cmd_add(lifecycle, text, amount, unit, date, now),
        Command::Move { id } => cmd_move(lifecycle, &id),
        Command::Remove { id } => cmd_remove(lifecycle, &id),
        Command::List => renderer.print_board(lifecycle.registry(), now),
        Command::Check => cmd_check(lifecycle, cfg, renderer, now),
        Command::Watch { ticks } => watch::run(lifecycle, cfg, renderer, ticks),
        Command::Theme { mode } => cmd_theme(lifecycle, renderer, mode),
        Command::Export => cmd_export(lifecycle.registry()),
        Command::Config => cmd_config(cfg),
        Command::About => {
            println!("{ABOUT_TEXT}");
            Ok(())
        }
        Command::Contact => {
            println!("{CONTACT_TEXT}");
            Ok(())
        }
    }
}

#[instrument(skip(lifecycle, text, now))]
fn cmd_add<S: KeyValueStore>(
    lifecycle: &mut Lifecycle<S>,
    text: Vec<String>,
    amount: String,
    unit: String,
    date: Option<String>,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    info!("command add");

    let draft = TaskDraft {
        text: text.join(" "),
        deadline_date: date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
        amount,
        unit,
    };
    let record = lifecycle
        .create_task(&draft, now)
        .context("task not created")?;

    println!(
        "Created task {}. Deadline {}.",
        record.id.short(),
        prazo_core::clock::format_local(record.deadline)
    );
    Ok(())
}

#[instrument(skip(lifecycle))]
fn cmd_move<S: KeyValueStore>(lifecycle: &mut Lifecycle<S>, raw_id: &str) -> anyhow::Result<()> {
    info!("command move");

    let Some((stage, id)) = resolve_task(lifecycle.registry(), raw_id)? else {
        println!("No task matches {raw_id}.");
        return Ok(());
    };

    match lifecycle.move_task(id, stage) {
        MoveOutcome::Moved(next) => println!("Moved task {} to {}.", id.short(), next.label()),
        MoveOutcome::NoOp => println!("Task {} is already {}.", id.short(), stage.key()),
    }
    Ok(())
}

#[instrument(skip(lifecycle))]
fn cmd_remove<S: KeyValueStore>(
    lifecycle: &mut Lifecycle<S>,
    raw_id: &str,
) -> anyhow::Result<()> {
    info!("command remove");

    let Some((stage, id)) = resolve_task(lifecycle.registry(), raw_id)? else {
        println!("No task matches {raw_id}.");
        return Ok(());
    };

    lifecycle.remove_task(id, stage);
    println!("Removed task {}.", id.short());
    Ok(())
}

#[instrument(skip(lifecycle, cfg, renderer, now))]
fn cmd_check<S: KeyValueStore>(
    lifecycle: &mut Lifecycle<S>,
    cfg: &Config,
    renderer: &Renderer,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let mut monitor = DeadlineMonitor::new(cfg.monitor_interval()?);
    let raised = lifecycle.check_deadlines(&mut monitor, now);
    if raised.is_empty() {
        println!("No overdue tasks.");
        return Ok(());
    }

    for notification in &raised {
        println!("{}", renderer.banner(&notification.message()));
    }
    if cfg.reminder_bell() {
        print!("\x07");
    }
    Ok(())
}

#[instrument(skip(lifecycle, renderer))]
fn cmd_theme<S: KeyValueStore>(
    lifecycle: &mut Lifecycle<S>,
    renderer: &mut Renderer,
    mode: Option<ThemeArg>,
) -> anyhow::Result<()> {
    let current = load_theme(lifecycle.backend());
    let next = match mode {
        None => {
            println!("{}", current.as_str());
            return Ok(());
        }
        Some(ThemeArg::Dark) => prazo_core::ThemeMode::Dark,
        Some(ThemeArg::Light) => prazo_core::ThemeMode::Light,
        Some(ThemeArg::Toggle) => current.toggle(),
    };

    save_theme(lifecycle.backend_mut(), next).context("failed to save theme")?;
    renderer.set_theme(next);
    println!("Theme set to {}.", next.as_str());
    Ok(())
}

fn cmd_export(registry: &Registry) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(registry).context("failed to encode tasks")?;
    println!("{json}");
    Ok(())
}

fn cmd_config(cfg: &Config) -> anyhow::Result<()> {
    let mut entries: Vec<_> = cfg.iter().collect();
    entries.sort();
    for (key, value) in entries {
        println!("{key} = {value}");
    }
    for file in &cfg.loaded_files {
        println!("# loaded {}", file.display());
    }
    Ok(())
}

/// Finds a task by full UUID or by a unique prefix of its short id.
pub fn resolve_task(registry: &Registry, raw: &str) -> anyhow::Result<Option<(Stage, TaskId)>> {
    let needle = raw.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(anyhow!("task id cannot be empty"));
    }

    if let Ok(uuid) = Uuid::parse_str(&needle) {
        let id = TaskId::from(uuid);
        return Ok(registry.stage_of(id).map(|stage| (stage, id)));
    }

    let needle = needle.replace('-', "");
    let mut matches = registry
        .iter()
        .filter(|(_, record)| record.id.as_uuid().simple().to_string().starts_with(&needle))
        .map(|(stage, record)| (stage, record.id));

    let Some(first) = matches.next() else {
        return Ok(None);
    };
    if matches.next().is_some() {
        return Err(anyhow!("task id {raw} is ambiguous"));
    }
    Ok(Some(first))
}
