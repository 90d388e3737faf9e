mod cli;
mod commands;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use spe_client::AnalysisClient;
use spe_core::config::{self, Config};
use spe_core::{AccountPatch, SchedulePatch};
use spe_editor::{ClickOutcome, EditorRuntime, EditorSession, RequestKind, SurfaceState};

use crate::cli::CliArgs;
use crate::commands::{Command, HELP};
use crate::terminal::Terminal;

/// Heatmap cells printed after an aggregation.
const CELL_PREVIEW: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    config::load_dotenv();
    let mut config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    apply_overrides(&mut config, &args);
    config.log_summary();

    let client = AnalysisClient::from_config(&config.service)
        .context("failed to create analysis client")?;

    let session = EditorSession::new(&config.editor);
    let (mut runtime, mut replies) = EditorRuntime::new(session, Arc::new(client));
    runtime.load_config();

    let terminal = Terminal::new();
    terminal.print_banner(&config.service.base_url, &config.editor.scenario_name)?;

    let mut lines = spawn_stdin_reader();
    terminal.print_prompt(runtime.session().mode().as_str())?;

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    debug!("stdin closed");
                    break;
                };
                let keep_going = match commands::parse(&line) {
                    Ok(command) => execute(command, &mut runtime, &terminal)?,
                    Err(msg) => {
                        terminal.print_error(&msg)?;
                        true
                    }
                };
                flush_notices(&mut runtime, &terminal)?;
                if !keep_going {
                    break;
                }
                terminal.print_prompt(runtime.session().mode().as_str())?;
            }
            Some(reply) = replies.recv() => {
                let kind = reply.kind;
                if !runtime.apply_reply(reply) {
                    continue;
                }
                println!();
                flush_notices(&mut runtime, &terminal)?;
                match kind {
                    RequestKind::Search => terminal.print_hits(&runtime.session().results().hits)?,
                    RequestKind::Heatmap => {
                        terminal.print_cells(&runtime.session().results().cells, CELL_PREVIEW)?
                    }
                    _ => {}
                }
                terminal.print_prompt(runtime.session().mode().as_str())?;
            }
        }
    }

    info!("Goodbye");
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &CliArgs) {
    if let Some(server) = &args.server {
        config.service.base_url = server.clone();
    }
    if let Some(timeout) = args.timeout_ms {
        config.service.request_timeout_ms = timeout;
    }
    if let Some(name) = &args.scenario_name {
        config.editor.scenario_name = name.clone();
    }
}

/// Read stdin on a plain thread; the channel closes at EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn flush_notices(runtime: &mut EditorRuntime, terminal: &Terminal) -> Result<()> {
    let unread = runtime.session_mut().notices_mut().drain_unread();
    terminal.print_notices(&unread)
}

/// Run one command. Returns false when the REPL should stop.
fn execute(command: Command, runtime: &mut EditorRuntime, terminal: &Terminal) -> Result<bool> {
    let session = runtime.session_mut();
    let outcome: Result<Option<String>, String> = match command {
        Command::Empty => Ok(None),
        Command::Quit => return Ok(false),
        Command::Help => {
            terminal.print_help(HELP)?;
            Ok(None)
        }
        Command::Mode(mode) => {
            session.set_mode(mode);
            Ok(Some(format!("Mode: {}", mode)))
        }
        Command::Click(point) => match session.on_map_click(point) {
            Ok(ClickOutcome::Ignored) if session.surface() == SurfaceState::Pending => {
                Err("map not initialized yet, waiting for configuration".to_string())
            }
            Ok(ClickOutcome::Ignored) => Ok(None),
            Ok(ClickOutcome::Created(target)) => Ok(Some(format!("Created {}", target))),
            Ok(ClickOutcome::Erased(target)) => Ok(Some(format!("Erased {}", target))),
            Ok(ClickOutcome::NoMatch) => Ok(Some(format!("Nothing to erase near {}", point))),
            Err(e) => Err(e.to_string()),
        },
        Command::Select(target) => session
            .select(target.clone())
            .map(|_| Some(format!("Selected {}", target)))
            .map_err(|e| e.to_string()),
        Command::Deselect => {
            session.clear_selection();
            Ok(None)
        }
        Command::Rename(name) => session
            .rename_selected(&name)
            .map(|_| Some(format!("Renamed to {}", name.trim())))
            .map_err(|e| e.to_string()),
        Command::Schedule { kind, anchor } => session
            .patch_selected_schedule(SchedulePatch { kind: Some(kind), anchor })
            .map(|_| None)
            .map_err(|e| e.to_string()),
        Command::Service(minutes) => session
            .update_selected_account(AccountPatch {
                estimated_service_minutes: Some(minutes),
                ..Default::default()
            })
            .map(|_| None)
            .map_err(|e| e.to_string()),
        Command::Window { start, duration } => session
            .update_selected_account(AccountPatch {
                service_window_start_min: Some(start),
                service_window_duration_min: Some(duration),
                ..Default::default()
            })
            .map(|_| None)
            .map_err(|e| e.to_string()),
        Command::Pin(agent) => session
            .update_selected_account(AccountPatch {
                pinned_agent_id: Some(agent.unwrap_or_default()),
                ..Default::default()
            })
            .map(|_| None)
            .map_err(|e| e.to_string()),
        Command::List => {
            terminal.print_entities(&session.visible_agents(), &session.visible_accounts())?;
            Ok(None)
        }
        Command::FilterDay(day) => {
            let on = session.filter_mut().toggle_day(day);
            Ok(Some(format!("{} {}", day.as_str(), if on { "shown" } else { "hidden" })))
        }
        Command::FilterPolicy(policy) => {
            let on = session.filter_mut().toggle_policy(policy);
            Ok(Some(format!("{} {}", policy.as_str(), if on { "shown" } else { "hidden" })))
        }
        Command::Resolution { field, value } => {
            session.set_resolution(field, value);
            Ok(Some(format!("{} = {}", field.wire_name(), session.resolution().get(field))))
        }
        Command::HeatFeature(feature) => {
            session.panel_mut().set_feature(feature);
            Ok(None)
        }
        Command::HeatDay(day) => session.panel_mut().set_day(day).map(|_| None).map_err(|e| e.to_string()),
        Command::HeatLevel(level) => session
            .panel_mut()
            .set_h3_level(level)
            .map(|_| None)
            .map_err(|e| e.to_string()),
        Command::SearchK(k) => session.panel_mut().set_search_k(k).map(|_| None).map_err(|e| e.to_string()),
        Command::Component(name) => {
            session.panel_mut().select_component(name);
            Ok(None)
        }
        Command::Spectrum(name) => {
            let name = name.unwrap_or_else(|| session.panel().component().to_string());
            match session.component_spectrum(&name) {
                Some(spectrum) => {
                    terminal.print_spectrum(&name, &spectrum)?;
                    Ok(None)
                }
                None if !session.has_embedding() => Err("no embedding yet, run 'embed'".to_string()),
                None => Err(format!("embedding has no component '{}'", name)),
            }
        }
        Command::Status => {
            terminal.print_status(session)?;
            Ok(None)
        }
        Command::Analysis(action) => match runtime.dispatch(action) {
            Some(_) => Ok(Some(format!("{} requested", action.kind()))),
            None => Err(format!("{} needs an embedding, run 'embed' first", action.kind())),
        },
    };

    match outcome {
        Ok(Some(msg)) => terminal.print_success(&msg)?,
        Ok(None) => {}
        Err(msg) => terminal.print_error(&msg)?,
    }
    Ok(true)
}
