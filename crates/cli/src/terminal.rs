use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

use spe_compute::dominant_bin;
use spe_core::{Account, Agent, EntityRef, HeatmapCell, SearchHit};
use spe_editor::{EditorSession, Notice, NoticeLevel, SurfaceState};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const PROMPT: Color = Color::Green;
    const AGENT: Color = Color::Cyan;
    const ACCOUNT: Color = Color::Yellow;
    const SUCCESS: Color = Color::DarkGreen;
    const WARNING: Color = Color::DarkYellow;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// Width of the longest spectrum bar.
const BAR_WIDTH: usize = 40;

/// Renders editor state for the interactive REPL.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, server: &str, scenario: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("spe-cli"),
            ResetColor,
            Print(" - SPE scenario editor\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Service: {} | Scenario: {}\n", server, scenario)),
            Print("Type 'help' for commands, 'quit' to end.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_prompt(&self, mode: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::PROMPT),
            Print(format!("[{}]> ", mode)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_notices(&self, notices: &[Notice]) -> Result<()> {
        for notice in notices {
            let color = match notice.level {
                NoticeLevel::Info => Colors::DIM,
                NoticeLevel::Success => Colors::SUCCESS,
                NoticeLevel::Warning => Colors::WARNING,
                NoticeLevel::Error => Colors::ERROR,
            };
            self.print_colored(
                color,
                &format!("[{}] {}", notice.at.format("%H:%M:%S"), notice.message),
            )?;
        }
        Ok(())
    }

    /// Print the visible agents and accounts.
    pub fn print_entities(&self, agents: &[&Agent], accounts: &[&Account]) -> Result<()> {
        let mut stdout = io::stdout();
        if agents.is_empty() && accounts.is_empty() {
            return self.print_info("No visible entities.");
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("Agents ({}):\n", agents.len())),
            ResetColor,
        )?;
        for a in agents {
            execute!(
                stdout,
                SetForegroundColor(Colors::AGENT),
                Print(format!(
                    "  {:<38} {:<20} {} {} {}\n",
                    a.id,
                    truncate(&a.name, 20),
                    a.position(),
                    a.schedule.kind.as_str(),
                    a.schedule.anchor.as_str(),
                )),
                ResetColor,
            )?;
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("Accounts ({}):\n", accounts.len())),
            ResetColor,
        )?;
        for a in accounts {
            let pin = a
                .pinned_agent()
                .map(|id| format!(" pin={}", id))
                .unwrap_or_default();
            execute!(
                stdout,
                SetForegroundColor(Colors::ACCOUNT),
                Print(format!(
                    "  {:<38} {:<20} {} {} {} svc={}m window={}+{}m{}\n",
                    a.id,
                    truncate(&a.name, 20),
                    a.position(),
                    a.schedule.kind.as_str(),
                    a.schedule.anchor.as_str(),
                    a.estimated_service_minutes,
                    clock(a.service_window_start_min),
                    a.service_window_duration_min,
                    pin,
                )),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_status(&self, session: &EditorSession) -> Result<()> {
        let stats = session.store().stats();
        let surface = match session.surface() {
            SurfaceState::Pending => "pending".to_string(),
            SurfaceState::Ready(view) => format!(
                "ready at ({:.4}, {:.4}) zoom {}",
                view.latitude, view.longitude, view.zoom
            ),
        };
        let selection = session
            .selection()
            .map(EntityRef::to_string)
            .unwrap_or_else(|| "none".to_string());
        let heat = session.panel().heatmap();
        let results = session.results();

        let lines = [
            format!("mode:        {}", session.mode()),
            format!("selection:   {}", selection),
            format!("map:         {}", surface),
            format!(
                "entities:    {} agents, {} accounts ({} pinned, {} dangling)",
                stats.agent_count, stats.account_count, stats.pinned_accounts, stats.dangling_pins
            ),
            format!(
                "scenario:    {} / {} cycle days / h3 {:?}",
                session.settings().name,
                session.settings().cycle_days,
                session.settings().h3_levels
            ),
            format!(
                "filter:      days {:?} policies {:?}",
                session
                    .filter()
                    .enabled_days()
                    .iter()
                    .map(|d| d.as_str())
                    .collect::<Vec<_>>(),
                session
                    .filter()
                    .enabled_policies()
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
            ),
            format!(
                "heatmap:     {} day {} level {} ({} accounts active that day)",
                heat.feature.as_str(),
                heat.day,
                heat.h3_level,
                session.accounts_active_on(heat.day)
            ),
            format!(
                "analysis:    embedding={} saved={} indexed={} hits={} cells={}",
                results
                    .embedding
                    .as_ref()
                    .map(|e| e.embedding.len().to_string())
                    .unwrap_or_else(|| "-".into()),
                results.saved_scenario_id.as_deref().unwrap_or("-"),
                results.embedding_id.as_deref().unwrap_or("-"),
                results.hits.len(),
                results.cells.len()
            ),
        ];
        for line in &lines {
            self.print_info(line)?;
        }
        if let Some(sim) = &results.simulation {
            self.print_info(&format!(
                "simulation:  unassigned={} reps={} travel={:.0}s service={:.0}s",
                sim.stats.unassigned_stops,
                sim.stats.reps_used(),
                sim.stats.total_travel_sec,
                sim.stats.total_service_sec
            ))?;
        }
        Ok(())
    }

    /// Print a magnitude spectrum as horizontal bars.
    pub fn print_spectrum(&self, component: &str, spectrum: &[f64]) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!(
                "{} ({} bins, peak at {})\n",
                component,
                spectrum.len(),
                dominant_bin(spectrum).map_or_else(|| "-".to_string(), |b| b.to_string())
            )),
            ResetColor,
        )?;
        let max = spectrum.iter().cloned().filter(|v| v.is_finite()).fold(0.0, f64::max);
        for (bin, value) in spectrum.iter().enumerate() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print(format!("{:>4} ", bin)),
                SetForegroundColor(Colors::AGENT),
                Print(bar(*value, max, BAR_WIDTH)),
                SetForegroundColor(Colors::DIM),
                Print(format!(" {:.4}\n", value)),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_hits(&self, hits: &[SearchHit]) -> Result<()> {
        if hits.is_empty() {
            return self.print_info("No search results.");
        }
        for (i, hit) in hits.iter().enumerate() {
            self.print_info(&format!("{:>3}. {:<40} {:.6}", i + 1, hit.reference, hit.distance))?;
        }
        Ok(())
    }

    pub fn print_cells(&self, cells: &[HeatmapCell], limit: usize) -> Result<()> {
        for cell in cells.iter().take(limit) {
            self.print_info(&format!(
                "  {:<18} ({:.4}, {:.4}) {:.3}",
                cell.h3.as_deref().unwrap_or("-"),
                cell.lat,
                cell.lng,
                cell.value
            ))?;
        }
        if cells.len() > limit {
            self.print_info(&format!("  ... {} more", cells.len() - limit))?;
        }
        Ok(())
    }

    pub fn print_help(&self, text: &str) -> Result<()> {
        self.print_info(text)
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::ERROR, &format!("Error: {}", msg))
    }

    pub fn print_success(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::SUCCESS, msg)
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::DIM, msg)
    }

    fn print_colored(&self, color: Color, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(color),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Bar of `width * value / max` blocks; empty for non-positive input.
fn bar(value: f64, max: f64, width: usize) -> String {
    if !(value > 0.0) || !(max > 0.0) {
        return String::new();
    }
    let len = ((value / max) * width as f64).round() as usize;
    "#".repeat(len.min(width))
}

/// Minutes after midnight as `HH:MM`.
fn clock(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
