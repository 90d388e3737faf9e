//! Parsing of REPL input lines.

use spe_core::{Anchor, EntityId, EntityRef, GeoPoint, HeatmapFeature, ResolutionField, ScheduleType};
use spe_editor::{AnalysisAction, EditorMode};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Empty,
    Mode(EditorMode),
    Click(GeoPoint),
    Select(EntityRef),
    Deselect,
    Rename(String),
    Schedule {
        kind: ScheduleType,
        anchor: Option<Anchor>,
    },
    Service(f64),
    Window {
        start: f64,
        duration: f64,
    },
    /// `None` clears the pin.
    Pin(Option<String>),
    List,
    FilterDay(Anchor),
    FilterPolicy(ScheduleType),
    Resolution {
        field: ResolutionField,
        value: u32,
    },
    HeatFeature(HeatmapFeature),
    HeatDay(u32),
    HeatLevel(u8),
    SearchK(usize),
    Component(String),
    Analysis(AnalysisAction),
    Spectrum(Option<String>),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Editing:
  mode <select|agent|account|erase>   set what a click does
  click <lat> <lng>                   click the map at a coordinate
  select <agent|account> <id>         select an entity
  deselect                            clear the selection
  rename <name>                       rename the selection
  schedule <type> [anchor]            e.g. schedule biweekly_ac wed
  service <minutes>                   selected account's service time
  window <start> <duration>           selected account's window, minutes
  pin <agent-id|none>                 pin the selected account to an agent
  list                                list visible entities
  filter day <mon..fri>               toggle an anchor day
  filter policy <type>                toggle a schedule type
Analysis:
  res <field> <value>                 set a resolution (e.g. res pinned_accounts 80)
  heat <feature|day|level> <value>    heatmap controls
  k <n>                               number of search results
  component <name>                    component shown by 'spectrum'
  embed | save | index | search       analysis requests
  simulate [day]                      simulate a day (default 0)
  heatmap                             aggregate the heatmap
  spectrum [component]                spectrum of an embedding component
  status                              session summary
  help | quit";

pub fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(Command::Empty);
    };
    let args: Vec<&str> = parts.collect();

    match head.to_ascii_lowercase().as_str() {
        "mode" => Ok(Command::Mode(one(&args, "mode <select|agent|account|erase>")?.parse()?)),
        "click" => match args.as_slice() {
            [lat, lng] => Ok(Command::Click(GeoPoint::new(number(lat)?, number(lng)?))),
            _ => Err("usage: click <lat> <lng>".to_string()),
        },
        "select" => match args.as_slice() {
            [kind, id] => {
                let id = EntityId::from(*id);
                match kind.to_ascii_lowercase().as_str() {
                    "agent" => Ok(Command::Select(EntityRef::agent(id))),
                    "account" => Ok(Command::Select(EntityRef::account(id))),
                    other => Err(format!("unknown entity kind '{}'", other)),
                }
            }
            _ => Err("usage: select <agent|account> <id>".to_string()),
        },
        "deselect" => Ok(Command::Deselect),
        "rename" => {
            let name = args.join(" ");
            if name.is_empty() {
                Err("usage: rename <name>".to_string())
            } else {
                Ok(Command::Rename(name))
            }
        }
        "schedule" => match args.as_slice() {
            [kind] => Ok(Command::Schedule { kind: kind.parse()?, anchor: None }),
            [kind, anchor] => Ok(Command::Schedule {
                kind: kind.parse()?,
                anchor: Some(anchor.parse()?),
            }),
            _ => Err("usage: schedule <type> [anchor]".to_string()),
        },
        "service" => Ok(Command::Service(number(one(&args, "service <minutes>")?)?)),
        "window" => match args.as_slice() {
            [start, duration] => Ok(Command::Window {
                start: number(start)?,
                duration: number(duration)?,
            }),
            _ => Err("usage: window <start> <duration>".to_string()),
        },
        "pin" => {
            let target = one(&args, "pin <agent-id|none>")?;
            if matches!(target.to_ascii_lowercase().as_str(), "none" | "-") {
                Ok(Command::Pin(None))
            } else {
                Ok(Command::Pin(Some(target.to_string())))
            }
        }
        "list" | "ls" => Ok(Command::List),
        "filter" => match args.as_slice() {
            ["day", day] => Ok(Command::FilterDay(day.parse()?)),
            ["policy", policy] => Ok(Command::FilterPolicy(policy.parse()?)),
            _ => Err("usage: filter day <mon..fri> | filter policy <type>".to_string()),
        },
        "res" => match args.as_slice() {
            [field, value] => Ok(Command::Resolution {
                field: field.parse()?,
                value: integer(value)?,
            }),
            _ => Err("usage: res <field> <value>".to_string()),
        },
        "heat" => match args.as_slice() {
            ["feature", feature] => Ok(Command::HeatFeature(feature.parse()?)),
            ["day", day] => Ok(Command::HeatDay(integer(day)?)),
            ["level", level] => Ok(Command::HeatLevel(integer(level)?)),
            _ => Err("usage: heat <feature|day|level> <value>".to_string()),
        },
        "k" => Ok(Command::SearchK(integer(one(&args, "k <n>")?)?)),
        "component" => Ok(Command::Component(one(&args, "component <name>")?.to_string())),
        "embed" => Ok(Command::Analysis(AnalysisAction::Embed)),
        "save" => Ok(Command::Analysis(AnalysisAction::Save)),
        "index" => Ok(Command::Analysis(AnalysisAction::Index)),
        "search" => Ok(Command::Analysis(AnalysisAction::Search)),
        "simulate" | "sim" => {
            let day = match args.as_slice() {
                [] => 0,
                [day] => integer(day)?,
                _ => return Err("usage: simulate [day]".to_string()),
            };
            Ok(Command::Analysis(AnalysisAction::Simulate { day }))
        }
        "heatmap" => Ok(Command::Analysis(AnalysisAction::Heatmap)),
        "spectrum" => Ok(Command::Spectrum(args.first().map(|s| s.to_string()))),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

fn one<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, String> {
    match args {
        [only] => Ok(only),
        _ => Err(format!("usage: {}", usage)),
    }
}

fn number(s: &str) -> Result<f64, String> {
    s.parse::<f64>().map_err(|_| format!("'{}' is not a number", s))
}

fn integer<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse::<T>().map_err(|_| format!("'{}' is not a valid integer", s))
}
