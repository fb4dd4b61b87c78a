//! Command-line argument handling.

use anyhow::{bail, Result};

use quakecache_core::Action;

pub const USAGE: &str = "\
Usage: quakecache [COMMAND]

Commands:
  (none)                 Start the terminal dashboard
  --daily                Print the past day's earthquakes as JSON display rows
  --dump-html <VIEW>     Print the dashboard page rendered from the local store
                         VIEW: summary | original | magtype=<TYPE>
  --init-config          Write the current configuration to the config file
  -h, --help             Show this help

Environment:
  QUAKECACHE_FEED_URL    Base URL of the GeoJSON summary feeds
  QUAKECACHE_DATA_DIR    Directory holding the local store and logs
  RUST_LOG               Log filter (default: warn)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tui,
    Daily,
    DumpHtml(Action),
    InitConfig,
    Help,
}

pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::Tui);
    };

    let command = match first.as_str() {
        "--daily" => Command::Daily,
        "--init-config" => Command::InitConfig,
        "-h" | "--help" => Command::Help,
        "--dump-html" => {
            let Some(view) = args.get(1) else {
                bail!("--dump-html needs a view");
            };
            Command::DumpHtml(parse_view(view)?)
        }
        other => bail!("unknown argument: {}", other),
    };

    let expected = if matches!(command, Command::DumpHtml(_)) { 2 } else { 1 };
    if args.len() > expected {
        bail!("unexpected argument: {}", args[expected]);
    }
    Ok(command)
}

fn parse_view(view: &str) -> Result<Action> {
    match view {
        "summary" => Ok(Action::ShowSummary),
        "original" => Ok(Action::ShowOriginal),
        _ => match view.strip_prefix("magtype=") {
            // An empty value selects records without a magType
            Some("") => Ok(Action::FilterByMagType(None)),
            Some(mag_type) => Ok(Action::FilterByMagType(Some(mag_type.to_string()))),
            None => bail!("unknown view: {}", view),
        },
    }
}
