mod app;
mod help;
mod jumpto;
mod theme;
mod widget;
use crate::app::App;
use anyhow::Context;
use calpick::calendar::datemath::parse_date;
use calpick::config::find_config_file;
use calpick::CalendarConfig;
use flexi_logger::{FileSpec, Logger, LoggerHandle};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::path::{Path, PathBuf};
use time::{Date, OffsetDateTime};

#[cfg(debug_assertions)]
const DEFAULT_LOG_LEVEL: &str = "debug";
#[cfg(not(debug_assertions))]
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        config: Option<PathBuf>,
        log_file: Option<PathBuf>,
        today: Option<Date>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut config = None;
        let mut log_file = None;
        let mut today = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("log-file") => log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if today.is_none() => {
                    today = Some(value.parse_with(|s| {
                        parse_date(s).ok_or("expected a date in YYYY-MM-DD format")
                    })?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            config,
            log_file,
            today,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                config,
                log_file,
                today,
            } => {
                let _logger = log_file.as_deref().map(start_logger).transpose()?;
                let config = load_config(config.as_deref())?;
                let today = match today {
                    Some(d) => d,
                    None => OffsetDateTime::now_local()
                        .context("failed to determine local date")?
                        .date(),
                };
                log::info!("Starting date picker with today = {today}");
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(config, today).run(terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: calpick [-c|--config PATH] [--log-file PATH] [YYYY-MM-DD]");
                println!();
                println!("Pick dates, ranges of dates, or sets of dates in the terminal");
                println!();
                println!("The optional date argument is used in place of today's date.");
                println!();
                println!("Options:");
                println!("  -c, --config PATH   Read calendar options from the given TOML file");
                println!("      --log-file PATH Write log messages to the given file");
                println!("  -h, --help          Display this help message and exit");
                println!("  -V, --version       Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

/// Logs to `path`; a terminal UI has nowhere else to log to
fn start_logger(path: &Path) -> anyhow::Result<LoggerHandle> {
    Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)
        .context("invalid log specification")?
        .log_to_file(FileSpec::try_from(path).context("invalid log file path")?)
        .start()
        .context("failed to start logger")
}

/// Reads the given config file, or else the first config file found in the
/// default locations, or else returns the defaults
fn load_config(path: Option<&Path>) -> anyhow::Result<CalendarConfig> {
    let path = path.map(Path::to_path_buf).or_else(find_config_file);
    match path {
        Some(p) => {
            log::debug!("Reading config from {}", p.display());
            Ok(CalendarConfig::load(&p)?)
        }
        None => Ok(CalendarConfig::default()),
    }
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
