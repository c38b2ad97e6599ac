use crate::calendar::datemath::parse_date;
use crate::calendar::{CalendarMode, PopupPosition, SwitchMode};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::Date;

const CONFIG_PATH_ENV_VAR: &str = "CALPICK_CONFIG";

/// Options recognized by the calendar.  Missing keys take their defaults;
/// dates that cannot be parsed are treated as absent.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(from = "RawConfig")]
pub struct CalendarConfig {
    pub mode: CalendarMode,
    pub switch_mode: SwitchMode,
    pub min_date: Option<Date>,
    pub max_date: Option<Date>,
    pub default_date: Vec<Date>,
    pub first_day_of_week: u8,
    pub max_range: Option<usize>,
    pub allow_same_day: bool,
    pub show_confirm: bool,
    pub readonly: bool,
    pub poppable: bool,
    pub position: PopupPosition,
    pub round: bool,
    pub close_on_click_overlay: bool,
}

impl Default for CalendarConfig {
    fn default() -> CalendarConfig {
        CalendarConfig {
            mode: CalendarMode::Single,
            switch_mode: SwitchMode::Month,
            min_date: None,
            max_date: None,
            default_date: Vec::new(),
            first_day_of_week: 0,
            max_range: None,
            allow_same_day: false,
            show_confirm: true,
            readonly: false,
            poppable: true,
            position: PopupPosition::Bottom,
            round: true,
            close_on_click_overlay: true,
        }
    }
}

impl CalendarConfig {
    pub fn from_toml_str(s: &str) -> Result<CalendarConfig, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn load(path: &Path) -> Result<CalendarConfig, ConfigError> {
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        CalendarConfig::from_toml_str(&src).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Candidate config file locations in order of preference: the file named by
/// `$CALPICK_CONFIG`, then `$XDG_CONFIG_HOME/calpick/config.toml` (or
/// `~/.config/calpick/config.toml`)
pub fn config_file_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(path) = env::var_os(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
        locations.push(Path::new(&dir).join("calpick").join("config.toml"));
    } else if let Some(home) = env::var_os("HOME") {
        locations.push(
            Path::new(&home)
                .join(".config")
                .join("calpick")
                .join("config.toml"),
        );
    }
    locations
}

/// Returns the first existing config file, if any
pub fn find_config_file() -> Option<PathBuf> {
    config_file_locations().into_iter().find(|p| p.is_file())
}

/// The config file as written, before dates are parsed
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
struct RawConfig {
    #[serde(rename = "type")]
    mode: CalendarMode,
    switch_mode: SwitchMode,
    min_date: Option<String>,
    max_date: Option<String>,
    default_date: Option<OneOrMany>,
    first_day_of_week: u8,
    max_range: Option<usize>,
    allow_same_day: bool,
    show_confirm: bool,
    readonly: bool,
    poppable: bool,
    position: PopupPosition,
    round: bool,
    close_on_click_overlay: bool,
}

impl Default for RawConfig {
    fn default() -> RawConfig {
        let defaults = CalendarConfig::default();
        RawConfig {
            mode: defaults.mode,
            switch_mode: defaults.switch_mode,
            min_date: None,
            max_date: None,
            default_date: None,
            first_day_of_week: defaults.first_day_of_week,
            max_range: defaults.max_range,
            allow_same_day: defaults.allow_same_day,
            show_confirm: defaults.show_confirm,
            readonly: defaults.readonly,
            poppable: defaults.poppable,
            position: defaults.position,
            round: defaults.round,
            close_on_click_overlay: defaults.close_on_click_overlay,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<RawConfig> for CalendarConfig {
    fn from(raw: RawConfig) -> CalendarConfig {
        let default_date = match raw.default_date {
            None => Vec::new(),
            Some(OneOrMany::One(s)) => parse_or_warn(&s).into_iter().collect(),
            Some(OneOrMany::Many(v)) => v.iter().filter_map(|s| parse_or_warn(s)).collect(),
        };
        CalendarConfig {
            mode: raw.mode,
            switch_mode: raw.switch_mode,
            min_date: raw.min_date.as_deref().and_then(parse_or_warn),
            max_date: raw.max_date.as_deref().and_then(parse_or_warn),
            default_date,
            first_day_of_week: raw.first_day_of_week,
            max_range: raw.max_range,
            allow_same_day: raw.allow_same_day,
            show_confirm: raw.show_confirm,
            readonly: raw.readonly,
            poppable: raw.poppable,
            position: raw.position,
            round: raw.round,
            close_on_click_overlay: raw.close_on_click_overlay,
        }
    }
}

fn parse_or_warn(s: &str) -> Option<Date> {
    let date = parse_date(s);
    if date.is_none() {
        log::warn!("Ignoring malformed date {s:?} in calendar config");
    }
    date
}
