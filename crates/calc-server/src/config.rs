use std::{
    env, fmt,
    net::{AddrParseError, SocketAddr},
};

use time::UtcOffset;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SETTINGS_DIR: &str = "artifacts/settings";
// Taiwan futures exchange time.
const DEFAULT_UTC_OFFSET_HOURS: i8 = 8;
const MIN_UTC_OFFSET_HOURS: i8 = -12;
const MAX_UTC_OFFSET_HOURS: i8 = 14;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub settings_dir: String,
    pub utc_offset: UtcOffset,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidListenAddr(AddrParseError),
    InvalidSettingsDir,
    InvalidUtcOffsetHours,
    NonUnicodeListenAddr,
    NonUnicodeSettingsDir,
    NonUnicodeUtcOffsetHours,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidListenAddr(err) => {
                write!(f, "CALC_SERVER_ADDR is not a valid socket address: {err}")
            }
            Self::InvalidSettingsDir => {
                write!(f, "CALC_SETTINGS_DIR must not be empty or whitespace")
            }
            Self::InvalidUtcOffsetHours => {
                write!(
                    f,
                    "CALC_UTC_OFFSET_HOURS must be a whole number of hours between {MIN_UTC_OFFSET_HOURS} and {MAX_UTC_OFFSET_HOURS}"
                )
            }
            Self::NonUnicodeListenAddr => {
                write!(f, "CALC_SERVER_ADDR contains non-unicode data")
            }
            Self::NonUnicodeSettingsDir => {
                write!(f, "CALC_SETTINGS_DIR contains non-unicode data")
            }
            Self::NonUnicodeUtcOffsetHours => {
                write!(f, "CALC_UTC_OFFSET_HOURS contains non-unicode data")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidListenAddr(err) => Some(err),
            Self::InvalidSettingsDir => None,
            Self::InvalidUtcOffsetHours => None,
            Self::NonUnicodeListenAddr => None,
            Self::NonUnicodeSettingsDir => None,
            Self::NonUnicodeUtcOffsetHours => None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match env::var("CALC_SERVER_ADDR") {
            Ok(value) => value.parse().map_err(ConfigError::InvalidListenAddr)?,
            Err(env::VarError::NotPresent) => DEFAULT_LISTEN_ADDR
                .parse()
                .map_err(ConfigError::InvalidListenAddr)?,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::NonUnicodeListenAddr);
            }
        };

        let settings_dir = match env::var("CALC_SETTINGS_DIR") {
            Ok(value) => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidSettingsDir);
                }
                value
            }
            Err(env::VarError::NotPresent) => DEFAULT_SETTINGS_DIR.to_owned(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::NonUnicodeSettingsDir);
            }
        };

        let utc_offset_hours = match env::var("CALC_UTC_OFFSET_HOURS") {
            Ok(value) => parse_offset_hours(value.as_str())
                .ok_or(ConfigError::InvalidUtcOffsetHours)?,
            Err(env::VarError::NotPresent) => DEFAULT_UTC_OFFSET_HOURS,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::NonUnicodeUtcOffsetHours);
            }
        };
        let utc_offset = UtcOffset::from_hms(utc_offset_hours, 0, 0)
            .map_err(|_| ConfigError::InvalidUtcOffsetHours)?;

        Ok(Self {
            listen_addr,
            settings_dir,
            utc_offset,
        })
    }
}

fn parse_offset_hours(value: &str) -> Option<i8> {
    let hours = value.trim().parse::<i8>().ok()?;
    (MIN_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS)
        .contains(&hours)
        .then_some(hours)
}
