use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub scheduling: SchedulingSettings,
    #[serde(default)]
    pub platform: PlatformSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
    #[serde(default = "default_channel_name")]
    pub channel_name: String,
    #[serde(default = "default_title")]
    pub title: String,
    /// Body text; `{name}` is replaced with the routine name.
    #[serde(default = "default_body")]
    pub body: String,
}

fn default_channel_id() -> String {
    "pill-routine-channel".to_string()
}
fn default_channel_name() -> String {
    "Medication routine reminders".to_string()
}
fn default_title() -> String {
    "💊 Time for your medication".to_string()
}
fn default_body() -> String {
    "Time to take {name}!".to_string()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            channel_id: default_channel_id(),
            channel_name: default_channel_name(),
            title: default_title(),
            body: default_body(),
        }
    }
}

/// What to do when a routine id that already has registered triggers is
/// scheduled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Cancel the routine's existing triggers, then register afresh.
    #[default]
    Replace,
    /// Refuse with an error and leave existing triggers untouched.
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(Self::Replace),
            "reject" => Ok(Self::Reject),
            other => Err(anyhow::anyhow!(
                "unknown duplicate policy: {other} (expected replace/reject)"
            )),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SchedulingSettings {
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
    /// Drop triggers past the routine's end date and allow `sweep` to cancel
    /// finished routines. Off by default: triggers repeat indefinitely.
    #[serde(default)]
    pub enforce_end_date: bool,
    /// Upper bound on one scheduling batch; unbounded when absent.
    pub batch_timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// Whether the local host grants notification permission.
    #[serde(default = "default_true")]
    pub notifications_allowed: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            notifications_allowed: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `warn` or `pillroutine=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load config from the standard path, or return defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the standard path.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
            }
        }
        let contents = toml::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::fs::{self, OpenOptions};
            use std::io::Write;
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

            let mut options = OpenOptions::new();
            options.write(true).create(true).truncate(true).mode(0o600);
            let mut file = options.open(&path)?;

            file.write_all(contents.as_bytes())?;

            // Files created before this version may carry looser modes.
            let mut perms = file.metadata()?.permissions();
            if perms.mode() & 0o777 != 0o600 {
                perms.set_mode(0o600);
                fs::set_permissions(&path, perms)?;
            }
        }
        #[cfg(not(unix))]
        {
            std::fs::write(&path, contents)?;
        }

        Ok(())
    }

    /// Apply a `section.key = value` assignment from the command line.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "notifications.channel_name" => self.notifications.channel_name = value.to_string(),
            "notifications.title" => self.notifications.title = value.to_string(),
            "notifications.body" => self.notifications.body = value.to_string(),
            "scheduling.on_duplicate" => self.scheduling.on_duplicate = value.parse()?,
            "scheduling.enforce_end_date" => self.scheduling.enforce_end_date = value.parse()?,
            "scheduling.batch_timeout_ms" => {
                self.scheduling.batch_timeout_ms = match value {
                    "none" | "" => None,
                    v => Some(v.parse()?),
                }
            }
            "platform.notifications_allowed" => {
                self.platform.notifications_allowed = value.parse()?
            }
            "logging.level" => self.logging.level = value.to_string(),
            _ => anyhow::bail!("unknown config key: {}", key),
        }
        Ok(())
    }

    pub fn data_dir() -> PathBuf {
        if let Ok(home) = std::env::var("PILLROUTINE_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pillroutine")
    }

    pub fn path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    pub fn db_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }
}
