//! Configuration loading from TOML files.
//!
//! ```toml
//! [notifier]
//! admin_phone = "+15550100"
//! serial_port = "/dev/ttyUSB0"   # omit to log messages instead
//!
//! [master]
//! badge_id = "C3A1F2B0"
//!
//! [[users]]
//! badge_id = "53622439"
//! name = "Mr. Hans"
//! start = "08:00"
//! end = "17:30"
//! days = ["Mon", "Tue", "Wed", "Thu", "Fri"]
//! ```

use anyhow::Context;
use doorwarden_access::{AccessEngine, AccessProfile, EnginePolicy, MasterProfile, UserDirectory};
use doorwarden_core::{
    AccessWindow, BadgeId, Error, TimeOfDay, WeekdaySet,
    constants::{
        DEFAULT_MASTER_GRANT_MINUTES, DEFAULT_MASTER_NAME, DEFAULT_NOTIFICATION_COOLDOWN_SECS,
        MAX_DIRECTORY_ENTRIES, MAX_MASTER_GRANT_MINUTES,
    },
};
use doorwarden_reporting::{AuditFormat, Cooldown};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub notifier: NotifierConfig,
    pub master: MasterConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifierConfig {
    pub admin_phone: String,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// SIM800L serial device; messages are only logged when absent
    #[serde(default)]
    pub serial_port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

fn default_cooldown_secs() -> u64 {
    DEFAULT_NOTIFICATION_COOLDOWN_SECS
}

fn default_baud_rate() -> u32 {
    9600
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MasterConfig {
    pub badge_id: BadgeId,
    #[serde(default = "default_master_name")]
    pub name: String,
    #[serde(default = "default_grant_minutes")]
    pub grant_minutes: u64,
}

fn default_master_name() -> String {
    DEFAULT_MASTER_NAME.to_string()
}

fn default_grant_minutes() -> u64 {
    DEFAULT_MASTER_GRANT_MINUTES
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default = "default_allow_reassign")]
    pub allow_reassign_while_held: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allow_reassign_while_held: default_allow_reassign(),
        }
    }
}

fn default_allow_reassign() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    #[serde(default)]
    pub format: AuditFormat,
    /// Append to this file; standard output when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub badge_id: BadgeId,
    pub name: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    #[serde(default = "all_days")]
    pub days: WeekdaySet,
}

fn all_days() -> WeekdaySet {
    WeekdaySet::ALL
}

impl Config {
    /// Read, parse and validate a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Check the rules serde cannot express.
    ///
    /// Inverted windows are accepted with a warning; they never match.
    pub fn validate(&self) -> doorwarden_core::Result<()> {
        if self.notifier.admin_phone.trim().is_empty() {
            return Err(Error::MissingConfig("notifier.admin_phone".into()));
        }
        if !(1..=MAX_MASTER_GRANT_MINUTES).contains(&self.master.grant_minutes) {
            return Err(Error::Config(format!(
                "master.grant_minutes must be between 1 and {MAX_MASTER_GRANT_MINUTES}"
            )));
        }
        if self.users.len() > MAX_DIRECTORY_ENTRIES {
            return Err(Error::DirectoryFull {
                capacity: MAX_DIRECTORY_ENTRIES,
            });
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if user.badge_id == self.master.badge_id {
                return Err(Error::Config(format!(
                    "user '{}' uses the master badge {}",
                    user.name, user.badge_id
                )));
            }
            if !seen.insert(user.badge_id.clone()) {
                return Err(Error::Config(format!(
                    "badge {} is listed more than once",
                    user.badge_id
                )));
            }
            if user.start > user.end {
                warn!(
                    "User '{}' has window {}-{} ending before it starts; it will never match",
                    user.name, user.start, user.end
                );
            }
            if user.days.is_empty() {
                warn!("User '{}' has no allowed days", user.name);
            }
        }
        Ok(())
    }

    /// Build the decision engine.
    pub fn engine(&self) -> doorwarden_core::Result<AccessEngine> {
        let grant_secs = self.master.grant_minutes.checked_mul(60).ok_or_else(|| {
            Error::Config(format!(
                "master.grant_minutes {} is out of range",
                self.master.grant_minutes
            ))
        })?;
        let master = MasterProfile::new(
            self.master.badge_id.clone(),
            self.master.name.clone(),
            Duration::from_secs(grant_secs),
        );
        let profiles = self
            .users
            .iter()
            .map(|user| {
                AccessProfile::new(
                    user.badge_id.clone(),
                    user.name.clone(),
                    user.days,
                    AccessWindow::new(user.start, user.end),
                )
            })
            .collect();
        let policy = EnginePolicy {
            allow_reassign_while_held: self.policy.allow_reassign_while_held,
        };
        Ok(AccessEngine::new(master, UserDirectory::new(profiles)?).with_policy(policy))
    }

    pub fn cooldown(&self) -> Cooldown {
        Cooldown::new(Duration::from_secs(self.notifier.cooldown_secs))
    }
}
