//! Centralized configuration for a RecordStore.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - StoreConfig::from_env() reads SLOTDB_* variables; fluent setters
//!   override specific fields.
//!
//! Performance-oriented defaults:
//! - data_fsync = false (durability of individual writes is the caller's
//!   call; close() still syncs the handle)
//! - create = true (open() creates the backing file if absent)

use std::fmt;

/// Top-level configuration for a RecordStore.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Whether to fsync the file after every slot write.
    /// Env: SLOTDB_DATA_FSYNC (default false; "1|true|on|yes" => true)
    pub data_fsync: bool,

    /// Whether open() creates the backing file when it does not exist.
    /// Env: SLOTDB_CREATE (default true; "0|false|off|no" => false)
    pub create: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_fsync: false,
            create: true,
        }
    }
}

fn env_flag(s: &str) -> bool {
    let s = s.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "yes" || s == "on"
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("SLOTDB_DATA_FSYNC") {
            cfg.data_fsync = env_flag(&v);
        }

        if let Ok(v) = std::env::var("SLOTDB_CREATE") {
            let s = v.trim().to_ascii_lowercase();
            cfg.create = !(s == "0" || s == "false" || s == "no" || s == "off");
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_data_fsync(mut self, on: bool) -> Self {
        self.data_fsync = on;
        self
    }

    pub fn with_create(mut self, on: bool) -> Self {
        self.create = on;
        self
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreConfig {{ data_fsync: {}, create: {} }}",
            self.data_fsync, self.create
        )
    }
}
