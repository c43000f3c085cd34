//! Error taxonomy for the simulation kernel.
//!
//! `ConfigurationError` is fatal and propagated with `?` from the handful of
//! public entry points that load a world preset. Everything else
//! (`State`/`Numerical`/`ContractViolation`/`NotReady`) is recoverable: the
//! kernel logs it once per unique key via [`OnceLog`] and absorbs it, since
//! `step` must never throw once a simulation is running.

use std::collections::HashSet;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("world preset references unknown parent body `{0}`")]
    UnknownParent(String),

    #[error("world preset references unknown spawn host `{0}`")]
    UnknownSpawnHost(String),

    #[error("world preset `bodies` array is empty")]
    NoBodies,

    #[error("body `{0}` has non-positive mass or radius")]
    InvalidBody(String),

    #[error("mission references unknown body `{0}`")]
    UnknownMissionBody(String),

    #[error("failed to read world preset file `{path}`: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse world preset JSON: {0}")]
    Parse(String),
}

impl From<std::io::Error> for ConfigurationError {
    fn from(source: std::io::Error) -> Self {
        ConfigurationError::Io {
            path: String::new(),
            message: source.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(source: serde_json::Error) -> Self {
        ConfigurationError::Parse(source.to_string())
    }
}

/// The four recoverable kinds from spec.md §7. None of these ever abort a
/// tick; they exist purely to classify what gets logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoverableKind {
    /// Model reached an inconsistent but non-fatal state (e.g. a `Landed`
    /// rocket whose anchor body vanished from the preset).
    State,
    /// A computed quantity was non-finite or out of a sane physical range.
    Numerical,
    /// A module observed another module violating its write-ownership
    /// contract (e.g. something other than the Rocket Controller touching
    /// `thruster.power`).
    ContractViolation,
    /// An operation was requested before its prerequisite state exists
    /// (e.g. `step()` before `init_world()`).
    NotReady,
}

impl RecoverableKind {
    fn as_str(self) -> &'static str {
        match self {
            RecoverableKind::State => "state",
            RecoverableKind::Numerical => "numerical",
            RecoverableKind::ContractViolation => "contract_violation",
            RecoverableKind::NotReady => "not_ready",
        }
    }
}

/// Dedup-by-key log sink: each unique `(kind, key)` pair is only ever
/// `tracing::warn!`-ed once, so a persistently broken body reference does
/// not spam the log every tick.
#[derive(Debug, Default)]
pub struct OnceLog {
    seen: HashSet<(RecoverableKind, String)>,
}

impl OnceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_once(&mut self, kind: RecoverableKind, key: impl Into<String>, message: impl AsRef<str>) {
        let key = key.into();
        if self.seen.insert((kind, key.clone())) {
            tracing::warn!(kind = kind.as_str(), key = %key, "{}", message.as_ref());
        }
    }

    pub fn reset(&mut self) {
        self.seen.clear();
    }
}
