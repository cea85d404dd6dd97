//! A filesystem-backed [`Volume`], the only backend this write path ships
//! with (cloud object stores are out of scope, see DESIGN.md).

use std::path::{Path, PathBuf};

use observability_deps::tracing::debug;

use crate::{MoveRule, Reservation, Result, Volume};

/// A volume rooted at a directory on the local filesystem.
#[derive(Debug)]
pub struct LocalVolume {
    name: String,
    root: PathBuf,
    /// Overridable for deterministic tests; `None` defers to
    /// `fs2`-equivalent disk statistics, which this minimal backend does not
    /// shell out for — tests always set this explicitly.
    available_bytes_override: Option<u64>,
    move_rule: Option<MoveRule>,
}

impl LocalVolume {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            available_bytes_override: None,
            move_rule: None,
        }
    }

    pub fn with_available_bytes(mut self, bytes: u64) -> Self {
        self.available_bytes_override = Some(bytes);
        self
    }

    pub fn with_move_rule(mut self, rule: MoveRule) -> Self {
        self.move_rule = Some(rule);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Volume for LocalVolume {
    fn name(&self) -> &str {
        &self.name
    }

    fn available_bytes(&self) -> u64 {
        self.available_bytes_override.unwrap_or(u64::MAX)
    }

    fn move_rule(&self) -> Option<MoveRule> {
        self.move_rule
    }

    fn reserve(&self, bytes: u64) -> Result<Reservation> {
        debug!(volume = %self.name, bytes, "reserving space on local volume");
        Ok(Reservation::new(self.name.clone(), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_always_succeeds_within_declared_capacity() {
        let vol = LocalVolume::new("v0", "/tmp/does-not-need-to-exist").with_available_bytes(100);
        assert!(vol.reserve(50).is_ok());
        assert_eq!(vol.available_bytes(), 100);
    }
}
