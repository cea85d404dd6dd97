//! Storage volumes and space reservation for the write path.
//!
//! A [`StoragePolicy`] names an ordered list of [`Volume`]s; the Space
//! Reserver picks the first volume whose move-TTL rules don't exclude the
//! incoming part and that has enough free space, falling back to volume 0
//! if none qualify. Only a local-filesystem [`Volume`] backend is
//! implemented — cloud object stores are out of scope (see DESIGN.md).

pub mod local;
pub mod reservation;

use data_types::TtlInfo;
use snafu::Snafu;
use time::Time;

pub use reservation::Reservation;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("no volume in the storage policy had enough free space for {} bytes", needed))]
    OutOfSpace { needed: u64 },

    #[snafu(display("volume {} error: {}", volume, source))]
    Volume {
        volume: String,
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A move-TTL rule attached to a volume: rows whose move-TTL summary says
/// they're due to move arrive here once `age_threshold_secs` has elapsed
/// since `now`.
#[derive(Debug, Clone, Copy)]
pub struct MoveRule {
    pub age_threshold_secs: i64,
}

impl MoveRule {
    /// Whether a part with the given move-TTL summary is excluded from this
    /// volume at `now` — i.e. the part's rows are old enough that the move
    /// rule says they belong on a *later* volume instead.
    pub fn excludes(&self, move_ttl: &TtlInfo, now: Time) -> bool {
        match move_ttl.max {
            Some(max) => now.timestamp() - max.timestamp() >= self.age_threshold_secs,
            None => false,
        }
    }
}

/// One named destination for part data, with a declared capacity and an
/// optional move-TTL rule governing whether aging parts should be excluded
/// from it in favor of a later volume in the policy.
pub trait Volume: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Bytes currently available for new parts. Queried fresh on every
    /// reservation attempt so tests can simulate a volume filling up.
    fn available_bytes(&self) -> u64;

    /// The move rule excluding aging parts from this volume, if any.
    fn move_rule(&self) -> Option<MoveRule> {
        None
    }

    /// Reserve `bytes` worth of space, returning a handle that releases the
    /// reservation on drop.
    fn reserve(&self, bytes: u64) -> Result<Reservation>;
}

/// An ordered list of volumes a table's parts may land on.
#[derive(Debug)]
pub struct StoragePolicy {
    volumes: Vec<Box<dyn Volume>>,
}

impl StoragePolicy {
    pub fn new(volumes: Vec<Box<dyn Volume>>) -> Self {
        assert!(!volumes.is_empty(), "a storage policy needs at least one volume");
        Self { volumes }
    }

    /// Pick the first volume whose move-TTL rule doesn't exclude `move_ttl`
    /// at `now` and that has `bytes` free, falling back to volume 0 if none
    /// qualify. Returns `Err` only if even volume 0 cannot satisfy the
    /// reservation.
    pub fn reserve(&self, bytes: u64, move_ttl: &TtlInfo, now: Time) -> Result<Reservation> {
        for volume in &self.volumes {
            let excluded = volume
                .move_rule()
                .map(|rule| rule.excludes(move_ttl, now))
                .unwrap_or(false);
            if !excluded && volume.available_bytes() >= bytes {
                return volume.reserve(bytes);
            }
        }
        self.volumes[0].reserve(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeVolume {
        name: &'static str,
        available: u64,
        rule: Option<MoveRule>,
    }

    impl Volume for FakeVolume {
        fn name(&self) -> &str {
            self.name
        }
        fn available_bytes(&self) -> u64 {
            self.available
        }
        fn move_rule(&self) -> Option<MoveRule> {
            self.rule
        }
        fn reserve(&self, bytes: u64) -> Result<Reservation> {
            if self.available < bytes {
                return OutOfSpaceSnafu { needed: bytes }.fail();
            }
            Ok(Reservation::new(self.name.to_string(), bytes))
        }
    }

    #[test]
    fn falls_back_to_volume_zero_when_nothing_qualifies() {
        let policy = StoragePolicy::new(vec![
            Box::new(FakeVolume {
                name: "fast",
                available: 10,
                rule: None,
            }),
            Box::new(FakeVolume {
                name: "slow",
                available: 5,
                rule: None,
            }),
        ]);
        // Neither volume has 100 bytes free; volume 0 ("fast") is still
        // attempted and fails loudly rather than silently succeeding on "slow".
        assert!(policy.reserve(100, &TtlInfo::default(), Time::from_timestamp(0)).is_err());
    }

    #[test]
    fn picks_second_volume_when_first_excluded_by_move_ttl() {
        let policy = StoragePolicy::new(vec![
            Box::new(FakeVolume {
                name: "hot",
                available: 1_000,
                rule: Some(MoveRule {
                    age_threshold_secs: 60,
                }),
            }),
            Box::new(FakeVolume {
                name: "cold",
                available: 1_000,
                rule: None,
            }),
        ]);
        let mut move_ttl = TtlInfo::default();
        move_ttl.update(Time::from_timestamp(0));
        let now = Time::from_timestamp(120);
        let reservation = policy.reserve(10, &move_ttl, now).unwrap();
        assert_eq!(reservation.volume(), "cold");
    }
}
