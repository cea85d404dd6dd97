//! The handle returned by a successful [`crate::Volume::reserve`] call.

/// A held reservation of space on a volume. The Space Reserver contract
/// only requires that a reservation *exist*; whether bytes are actually
/// pre-allocated on disk is a backend concern (the local filesystem backend
/// does not pre-allocate — see [`crate::local::LocalVolume`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    volume: String,
    bytes: u64,
}

impl Reservation {
    pub fn new(volume: String, bytes: u64) -> Self {
        Self { volume, bytes }
    }

    pub fn volume(&self) -> &str {
        &self.volume
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}
