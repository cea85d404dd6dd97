//! Space Reserver glue: adapting `object_store::StoragePolicy` to the
//! inputs the write orchestrator has in hand at the `ReserveDir` state.

use data_types::TtlInfo;
use object_store::{Reservation, StoragePolicy};
use snafu::{ResultExt, Snafu};
use time::Time;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("reserving space: {}", source))]
    Reserve { source: object_store::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reserve `expected_bytes` on `policy`, honoring `move_ttl`'s preference
/// for a volume not yet due for this part's rows to move off of, falling
/// back to volume 0 per [`StoragePolicy::reserve`]'s contract.
pub fn reserve(policy: &StoragePolicy, expected_bytes: u64, move_ttl: &TtlInfo, now: Time) -> Result<Reservation> {
    policy.reserve(expected_bytes, move_ttl, now).context(ReserveSnafu)
}
