//! Deterministic bucketing of observations into value-table rows.
//!
//! The hash is FNV-1a (64-bit) over every observation value encoded as a
//! little-endian `i32`, reduced modulo the table size. It is fixed so that a
//! persisted table keeps meaning the same thing across builds and platforms.
//! Collisions are expected: 11^4 * 2^4 raw states share 1000 rows.

use intersection::Observation;

/// Rows in the value table.
pub const TABLE_SIZE: usize = 1000;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[must_use]
pub fn state_hash(values: &[i32]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for value in values {
        for byte in value.to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

/// Row index of `observation` in a table with `table_size` rows.
///
/// # Panics
///
/// Panics if `table_size` is zero.
#[must_use]
pub fn state_id(observation: &Observation, table_size: usize) -> usize {
    assert!(table_size > 0, "value table must have at least one row");
    // The remainder is below table_size, which came from a usize.
    #[allow(clippy::cast_possible_truncation)]
    let id = (state_hash(observation.as_ref()) % table_size as u64) as usize;
    id
}
