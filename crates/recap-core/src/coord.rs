//! Chunk keys and intra-section block indices.
//!
//! A chunk column is addressed by its `(x, z)` chunk coordinate, packed
//! into one `u64` key with `x` in the high half. Within a column, a block
//! lives in one of [`SECTIONS_PER_CHUNK`] vertical sections and is
//! addressed there by a compact 15-bit index.

/// Number of vertical 16-block sections in a chunk column.
pub const SECTIONS_PER_CHUNK: usize = 16;

/// Edge length of a chunk section in blocks.
pub const SECTION_SIZE: i32 = 16;

/// Pack a chunk coordinate into a single 64-bit key.
#[must_use]
pub const fn chunk_key(x: i32, z: i32) -> u64 {
    ((x as u32 as u64) << 32) | (z as u32 as u64)
}

/// Recover the `x` half of a packed chunk key.
#[must_use]
pub const fn chunk_key_x(key: u64) -> i32 {
    (key >> 32) as u32 as i32
}

/// Recover the `z` half of a packed chunk key.
#[must_use]
pub const fn chunk_key_z(key: u64) -> i32 {
    key as u32 as i32
}

/// Chunk coordinate containing the block at world `(x, z)`.
#[must_use]
pub const fn chunk_of_block(x: i32, z: i32) -> (i32, i32) {
    (x >> 4, z >> 4)
}

/// Section holding world height `y`, or `None` outside the column.
#[must_use]
pub fn section_of(y: i32) -> Option<usize> {
    let section = usize::try_from(y.div_euclid(SECTION_SIZE)).ok()?;
    (section < SECTIONS_PER_CHUNK).then_some(section)
}

/// Pack a block position into its index inside the owning section.
///
/// Layout is `x << 10 | y << 5 | z`, each component reduced into `0..16`
/// with a Euclidean remainder so negative world coordinates map onto the
/// same cells as the client.
#[must_use]
pub const fn block_index(x: i32, y: i32, z: i32) -> u16 {
    let bx = x.rem_euclid(SECTION_SIZE) as u16;
    let by = y.rem_euclid(SECTION_SIZE) as u16;
    let bz = z.rem_euclid(SECTION_SIZE) as u16;
    (bx << 10) | (by << 5) | bz
}

/// Unpack a section-local index into `(x, y, z)` offsets.
#[must_use]
pub const fn unpack_block_index(index: u16) -> (u8, u8, u8) {
    (
        ((index >> 10) & 0x1f) as u8,
        ((index >> 5) & 0x1f) as u8,
        (index & 0x1f) as u8,
    )
}
