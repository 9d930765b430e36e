//! Hashed tile coding.
//!
//! Overlays `num_tilings` grids on a continuous space, each offset from the last by an
//! asymmetric fraction of a tile width, and maps the active cell of each grid to an index
//! in `0 .. size` through an [`IndexHashTable`].
//!
//! Based on "tiles3" by Richard S. Sutton (<http://incompleteideas.net/tiles/tiles3.html>).
use crate::state::Tiles;
use log::warn;
use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Assigns consecutive indices to tile coordinate tuples, up to a fixed capacity.
///
/// Once `size` distinct tuples have been assigned, any new tuple is mapped to
/// `hash(coordinates) % size`, colliding with an existing index.
/// The mapping stays deterministic so the same coordinates always get the same index.
/// Each such collision is counted in [`IndexHashTable::overfull_count`] and the first one is
/// reported with a `log` warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHashTable {
    size: usize,
    overfull_count: u64,
    dictionary: HashMap<Vec<i64>, usize>,
}

impl IndexHashTable {
    /// Create an empty table with capacity `size` (must be nonzero).
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "index hash table size must be nonzero");
        Self {
            size,
            overfull_count: 0,
            dictionary: HashMap::new(),
        }
    }

    /// Capacity; all indices are in `0 .. size`.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of coordinate tuples with their own index.
    pub fn count(&self) -> usize {
        self.dictionary.len()
    }

    pub fn is_full(&self) -> bool {
        self.count() >= self.size
    }

    /// Number of lookups that had to reuse an index because the table was full.
    ///
    /// Nonzero means the table is under-provisioned for the observed inputs.
    pub const fn overfull_count(&self) -> u64 {
        self.overfull_count
    }

    /// Remove all assignments.
    pub fn clear(&mut self) {
        self.dictionary.clear();
        self.overfull_count = 0;
    }

    /// Index for the given coordinates, assigning a new one if unseen.
    pub fn index(&mut self, coordinates: &[i64]) -> usize {
        if let Some(&index) = self.dictionary.get(coordinates) {
            return index;
        }
        let count = self.dictionary.len();
        if count >= self.size {
            if self.overfull_count == 0 {
                warn!(
                    "index hash table full ({} entries), starting to allow collisions",
                    self.size
                );
            }
            self.overfull_count += 1;
            return self.collision_index(coordinates);
        }
        match self.dictionary.entry(coordinates.to_vec()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => *entry.insert(count),
        }
    }

    /// Index for the given coordinates without modifying the table.
    ///
    /// Returns `None` if the coordinates have not been assigned an index.
    pub fn index_read_only(&self, coordinates: &[i64]) -> Option<usize> {
        self.dictionary.get(coordinates).copied()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn collision_index(&self, coordinates: &[i64]) -> usize {
        let mut hasher = DefaultHasher::new();
        coordinates.hash(&mut hasher);
        (hasher.finish() % self.size as u64) as usize
    }

    /// Active tiles for a point in tile-width units.
    ///
    /// # Args
    /// * `num_tilings` - Number of offset grids. A power of two of at least `4 * floats.len()`
    ///     gives the most uniform coverage.
    /// * `floats` - Point coordinates, scaled so that one unit is one tile width.
    /// * `ints` - Additional integer coordinates that are not tiled (e.g. an action).
    ///
    /// # Returns
    /// One index per tiling. Points in the same cell of a tiling always get the same index
    /// for that tiling.
    pub fn tiles(&mut self, num_tilings: usize, floats: &[f64], ints: &[i64]) -> Tiles {
        tile_coordinates(num_tilings, floats, ints)
            .map(|coordinates| self.index(&coordinates))
            .collect()
    }

    /// Active tiles without assigning new indices.
    ///
    /// Returns `None` if any tiling lands in a cell that has no index.
    pub fn tiles_read_only(&self, num_tilings: usize, floats: &[f64], ints: &[i64]) -> Option<Tiles> {
        tile_coordinates(num_tilings, floats, ints)
            .map(|coordinates| self.index_read_only(&coordinates))
            .collect()
    }
}

/// Grid coordinates `[tiling, cell_0, .., cell_n, ints..]` of the active cell in each tiling.
///
/// Tiling `t` is offset by `t * (2i + 1) / num_tilings` tile widths along dimension `i`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn tile_coordinates<'a>(
    num_tilings: usize,
    floats: &[f64],
    ints: &'a [i64],
) -> impl Iterator<Item = Vec<i64>> + 'a {
    let n = num_tilings as i64;
    let quantized: Vec<i64> = floats
        .iter()
        .map(|f| (f * num_tilings as f64).floor() as i64)
        .collect();
    (0..n).map(move |tiling| {
        let mut coordinates = Vec::with_capacity(1 + quantized.len() + ints.len());
        coordinates.push(tiling);
        let mut offset = tiling;
        for q in &quantized {
            coordinates.push((q + offset).div_euclid(n));
            offset += tiling * 2;
        }
        coordinates.extend_from_slice(ints);
        coordinates
    })
}

/// Tile coder for points in a fixed box, backed by its own [`IndexHashTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TileCoder {
    table: IndexHashTable,
    num_tilings: usize,
    /// Lower corner of the box; subtracted before scaling.
    low: Vec<f64>,
    /// Tiles per unit along each dimension.
    scale: Vec<f64>,
}

impl TileCoder {
    /// Create a tile coder over the box `low .. high` with `num_tiles[i]` tiles per tiling
    /// along dimension `i`.
    ///
    /// The table size is `num_tilings * prod(num_tiles[i] + 1)`: enough for every cell of
    /// every tiling, since each offset tiling covers at most one extra cell per dimension.
    pub fn new(num_tilings: usize, low: &[f64], high: &[f64], num_tiles: &[usize]) -> Self {
        assert_eq!(low.len(), high.len());
        assert_eq!(low.len(), num_tiles.len());
        let size = num_tilings * num_tiles.iter().map(|n| n + 1).product::<usize>();
        let scale = num_tiles
            .iter()
            .zip(low.iter().zip(high))
            .map(|(&n, (l, h))| n as f64 / (h - l))
            .collect();
        Self {
            table: IndexHashTable::new(size),
            num_tilings,
            low: low.to_vec(),
            scale,
        }
    }

    pub const fn num_tilings(&self) -> usize {
        self.num_tilings
    }

    /// Size of the feature space; all tile indices are in `0 .. size`.
    pub const fn size(&self) -> usize {
        self.table.size()
    }

    pub const fn table(&self) -> &IndexHashTable {
        &self.table
    }

    /// Forget all index assignments.
    pub fn reset(&mut self) {
        self.table.clear();
    }

    fn scaled(&self, point: &[f64]) -> Vec<f64> {
        point
            .iter()
            .zip(&self.low)
            .zip(&self.scale)
            .map(|((x, low), scale)| (x - low) * scale)
            .collect()
    }

    /// Active tiles for a point in the box.
    pub fn tiles(&mut self, point: &[f64]) -> Tiles {
        let floats = self.scaled(point);
        self.table.tiles(self.num_tilings, &floats, &[])
    }

    /// Active tiles for a point in the box if all of them already have an index.
    pub fn tiles_read_only(&self, point: &[f64]) -> Option<Tiles> {
        let floats = self.scaled(point);
        self.table.tiles_read_only(self.num_tilings, &floats, &[])
    }
}
