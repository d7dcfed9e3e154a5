//! LZ77 back-references over the decoded integers of a stream.

use crate::hybrid::HybridIntegerConfig;
use crate::Symbol;

/// How many decoded integers a stream remembers.
pub const WINDOW_SIZE: usize = 1 << 20;

const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// How far a distance token's special range extends when a multiplier is in use.
pub const NUM_SPECIAL_DISTANCES: u32 = 120;

/// `(dx, dy)` offsets of the short distances of two-dimensional data: with a row
/// width of `multiplier`, special distance `d` points `dx + multiplier * dy` back.
#[rustfmt::skip]
pub const SPECIAL_DISTANCES: [(i8, i8); NUM_SPECIAL_DISTANCES as usize] = [
    (0, 1), (1, 0), (1, 1), (-1, 1), (0, 2), (2, 0), (1, 2), (-1, 2), (2, 1), (-2, 1), (2, 2),
    (-2, 2), (0, 3), (3, 0), (1, 3), (-1, 3), (3, 1), (-3, 1), (2, 3), (-2, 3), (3, 2),
    (-3, 2), (0, 4), (4, 0), (1, 4), (-1, 4), (4, 1), (-4, 1), (3, 3), (-3, 3), (2, 4),
    (-2, 4), (4, 2), (-4, 2), (0, 5), (3, 4), (-3, 4), (4, 3), (-4, 3), (5, 0), (1, 5),
    (-1, 5), (5, 1), (-5, 1), (2, 5), (-2, 5), (5, 2), (-5, 2), (4, 4), (-4, 4), (3, 5),
    (-3, 5), (5, 3), (-5, 3), (0, 6), (6, 0), (1, 6), (-1, 6), (6, 1), (-6, 1), (2, 6),
    (-2, 6), (6, 2), (-6, 2), (4, 5), (-4, 5), (5, 4), (-5, 4), (3, 6), (-3, 6), (6, 3),
    (-6, 3), (0, 7), (7, 0), (1, 7), (-1, 7), (5, 5), (-5, 5), (7, 1), (-7, 1), (4, 6),
    (-4, 6), (6, 4), (-6, 4), (2, 7), (-2, 7), (7, 2), (-7, 2), (3, 7), (-3, 7), (7, 3),
    (-7, 3), (5, 6), (-5, 6), (6, 5), (-6, 5), (8, 0), (4, 7), (-4, 7), (7, 4), (-7, 4),
    (8, 1), (8, 2), (6, 6), (-6, 6), (8, 3), (5, 7), (-5, 7), (7, 5), (-7, 5), (8, 4), (6, 7),
    (-6, 7), (7, 6), (-7, 6), (8, 5), (7, 7), (-7, 7), (8, 6), (8, 7),
];

/// The LZ77 parameters of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lz77Params {
    /// Tokens at or above this value start a copy instead of standing for themselves.
    pub min_symbol: u32,
    /// The length of a copy whose length token expands to zero.
    pub min_length: u32,
    /// Expands copy length tokens.
    pub length_config: HybridIntegerConfig,
}

/// Turns an expanded distance token into a distance of at least one.
///
/// Without a multiplier the token is the distance minus one. With one, the first
/// [`NUM_SPECIAL_DISTANCES`] tokens name nearby positions of a two-dimensional
/// layout and the rest are shifted down past them.
pub fn map_distance(token: Symbol, multiplier: u32) -> u32 {
    if multiplier == 0 {
        return token.saturating_add(1);
    }
    if token >= NUM_SPECIAL_DISTANCES {
        return token - (NUM_SPECIAL_DISTANCES - 1);
    }

    let (dx, dy) = SPECIAL_DISTANCES[token as usize];
    let distance = dx as i64 + multiplier as i64 * dy as i64;
    distance.clamp(1, u32::MAX as i64) as u32
}

/// The circular history of a stream, plus the copy in progress.
#[derive(Clone)]
pub struct Window {
    values: Box<[Symbol]>,
    copy_pos: usize,
    num_to_copy: u32,
    num_decoded: usize,
}

impl Window {
    pub fn new() -> Self {
        Self {
            values: vec![0; WINDOW_SIZE].into_boxed_slice(),
            copy_pos: 0,
            num_to_copy: 0,
            num_decoded: 0,
        }
    }

    /// How many integers the stream has produced so far.
    pub fn num_decoded(&self) -> usize {
        self.num_decoded
    }

    /// Whether the values of a copy are still pending.
    #[inline(always)]
    pub fn is_copying(&self) -> bool {
        self.num_to_copy > 0
    }

    #[inline(always)]
    pub fn push(&mut self, value: Symbol) {
        self.values[self.num_decoded & WINDOW_MASK] = value;
        self.num_decoded += 1;
    }

    /// Starts copying `length` values from `distance` positions back, and returns the first.
    ///
    /// Distances reaching before the first decoded value, or out of the window,
    /// are clamped.
    pub fn start_copy(&mut self, distance: u32, length: u32) -> Symbol {
        let distance = (distance as usize).min(WINDOW_SIZE).min(self.num_decoded);
        self.copy_pos = self.num_decoded - distance;
        self.num_to_copy = length;
        self.copy_next()
    }

    /// Replays the next value of the copy in progress and appends it to the history.
    #[inline(always)]
    pub fn copy_next(&mut self) -> Symbol {
        let value = self.values[self.copy_pos & WINDOW_MASK];
        self.copy_pos += 1;
        self.num_to_copy = self.num_to_copy.saturating_sub(1);
        self.push(value);
        value
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("copy_pos", &self.copy_pos)
            .field("num_to_copy", &self.num_to_copy)
            .field("num_decoded", &self.num_decoded)
            .finish_non_exhaustive()
    }
}
