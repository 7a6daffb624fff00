use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
}

pub const DEFAULT_GRID: GridSpec = GridSpec { rows: 4, cols: 7 };

pub const QUARTER_TURN_DEG: u32 = 90;

impl GridSpec {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    pub const fn tile_count(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.tile_count()
    }

    pub fn row_col(&self, index: usize) -> (u32, u32) {
        let cols = self.cols.max(1) as usize;
        ((index / cols) as u32, (index % cols) as u32)
    }

    pub fn is_last_col(&self, index: usize) -> bool {
        self.row_col(index).1 + 1 == self.cols
    }

    pub fn is_last_row(&self, index: usize) -> bool {
        self.row_col(index).0 + 1 == self.rows
    }

    pub fn tile_rects(&self, width: u32, height: u32) -> Result<Vec<TileRect>, GridError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        if width == 0 || height == 0 {
            return Err(GridError::EmptyImage { width, height });
        }
        let tile_w = width as f64 / self.cols as f64;
        let tile_h = height as f64 / self.rows as f64;
        let out_w = (tile_w.round() as u32).max(1);
        let out_h = (tile_h.round() as u32).max(1);
        let mut rects = Vec::with_capacity(self.tile_count());
        for row in 0..self.rows {
            for col in 0..self.cols {
                rects.push(TileRect {
                    index: (row * self.cols + col) as usize,
                    sx: col as f64 * tile_w,
                    sy: row as f64 * tile_h,
                    sw: tile_w,
                    sh: tile_h,
                    out_w,
                    out_h,
                });
            }
        }
        Ok(rects)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        DEFAULT_GRID
    }
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileRect {
    pub index: usize,
    pub sx: f64,
    pub sy: f64,
    pub sw: f64,
    pub sh: f64,
    pub out_w: u32,
    pub out_h: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid has no tiles")]
    EmptyGrid,
    #[error("invalid image dimensions {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuarterTurns(u8);

impl QuarterTurns {
    pub const ZERO: QuarterTurns = QuarterTurns(0);

    pub const fn new(turns: u8) -> Self {
        Self(turns % 4)
    }

    pub fn from_signed(turns: i64) -> Self {
        Self(turns.rem_euclid(4) as u8)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn degrees(self) -> u32 {
        self.0 as u32 * QUARTER_TURN_DEG
    }

    pub const fn turned(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    pub const fn plus(self, other: QuarterTurns) -> Self {
        Self((self.0 + other.0) % 4)
    }

    pub const fn is_upright(self) -> bool {
        self.0 == 0
    }

    pub const fn clicks_to_upright(self) -> u32 {
        ((4 - self.0) % 4) as u32
    }
}

impl From<QuarterTurns> for u8 {
    fn from(value: QuarterTurns) -> Self {
        value.0
    }
}

pub fn turns_from_values(values: &[u8]) -> Vec<QuarterTurns> {
    values.iter().copied().map(QuarterTurns::new).collect()
}

pub fn turns_to_values(turns: &[QuarterTurns]) -> Vec<u8> {
    turns.iter().map(|turn| turn.get()).collect()
}

pub fn all_upright(turns: &[QuarterTurns]) -> bool {
    turns.iter().all(|turn| turn.is_upright())
}

pub fn min_moves_to_solve(turns: &[QuarterTurns]) -> u32 {
    turns.iter().map(|turn| turn.clicks_to_upright()).sum()
}
