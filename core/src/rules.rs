use crate::budget::UndoBudgetPolicy;
use crate::grid::{GridSpec, DEFAULT_GRID};

pub const MOVE_LIMIT_DEFAULT: u32 = 27;
pub const COUNTDOWN_TICKS_DEFAULT: u32 = 3;
pub const COUNTDOWN_TICK_MS: u32 = 1000;
pub const FAILURE_CLEAR_MS: u32 = 1200;
pub const REFUSAL_CLEAR_MS: u32 = 1500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PuzzleRules {
    pub grid: GridSpec,
    pub move_limit: Option<u32>,
    pub undo_policy: UndoBudgetPolicy,
    pub countdown_ticks: u32,
    pub tick_ms: u32,
    pub failure_clear_ms: u32,
    pub token_mixing: bool,
}

impl PuzzleRules {
    pub const DEFAULT: PuzzleRules = PuzzleRules {
        grid: DEFAULT_GRID,
        move_limit: Some(MOVE_LIMIT_DEFAULT),
        undo_policy: UndoBudgetPolicy::KeepCount,
        countdown_ticks: COUNTDOWN_TICKS_DEFAULT,
        tick_ms: COUNTDOWN_TICK_MS,
        failure_clear_ms: FAILURE_CLEAR_MS,
        token_mixing: true,
    };
}

impl Default for PuzzleRules {
    fn default() -> Self {
        Self::DEFAULT
    }
}
