use crate::error::ActionError;
use crate::grid::{all_upright, QuarterTurns};

#[derive(Clone, Debug)]
pub struct PuzzleState {
    seed: Vec<QuarterTurns>,
    current: Vec<QuarterTurns>,
    locked: bool,
}

impl PuzzleState {
    pub fn new(seed: Vec<QuarterTurns>) -> Self {
        let current = seed.clone();
        Self {
            seed,
            current,
            locked: false,
        }
    }

    pub fn initialize(&mut self, seed: Vec<QuarterTurns>) {
        self.current = seed.clone();
        self.seed = seed;
    }

    pub fn seed(&self) -> &[QuarterTurns] {
        &self.seed
    }

    pub fn current(&self) -> &[QuarterTurns] {
        &self.current
    }

    pub fn tile_count(&self) -> usize {
        self.seed.len()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn rotate(&mut self, index: usize) -> Result<QuarterTurns, ActionError> {
        if self.locked {
            return Err(ActionError::Locked);
        }
        let count = self.current.len();
        let Some(turn) = self.current.get_mut(index) else {
            return Err(ActionError::TileOutOfRange { index, count });
        };
        *turn = turn.turned();
        Ok(*turn)
    }

    pub fn reset_to_seed(&mut self) -> Result<(), ActionError> {
        if self.locked {
            return Err(ActionError::Locked);
        }
        self.current.clone_from(&self.seed);
        Ok(())
    }

    pub fn is_solved(&self) -> bool {
        all_upright(&self.current)
    }

    pub fn adopt_current_as_seed(&mut self) {
        self.seed.clone_from(&self.current);
    }

    pub(crate) fn show_solved_snapshot(&mut self) {
        self.current = vec![QuarterTurns::ZERO; self.seed.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::turns_from_values;

    #[test]
    fn rotate_wraps_three_to_zero() {
        let mut state = PuzzleState::new(turns_from_values(&[3, 0]));
        assert_eq!(state.rotate(0), Ok(QuarterTurns::ZERO));
        assert!(state.is_solved());
    }

    #[test]
    fn rotate_out_of_range_leaves_grid_alone() {
        let mut state = PuzzleState::new(turns_from_values(&[1, 2]));
        assert_eq!(
            state.rotate(2),
            Err(ActionError::TileOutOfRange { index: 2, count: 2 })
        );
        assert_eq!(state.current(), state.seed());
    }

    #[test]
    fn locked_state_refuses_mutation() {
        let mut state = PuzzleState::new(turns_from_values(&[1, 2]));
        state.lock();
        assert_eq!(state.rotate(0), Err(ActionError::Locked));
        assert_eq!(state.reset_to_seed(), Err(ActionError::Locked));
        state.unlock();
        assert!(state.rotate(0).is_ok());
    }

    #[test]
    fn solved_snapshot_keeps_seed() {
        let mut state = PuzzleState::new(turns_from_values(&[1, 2, 3]));
        state.show_solved_snapshot();
        assert!(state.is_solved());
        assert_eq!(state.seed(), turns_from_values(&[1, 2, 3]).as_slice());
    }
}
