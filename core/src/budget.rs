#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UndoBudgetPolicy {
    #[default]
    KeepCount,
    RestoreCount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveBudget {
    limit: Option<u32>,
    count: u32,
}

impl MoveBudget {
    pub fn new(limit: Option<u32>) -> Self {
        Self { limit, count: 0 }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn can_act(&self) -> bool {
        match self.limit {
            Some(limit) => self.count < limit,
            None => true,
        }
    }

    pub fn record_move(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn remaining(&self) -> Option<u32> {
        self.limit.map(|limit| limit.saturating_sub(self.count))
    }

    pub fn is_exhausted(&self) -> bool {
        !self.can_act()
    }

    pub fn on_undo(&mut self, policy: UndoBudgetPolicy) {
        if policy == UndoBudgetPolicy::RestoreCount {
            self.count = 0;
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_blocks_after_last_move() {
        let mut budget = MoveBudget::new(Some(2));
        assert!(budget.can_act());
        budget.record_move();
        budget.record_move();
        assert!(!budget.can_act());
        assert_eq!(budget.remaining(), Some(0));
    }

    #[test]
    fn unlimited_never_blocks() {
        let mut budget = MoveBudget::unlimited();
        for _ in 0..1000 {
            budget.record_move();
        }
        assert!(budget.can_act());
        assert_eq!(budget.remaining(), None);
    }

    #[test]
    fn undo_policy_controls_count() {
        let mut budget = MoveBudget::new(Some(1));
        budget.record_move();
        budget.on_undo(UndoBudgetPolicy::KeepCount);
        assert!(budget.is_exhausted());
        budget.on_undo(UndoBudgetPolicy::RestoreCount);
        assert!(budget.can_act());
    }
}
