#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownPhase {
    Idle,
    Counting { remaining: u32 },
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownStart {
    pub generation: u64,
    pub remaining: u32,
    pub delay_ms: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Stale,
    Continue {
        generation: u64,
        remaining: u32,
        delay_ms: u32,
    },
    Navigate { target: String },
    Done,
}

#[derive(Clone, Debug)]
pub struct CompletionSequencer {
    ticks: u32,
    tick_ms: u32,
    next_stage: Option<String>,
    phase: CountdownPhase,
    generation: u64,
}

impl CompletionSequencer {
    pub fn new(ticks: u32, tick_ms: u32, next_stage: Option<String>) -> Self {
        Self {
            ticks,
            tick_ms,
            next_stage,
            phase: CountdownPhase::Idle,
            generation: 0,
        }
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn remaining(&self) -> Option<u32> {
        match self.phase {
            CountdownPhase::Counting { remaining } => Some(remaining),
            CountdownPhase::Idle | CountdownPhase::Finished => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, CountdownPhase::Idle)
    }

    pub fn begin(&mut self) -> Option<CountdownStart> {
        if self.is_active() {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.ticks == 0 {
            self.phase = CountdownPhase::Counting { remaining: 0 };
            return Some(CountdownStart {
                generation: self.generation,
                remaining: 0,
                delay_ms: 0,
            });
        }
        self.phase = CountdownPhase::Counting {
            remaining: self.ticks,
        };
        Some(CountdownStart {
            generation: self.generation,
            remaining: self.ticks,
            delay_ms: self.tick_ms,
        })
    }

    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Stale;
        }
        let CountdownPhase::Counting { remaining } = self.phase else {
            return TickOutcome::Stale;
        };
        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.phase = CountdownPhase::Counting { remaining };
            return TickOutcome::Continue {
                generation,
                remaining,
                delay_ms: self.tick_ms,
            };
        }
        self.phase = CountdownPhase::Finished;
        self.generation = self.generation.wrapping_add(1);
        match &self.next_stage {
            Some(target) => TickOutcome::Navigate {
                target: target.clone(),
            },
            None => TickOutcome::Done,
        }
    }

    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.phase = CountdownPhase::Idle;
    }
}
