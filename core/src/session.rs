use crate::answer::AnswerGate;
use crate::budget::MoveBudget;
use crate::catalog::ChapterConfig;
use crate::completion::{CompletionSequencer, CountdownStart, TickOutcome};
use crate::error::ActionError;
use crate::grid::QuarterTurns;
use crate::launch::LaunchParams;
use crate::resume::{PageShowSignal, ResumeDecision, SessionResumeController};
use crate::rules::{PuzzleRules, REFUSAL_CLEAR_MS};
use crate::seed::{encode_saved_seed, resolve_seed, SeedOrigin, SeedRequest};
use crate::state::PuzzleState;
use crate::status::{Status, StatusMessage, StatusTone};
use crate::storage::Stores;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Ready,
    AssetFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(CountdownStart),
    Rejected { solved: bool, answers_ok: bool },
    SetupChecked { solved: bool },
}

pub struct PuzzleSession {
    chapter: ChapterConfig,
    rules: PuzzleRules,
    setup: bool,
    token: String,
    image_src: String,
    phase: SessionPhase,
    state: PuzzleState,
    seed_origin: SeedOrigin,
    budget: MoveBudget,
    answers: AnswerGate,
    resume: SessionResumeController,
    completion: CompletionSequencer,
    status: Option<Status>,
    next_status_id: u64,
    stores: Stores,
}

impl PuzzleSession {
    pub fn new(chapter: &ChapterConfig, params: &LaunchParams, stores: Stores) -> Self {
        let chapter = *chapter;
        let rules = chapter.rules;
        let setup = params.setup;
        let token = params.token_or(chapter.default_token).to_string();
        let image_src = params.image_or(chapter.image_src).to_string();
        let budget = if setup {
            MoveBudget::unlimited()
        } else {
            MoveBudget::new(rules.move_limit)
        };
        let mut session = Self {
            chapter,
            rules,
            setup,
            token,
            image_src,
            phase: SessionPhase::Loading,
            state: PuzzleState::new(Vec::new()),
            seed_origin: SeedOrigin::Derived,
            budget,
            answers: AnswerGate::new(chapter.answers),
            resume: SessionResumeController::new(chapter.solved_marker_key),
            completion: CompletionSequencer::new(
                rules.countdown_ticks,
                rules.tick_ms,
                chapter.next_stage.map(str::to_string),
            ),
            status: None,
            next_status_id: 0,
            stores,
        };
        session.reseed();
        session.post(StatusMessage::Loading, StatusTone::Neutral, None);
        session
    }

    pub fn chapter(&self) -> &ChapterConfig {
        &self.chapter
    }

    pub fn rules(&self) -> &PuzzleRules {
        &self.rules
    }

    pub fn is_setup(&self) -> bool {
        self.setup
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn image_src(&self) -> &str {
        &self.image_src
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    pub fn seed(&self) -> &[QuarterTurns] {
        self.state.seed()
    }

    pub fn current(&self) -> &[QuarterTurns] {
        self.state.current()
    }

    pub fn seed_origin(&self) -> SeedOrigin {
        self.seed_origin
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    pub fn moves(&self) -> u32 {
        self.budget.count()
    }

    pub fn budget(&self) -> &MoveBudget {
        &self.budget
    }

    pub fn answers(&self) -> &AnswerGate {
        &self.answers
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn countdown_remaining(&self) -> Option<u32> {
        self.completion.remaining()
    }

    pub fn mark_ready(&mut self) {
        if self.phase != SessionPhase::Loading {
            return;
        }
        self.phase = SessionPhase::Ready;
        if matches!(
            self.status.as_ref().map(|status| &status.message),
            None | Some(StatusMessage::Loading)
        ) {
            self.post_intro();
        }
    }

    pub fn mark_asset_failed(&mut self) {
        self.phase = SessionPhase::AssetFailed;
        self.completion.cancel();
        let src = self.image_src.clone();
        self.post(StatusMessage::AssetFailed { src }, StatusTone::Bad, None);
    }

    pub fn rotate(&mut self, index: usize) -> Result<QuarterTurns, ActionError> {
        self.ensure_ready()?;
        if self.state.is_locked() {
            return self.refuse(ActionError::Locked);
        }
        let count = self.state.tile_count();
        if index >= count {
            return self.refuse(ActionError::TileOutOfRange { index, count });
        }
        if !self.budget.can_act() {
            let limit = self.budget.limit().unwrap_or_default();
            return self.refuse(ActionError::MoveLimitReached { limit });
        }
        let turn = self.state.rotate(index)?;
        if !self.setup {
            self.budget.record_move();
            if let (Some(limit), true) = (self.budget.limit(), self.budget.is_exhausted()) {
                self.post(StatusMessage::LimitReached { limit }, StatusTone::Neutral, None);
            }
        }
        Ok(turn)
    }

    pub fn undo(&mut self) -> Result<(), ActionError> {
        self.ensure_ready()?;
        if self.state.is_locked() {
            return self.refuse(ActionError::Locked);
        }
        self.state.reset_to_seed()?;
        self.budget.on_undo(self.rules.undo_policy);
        self.post(StatusMessage::UndoDone, StatusTone::Neutral, None);
        Ok(())
    }

    pub fn set_answer(&mut self, field_id: &str, text: &str) -> Result<(), ActionError> {
        if self.state.is_locked() {
            return self.refuse(ActionError::Locked);
        }
        match self.answers.set_answer(field_id, text) {
            Ok(()) => Ok(()),
            Err(err) => self.refuse(err),
        }
    }

    pub fn submit(&mut self) -> Result<SubmitOutcome, ActionError> {
        self.ensure_ready()?;
        if self.state.is_locked() {
            return self.refuse(ActionError::Locked);
        }
        let solved = self.state.is_solved();
        if self.setup {
            let tone = if solved { StatusTone::Ok } else { StatusTone::Bad };
            self.post(StatusMessage::SetupCheck { solved }, tone, None);
            return Ok(SubmitOutcome::SetupChecked { solved });
        }
        let answers_ok = self.answers.check();
        if !(solved && answers_ok) {
            let message = if solved {
                StatusMessage::RejectedAnswer
            } else {
                StatusMessage::RejectedUnsolved
            };
            let clear_after = self.rules.failure_clear_ms;
            self.post(message, StatusTone::Bad, Some(clear_after));
            return Ok(SubmitOutcome::Rejected { solved, answers_ok });
        }
        let Some(start) = self.completion.begin() else {
            return self.refuse(ActionError::Locked);
        };
        self.resume.mark_solved(self.stores.session.as_mut());
        self.state.lock();
        self.post(
            StatusMessage::Accepted {
                remaining: start.remaining,
            },
            StatusTone::Ok,
            None,
        );
        Ok(SubmitOutcome::Accepted(start))
    }

    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        let outcome = self.completion.tick(generation);
        match &outcome {
            TickOutcome::Stale => {}
            TickOutcome::Continue { remaining, .. } => {
                let remaining = *remaining;
                self.post(StatusMessage::Accepted { remaining }, StatusTone::Ok, None);
            }
            TickOutcome::Navigate { .. } => {
                self.post(StatusMessage::Continuing, StatusTone::Ok, None);
            }
            TickOutcome::Done => {
                self.post(StatusMessage::Completed, StatusTone::Ok, None);
            }
        }
        outcome
    }

    pub fn clear_status(&mut self, id: u64) -> bool {
        if self.status.as_ref().is_some_and(|status| status.id == id) {
            self.status = None;
            return true;
        }
        false
    }

    pub fn page_show(&mut self, signal: PageShowSignal) -> ResumeDecision {
        // Setup never sets the solved marker, so it never resumes from one.
        let decision = if self.setup {
            ResumeDecision::Fresh
        } else {
            self.resume.decide(signal, self.stores.session.as_mut())
        };
        self.completion.cancel();
        match decision {
            ResumeDecision::Fresh => {
                self.reseed();
                if self.phase == SessionPhase::Ready {
                    self.post_intro();
                }
            }
            ResumeDecision::RestoreSolved => {
                self.state.show_solved_snapshot();
                self.answers.fill_expected();
                self.state.unlock();
                self.post(StatusMessage::Resumed, StatusTone::Ok, None);
            }
        }
        decision
    }

    pub fn teardown(&mut self) {
        self.completion.cancel();
    }

    pub fn save_setup(&mut self) -> Result<(), ActionError> {
        if !self.setup {
            return self.refuse(ActionError::SetupOnly);
        }
        self.ensure_ready()?;
        self.state.adopt_current_as_seed();
        self.seed_origin = SeedOrigin::Saved;
        let raw = encode_saved_seed(self.state.seed());
        self.stores
            .local
            .set(self.chapter.seed_storage_key, &raw);
        self.post(StatusMessage::SetupSaved, StatusTone::Ok, None);
        Ok(())
    }

    pub fn clear_setup(&mut self) -> Result<(), ActionError> {
        if !self.setup {
            return self.refuse(ActionError::SetupOnly);
        }
        self.stores.local.remove(self.chapter.seed_storage_key);
        self.post(StatusMessage::SetupCleared, StatusTone::Neutral, None);
        Ok(())
    }

    fn reseed(&mut self) {
        let saved = self.stores.local.get(self.chapter.seed_storage_key);
        let request = SeedRequest {
            chapter_key: self.chapter.key,
            token: &self.token,
            grid: self.rules.grid,
            token_mixing: self.rules.token_mixing,
            setup: self.setup,
            saved: saved.as_deref(),
        };
        let (seed, origin) = resolve_seed(&request);
        self.state.initialize(seed);
        self.state.unlock();
        self.seed_origin = origin;
        self.budget.reset();
        self.answers.clear();
    }

    fn ensure_ready(&mut self) -> Result<(), ActionError> {
        if self.phase == SessionPhase::Ready {
            return Ok(());
        }
        self.refuse(ActionError::NotReady)
    }

    fn refuse<T>(&mut self, err: ActionError) -> Result<T, ActionError> {
        if self.phase != SessionPhase::AssetFailed {
            self.post(
                StatusMessage::Refused(err.clone()),
                StatusTone::Bad,
                Some(REFUSAL_CLEAR_MS),
            );
        }
        Err(err)
    }

    fn post_intro(&mut self) {
        let message = if self.setup {
            StatusMessage::SetupHint
        } else {
            StatusMessage::PlayHint {
                limit: self.budget.limit(),
            }
        };
        self.post(message, StatusTone::Neutral, None);
    }

    fn post(&mut self, message: StatusMessage, tone: StatusTone, clear_after_ms: Option<u32>) {
        self.next_status_id = self.next_status_id.wrapping_add(1);
        self.status = Some(Status {
            id: self.next_status_id,
            message,
            tone,
            clear_after_ms,
        });
    }
}
