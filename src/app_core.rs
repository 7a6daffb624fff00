use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use kaiten_core::{
    ActionError, LaunchParams, PageShowSignal, PuzzleSession, ResumeDecision, SessionPhase,
    StatusTone, SubmitOutcome, TickOutcome,
};

use crate::app_router;
use crate::persisted_store;

pub(crate) type AppSubscriber = Rc<dyn Fn()>;

pub(crate) struct AppCore {
    session: RefCell<PuzzleSession>,
    tile_srcs: RefCell<Vec<String>>,
    countdown_timer: RefCell<Option<Timeout>>,
    status_timer: RefCell<Option<(u64, Timeout)>>,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TileView {
    pub(crate) index: usize,
    pub(crate) src: Option<String>,
    pub(crate) degrees: u32,
    pub(crate) last_col: bool,
    pub(crate) last_row: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AnswerView {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AppSnapshot {
    pub(crate) chapter_label: String,
    pub(crate) cols: u32,
    pub(crate) phase: SessionPhase,
    pub(crate) setup: bool,
    pub(crate) locked: bool,
    pub(crate) moves: u32,
    pub(crate) limit: Option<u32>,
    pub(crate) tiles: Vec<TileView>,
    pub(crate) answers: Vec<AnswerView>,
    pub(crate) status: Option<(String, StatusTone)>,
}

impl AppCore {
    pub(crate) fn boot() -> Self {
        let params = app_router::launch_params();
        Self::new(&params)
    }

    pub(crate) fn new(params: &LaunchParams) -> Self {
        let chapter = params.chapter();
        let session = PuzzleSession::new(chapter, params, persisted_store::browser_stores());
        gloo::console::log!(format!(
            "boot: chapter {} grid {} setup {} seed {:?}",
            chapter.key,
            chapter.rules.grid,
            params.setup,
            session.seed_origin()
        ));
        Self {
            session: RefCell::new(session),
            tile_srcs: RefCell::new(Vec::new()),
            countdown_timer: RefCell::new(None),
            status_timer: RefCell::new(None),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub(crate) fn subscribe(&self, subscriber: AppSubscriber) -> AppSubscription {
        self.subscribers.borrow_mut().push(subscriber.clone());
        AppSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    pub(crate) fn snapshot(&self) -> AppSnapshot {
        let session = self.session.borrow();
        let tile_srcs = self.tile_srcs.borrow();
        let grid = session.rules().grid;
        let tiles = session
            .current()
            .iter()
            .enumerate()
            .map(|(index, turn)| TileView {
                index,
                src: tile_srcs.get(index).cloned(),
                degrees: turn.degrees(),
                last_col: grid.is_last_col(index),
                last_row: grid.is_last_row(index),
            })
            .collect();
        let answers = session
            .answers()
            .fields()
            .iter()
            .map(|field| AnswerView {
                id: field.id.clone(),
                label: field.label.clone(),
                value: field.value.clone(),
            })
            .collect();
        AppSnapshot {
            chapter_label: session.chapter().label.to_string(),
            cols: grid.cols,
            phase: session.phase(),
            setup: session.is_setup(),
            locked: session.is_locked(),
            moves: session.moves(),
            limit: session.budget().limit(),
            tiles,
            answers,
            status: session.status().map(|status| (status.text(), status.tone)),
        }
    }

    pub(crate) fn image_request(&self) -> (String, kaiten_core::GridSpec) {
        let session = self.session.borrow();
        (session.image_src().to_string(), session.rules().grid)
    }

    pub(crate) fn tiles_loaded(self: &Rc<Self>, srcs: Vec<String>) {
        gloo::console::log!(format!("tiles: sliced {} tiles", srcs.len()));
        *self.tile_srcs.borrow_mut() = srcs;
        self.session.borrow_mut().mark_ready();
        self.after_change();
    }

    pub(crate) fn tiles_failed(self: &Rc<Self>, err: &str) {
        gloo::console::warn!(format!("tiles: load failed: {err}"));
        self.session.borrow_mut().mark_asset_failed();
        self.after_change();
    }

    pub(crate) fn rotate(self: &Rc<Self>, index: usize) {
        let result = self.session.borrow_mut().rotate(index).map(|_| ());
        self.finish_action("rotate", result);
    }

    pub(crate) fn undo(self: &Rc<Self>) {
        let result = self.session.borrow_mut().undo();
        self.finish_action("undo", result);
    }

    pub(crate) fn set_answer(self: &Rc<Self>, field_id: &str, text: &str) {
        let result = self.session.borrow_mut().set_answer(field_id, text);
        self.finish_action("answer", result);
    }

    pub(crate) fn submit(self: &Rc<Self>) {
        let result = self.session.borrow_mut().submit();
        match result {
            Ok(SubmitOutcome::Accepted(start)) => {
                gloo::console::log!(format!(
                    "countdown: start gen {} from {}",
                    start.generation, start.remaining
                ));
                self.schedule_tick(start.generation, start.delay_ms);
                self.after_change();
            }
            Ok(_) => self.after_change(),
            Err(err) => self.finish_action("submit", Err(err)),
        }
    }

    pub(crate) fn save_setup(self: &Rc<Self>) {
        let result = self.session.borrow_mut().save_setup();
        self.finish_action("setup save", result);
    }

    pub(crate) fn clear_setup(self: &Rc<Self>) {
        let result = self.session.borrow_mut().clear_setup();
        self.finish_action("setup clear", result);
    }

    pub(crate) fn page_show(self: &Rc<Self>, signal: PageShowSignal) {
        self.countdown_timer.borrow_mut().take();
        let decision = self.session.borrow_mut().page_show(signal);
        gloo::console::log!(format!(
            "resume: {:?} nav {:?} persisted {} -> {}",
            signal.binding,
            signal.navigation,
            signal.persisted,
            match decision {
                ResumeDecision::Fresh => "fresh",
                ResumeDecision::RestoreSolved => "restore solved",
            }
        ));
        self.after_change();
    }

    pub(crate) fn teardown(&self) {
        self.countdown_timer.borrow_mut().take();
        self.status_timer.borrow_mut().take();
        self.session.borrow_mut().teardown();
    }

    fn finish_action(self: &Rc<Self>, action: &str, result: Result<(), ActionError>) {
        if let Err(err) = result {
            gloo::console::log!(format!("{action}: refused: {err}"));
        }
        self.after_change();
    }

    fn schedule_tick(self: &Rc<Self>, generation: u64, delay_ms: u32) {
        let core = Rc::clone(self);
        *self.countdown_timer.borrow_mut() = Some(Timeout::new(delay_ms, move || {
            core.countdown_timer.borrow_mut().take();
            core.on_tick(generation);
        }));
    }

    fn on_tick(self: &Rc<Self>, generation: u64) {
        let outcome = self.session.borrow_mut().tick(generation);
        match outcome {
            TickOutcome::Stale => {
                gloo::console::log!(format!("countdown: stale tick gen {generation}"));
                return;
            }
            TickOutcome::Continue {
                generation,
                delay_ms,
                ..
            } => self.schedule_tick(generation, delay_ms),
            TickOutcome::Navigate { target } => {
                gloo::console::log!(format!("countdown: navigate to {target}"));
                app_router::navigate_to(&target);
            }
            TickOutcome::Done => {
                gloo::console::log!("countdown: done");
            }
        }
        self.after_change();
    }

    fn after_change(self: &Rc<Self>) {
        self.schedule_status_clear();
        self.notify();
    }

    fn schedule_status_clear(self: &Rc<Self>) {
        let pending = {
            let session = self.session.borrow();
            session
                .status()
                .and_then(|status| status.clear_after_ms.map(|delay| (status.id, delay)))
        };
        let Some((id, delay)) = pending else {
            return;
        };
        let already_scheduled = self
            .status_timer
            .borrow()
            .as_ref()
            .is_some_and(|(scheduled, _)| *scheduled == id);
        if already_scheduled {
            return;
        }
        let core = Rc::clone(self);
        let timer = Timeout::new(delay, move || {
            core.status_timer.borrow_mut().take();
            if core.session.borrow_mut().clear_status(id) {
                core.notify();
            }
        });
        *self.status_timer.borrow_mut() = Some((id, timer));
    }

    fn notify(&self) {
        let subscribers = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            (subscriber)();
        }
    }
}

pub(crate) struct AppSubscription {
    subscriber: AppSubscriber,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

impl Drop for AppSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}
