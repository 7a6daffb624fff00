use kaiten_core::grid::turns_to_values;
use kaiten_core::{
    encode_saved_seed, ActionError, AnswerSpec, ChapterConfig, KeyValueStore, LaunchParams,
    MemoryStore, NavigationKind, PageShowSignal, PuzzleRules, PuzzleSession, QuarterTurns,
    ResumeDecision, SeedOrigin, SessionPhase, StatusMessage, Stores, SubmitOutcome, TickOutcome,
    UndoBudgetPolicy,
};

static PLAIN: ChapterConfig = ChapterConfig {
    key: "plain",
    label: "Plain",
    image_src: "image.png",
    default_token: "plain",
    seed_storage_key: "plain.seed",
    solved_marker_key: "plain.solved",
    answers: &[],
    next_stage: Some("../next/index.html"),
    rules: PuzzleRules::DEFAULT,
};

static GATED: ChapterConfig = ChapterConfig {
    key: "gated",
    label: "Gated",
    image_src: "image.png",
    default_token: "gated",
    seed_storage_key: "gated.seed",
    solved_marker_key: "gated.solved",
    answers: &[
        AnswerSpec {
            id: "item",
            label: "Item",
            expected: "天平",
        },
        AnswerSpec {
            id: "number",
            label: "Number",
            expected: "41",
        },
    ],
    next_stage: Some("../chapter-5/"),
    rules: PuzzleRules::DEFAULT,
};

static RESTORING: ChapterConfig = ChapterConfig {
    key: "restoring",
    label: "Restoring",
    image_src: "image.png",
    default_token: "restoring",
    seed_storage_key: "restoring.seed",
    solved_marker_key: "restoring.solved",
    answers: &[],
    next_stage: None,
    rules: PuzzleRules {
        undo_policy: UndoBudgetPolicy::RestoreCount,
        ..PuzzleRules::DEFAULT
    },
};

struct Harness {
    session: PuzzleSession,
    local: MemoryStore,
    tab: MemoryStore,
}

fn harness(chapter: &ChapterConfig, seed: Option<Vec<u8>>, query: &str) -> Harness {
    let mut local = MemoryStore::new();
    let tab = MemoryStore::new();
    if let Some(values) = seed {
        let turns: Vec<QuarterTurns> = values.iter().copied().map(QuarterTurns::new).collect();
        local.set(chapter.seed_storage_key, &encode_saved_seed(&turns));
    }
    let params = LaunchParams::from_query(query);
    let mut session = PuzzleSession::new(chapter, &params, Stores::new(local.clone(), tab.clone()));
    session.page_show(PageShowSignal::load(NavigationKind::Navigate));
    session.mark_ready();
    Harness {
        session,
        local,
        tab,
    }
}

fn seed_values(first: &[u8]) -> Vec<u8> {
    let mut values = vec![0u8; 28];
    values[..first.len()].copy_from_slice(first);
    values
}

fn current(session: &PuzzleSession) -> Vec<u8> {
    turns_to_values(session.current())
}

fn solve(session: &mut PuzzleSession) {
    let clicks: Vec<u32> = session
        .current()
        .iter()
        .map(|turn| turn.clicks_to_upright())
        .collect();
    for (index, clicks) in clicks.into_iter().enumerate() {
        for _ in 0..clicks {
            session.rotate(index).expect("rotate");
        }
    }
}

fn run_countdown(session: &mut PuzzleSession, start_generation: u64) -> Vec<TickOutcome> {
    let mut outcomes = Vec::new();
    let mut pending = Some(start_generation);
    while let Some(generation) = pending.take() {
        let outcome = session.tick(generation);
        if let TickOutcome::Continue { generation, .. } = outcome {
            pending = Some(generation);
        }
        outcomes.push(outcome);
    }
    outcomes
}

#[test]
fn actions_wait_for_ready() {
    let params = LaunchParams::default();
    let mut session = PuzzleSession::new(&PLAIN, &params, Stores::in_memory());
    assert_eq!(session.phase(), SessionPhase::Loading);
    let before = current(&session);
    assert_eq!(session.rotate(0), Err(ActionError::NotReady));
    assert_eq!(session.undo(), Err(ActionError::NotReady));
    assert_eq!(session.submit(), Err(ActionError::NotReady));
    assert_eq!(current(&session), before);
    session.mark_ready();
    assert!(session.rotate(0).is_ok());
}

#[test]
fn asset_failure_is_terminal() {
    let params = LaunchParams::default();
    let mut session = PuzzleSession::new(&PLAIN, &params, Stores::in_memory());
    session.mark_asset_failed();
    session.mark_ready();
    assert_eq!(session.phase(), SessionPhase::AssetFailed);
    assert_eq!(session.rotate(0), Err(ActionError::NotReady));
    let status = session.status().expect("status");
    assert!(matches!(status.message, StatusMessage::AssetFailed { .. }));
    assert_eq!(status.clear_after_ms, None);
}

#[test]
fn scenario_a_rotate_wraps_then_accepts() {
    let mut h = harness(&PLAIN, Some(seed_values(&[1, 0, 2])), "");
    assert_eq!(h.session.seed_origin(), SeedOrigin::Saved);
    for _ in 0..3 {
        h.session.rotate(1).expect("rotate");
    }
    assert_eq!(current(&h.session)[1], 3);
    h.session.rotate(1).expect("rotate");
    assert_eq!(current(&h.session)[1], 0);

    for _ in 0..3 {
        h.session.rotate(0).expect("rotate");
    }
    for _ in 0..2 {
        h.session.rotate(2).expect("rotate");
    }
    assert_eq!(h.session.moves(), 9);
    assert!(h.session.is_solved());

    let outcome = h.session.submit().expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Accepted(_)));
    assert!(h.session.is_locked());
    assert!(h.tab.get(PLAIN.solved_marker_key).is_some());
}

#[test]
fn scenario_b_limit_refuses_and_undo_keeps_count() {
    let mut h = harness(&PLAIN, Some(seed_values(&[2, 2, 2])), "");
    for step in 0..27usize {
        h.session.rotate(3 + step % 20).expect("rotate within limit");
    }
    assert!(matches!(
        h.session.status().map(|status| &status.message),
        Some(StatusMessage::LimitReached { limit: 27 })
    ));
    let before = current(&h.session);
    assert_eq!(
        h.session.rotate(0),
        Err(ActionError::MoveLimitReached { limit: 27 })
    );
    assert_eq!(current(&h.session), before);
    assert_eq!(h.session.moves(), 27);

    // Undo and submit stay reachable with no moves left.
    h.session.undo().expect("undo");
    assert_eq!(current(&h.session), seed_values(&[2, 2, 2]));
    assert_eq!(h.session.moves(), 27);
    assert!(!h.session.budget().can_act());
    assert_eq!(
        h.session.rotate(0),
        Err(ActionError::MoveLimitReached { limit: 27 })
    );
    let outcome = h.session.submit().expect("submit");
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected {
            solved: false,
            answers_ok: true
        }
    );
}

#[test]
fn scenario_b_restoring_policy_gives_moves_back() {
    let mut h = harness(&RESTORING, Some(seed_values(&[2, 2, 2])), "");
    for step in 0..27usize {
        h.session.rotate(step % 28).expect("rotate within limit");
    }
    assert!(h.session.rotate(0).is_err());
    h.session.undo().expect("undo");
    assert_eq!(h.session.moves(), 0);
    assert!(h.session.budget().can_act());
    assert!(h.session.rotate(0).is_ok());
}

#[test]
fn scenario_c_answer_gate_must_pass_with_board() {
    let mut h = harness(&GATED, Some(seed_values(&[1])), "");
    solve(&mut h.session);
    assert!(h.session.is_solved());

    let outcome = h.session.submit().expect("submit");
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected {
            solved: true,
            answers_ok: false
        }
    );
    let status = h.session.status().expect("status").clone();
    assert_eq!(status.message, StatusMessage::RejectedAnswer);
    assert_eq!(status.clear_after_ms, Some(PuzzleRules::DEFAULT.failure_clear_ms));
    assert!(h.tab.get(GATED.solved_marker_key).is_none());
    assert!(!h.session.is_locked());

    h.session.set_answer("item", "天平").expect("item");
    h.session.set_answer("number", " 41 ").expect("number");
    let outcome = h.session.submit().expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Accepted(_)));
}

#[test]
fn rejection_does_not_touch_budget_or_board() {
    let mut h = harness(&GATED, Some(seed_values(&[1, 3])), "");
    h.session.rotate(0).expect("rotate");
    let moves = h.session.moves();
    let board = current(&h.session);
    h.session.set_answer("item", "天平").expect("item");
    let outcome = h.session.submit().expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Rejected { solved: false, .. }));
    assert_eq!(h.session.moves(), moves);
    assert_eq!(current(&h.session), board);
    assert_eq!(h.session.answers().value("item"), Some("天平"));
}

#[test]
fn stale_status_clear_keeps_newer_message() {
    let mut h = harness(&PLAIN, Some(seed_values(&[1])), "");
    h.session.submit().expect("submit");
    let failure_id = h.session.status().expect("status").id;
    h.session.rotate(0).expect("rotate");
    h.session.undo().expect("undo");
    assert!(!h.session.clear_status(failure_id));
    assert_eq!(
        h.session.status().map(|status| &status.message),
        Some(&StatusMessage::UndoDone)
    );
}

#[test]
fn double_submit_runs_one_countdown_and_one_navigation() {
    let mut h = harness(&PLAIN, Some(seed_values(&[3])), "");
    h.session.rotate(0).expect("rotate");
    let first = h.session.submit().expect("submit");
    let second = h.session.submit();
    assert_eq!(second, Err(ActionError::Locked));
    let SubmitOutcome::Accepted(start) = first else {
        panic!("expected acceptance, got {first:?}");
    };
    assert_eq!(start.remaining, 3);
    assert_eq!(h.session.countdown_remaining(), Some(3));

    let outcomes = run_countdown(&mut h.session, start.generation);
    let navigations: Vec<_> = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, TickOutcome::Navigate { .. }))
        .collect();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(navigations.len(), 1);
    assert_eq!(
        outcomes.last(),
        Some(&TickOutcome::Navigate {
            target: "../next/index.html".to_string()
        })
    );
    // A duplicate timer left over from the start would now be stale.
    assert_eq!(h.session.tick(start.generation), TickOutcome::Stale);
}

#[test]
fn locked_session_refuses_every_mutation() {
    let mut h = harness(&GATED, Some(seed_values(&[])), "");
    h.session.set_answer("item", "天平").expect("item");
    h.session.set_answer("number", "41").expect("number");
    h.session.submit().expect("submit");
    assert_eq!(h.session.rotate(0), Err(ActionError::Locked));
    assert_eq!(h.session.undo(), Err(ActionError::Locked));
    assert_eq!(h.session.set_answer("item", "x"), Err(ActionError::Locked));
    assert_eq!(h.session.submit(), Err(ActionError::Locked));
    assert_eq!(h.session.answers().value("item"), Some("天平"));
}

#[test]
fn back_navigation_with_marker_restores_solved_board() {
    let mut h = harness(&GATED, Some(seed_values(&[2, 1])), "");
    solve(&mut h.session);
    h.session.set_answer("item", "天平").expect("item");
    h.session.set_answer("number", "41").expect("number");
    h.session.submit().expect("submit");
    assert!(h.tab.get(GATED.solved_marker_key).is_some());

    // Whatever the board showed before, resume shows it solved.
    let params = LaunchParams::default();
    let mut returning = PuzzleSession::new(
        &GATED,
        &params,
        Stores::new(h.local.clone(), h.tab.clone()),
    );
    returning.mark_ready();
    returning.rotate(4).expect("rotate");
    assert!(!returning.is_solved());

    let decision = returning.page_show(PageShowSignal::load(NavigationKind::BackForward));
    assert_eq!(decision, ResumeDecision::RestoreSolved);
    assert!(current(&returning).iter().all(|value| *value == 0));
    assert_eq!(returning.answers().value("item"), Some("天平"));
    assert_eq!(returning.answers().value("number"), Some("41"));
    assert!(!returning.is_locked());
    assert_eq!(
        returning.status().map(|status| &status.message),
        Some(&StatusMessage::Resumed)
    );
    // The seed is still the scrambled one.
    assert_eq!(turns_to_values(returning.seed()), seed_values(&[2, 1]));

    // Pressing submit again continues to the next stage.
    let outcome = returning.submit().expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Accepted(_)));
}

#[test]
fn back_navigation_without_marker_is_fresh() {
    let mut h = harness(&PLAIN, Some(seed_values(&[2, 1])), "");
    h.session.rotate(0).expect("rotate");
    let decision = h
        .session
        .page_show(PageShowSignal::page_show(NavigationKind::Navigate, true));
    assert_eq!(decision, ResumeDecision::Fresh);
    assert_eq!(current(&h.session), seed_values(&[2, 1]));
    assert_eq!(h.session.moves(), 0);
}

#[test]
fn reload_clears_marker_and_reseeds() {
    let mut h = harness(&PLAIN, Some(seed_values(&[1])), "");
    solve(&mut h.session);
    h.session.submit().expect("submit");
    assert!(h.session.is_locked());

    let decision = h.session.page_show(PageShowSignal::load(NavigationKind::Reload));
    assert_eq!(decision, ResumeDecision::Fresh);
    assert!(h.tab.get(PLAIN.solved_marker_key).is_none());
    assert!(!h.session.is_locked());
    assert_eq!(current(&h.session), seed_values(&[1]));
    assert_eq!(h.session.countdown_remaining(), None);
}

#[test]
fn both_bindings_converge_for_each_navigation_class() {
    let cases = [
        (NavigationKind::Navigate, false, false),
        (NavigationKind::Reload, false, false),
        (NavigationKind::BackForward, false, true),
        (NavigationKind::Other, false, false),
        (NavigationKind::Navigate, true, true),
    ];
    for (navigation, persisted, marked) in cases {
        let mut results = Vec::new();
        for order in 0..3 {
            let mut h = harness(&GATED, Some(seed_values(&[3, 2])), "");
            solve(&mut h.session);
            h.session.set_answer("item", "天平").expect("item");
            h.session.set_answer("number", "41").expect("number");
            h.session.submit().expect("submit");
            h.session.rotate(0).ok();

            let load = PageShowSignal {
                persisted,
                ..PageShowSignal::load(navigation)
            };
            let show = PageShowSignal::page_show(navigation, persisted);
            let decisions: Vec<ResumeDecision> = match order {
                0 => vec![h.session.page_show(load)],
                1 => vec![h.session.page_show(show)],
                _ => vec![h.session.page_show(load), h.session.page_show(show)],
            };
            let expected = if marked {
                ResumeDecision::RestoreSolved
            } else {
                ResumeDecision::Fresh
            };
            assert!(decisions.iter().all(|decision| *decision == expected));
            results.push((
                current(&h.session),
                h.session.answers().value("item").map(str::to_string),
                h.session.is_locked(),
                h.tab.get(GATED.solved_marker_key).is_some(),
            ));
        }
        assert!(
            results.windows(2).all(|pair| pair[0] == pair[1]),
            "bindings diverged for {navigation:?} persisted={persisted}"
        );
    }
}

#[test]
fn resume_mid_countdown_cancels_pending_ticks() {
    let mut h = harness(&PLAIN, Some(seed_values(&[3])), "");
    h.session.rotate(0).expect("rotate");
    let SubmitOutcome::Accepted(start) = h.session.submit().expect("submit") else {
        panic!("expected acceptance");
    };
    h.session.tick(start.generation);
    let decision = h
        .session
        .page_show(PageShowSignal::page_show(NavigationKind::Navigate, true));
    assert_eq!(decision, ResumeDecision::RestoreSolved);
    assert_eq!(h.session.tick(start.generation), TickOutcome::Stale);
    assert_eq!(h.session.countdown_remaining(), None);

    let SubmitOutcome::Accepted(restart) = h.session.submit().expect("submit") else {
        panic!("expected acceptance");
    };
    let outcomes = run_countdown(&mut h.session, restart.generation);
    assert_eq!(
        outcomes
            .iter()
            .filter(|outcome| matches!(outcome, TickOutcome::Navigate { .. }))
            .count(),
        1
    );
}

#[test]
fn teardown_drops_pending_countdown() {
    let mut h = harness(&PLAIN, Some(seed_values(&[3])), "");
    h.session.rotate(0).expect("rotate");
    let SubmitOutcome::Accepted(start) = h.session.submit().expect("submit") else {
        panic!("expected acceptance");
    };
    h.session.teardown();
    assert_eq!(h.session.tick(start.generation), TickOutcome::Stale);
}

#[test]
fn setup_mode_saves_and_clears_seed() {
    let mut h = harness(&PLAIN, None, "?setup=1");
    assert!(h.session.is_setup());
    assert_eq!(h.session.seed_origin(), SeedOrigin::Blank);
    assert!(h.session.is_solved());
    for _ in 0..40 {
        h.session.rotate(2).expect("setup rotations are unlimited");
    }
    assert_eq!(h.session.moves(), 0);
    h.session.rotate(5).expect("rotate");

    let outcome = h.session.submit().expect("submit");
    assert_eq!(outcome, SubmitOutcome::SetupChecked { solved: false });
    assert!(h.tab.get(PLAIN.solved_marker_key).is_none());
    assert!(!h.session.is_locked());

    h.session.save_setup().expect("save");
    let saved = h.local.get(PLAIN.seed_storage_key).expect("saved seed");
    let mut expected = vec![0u8; 28];
    expected[5] = 1;
    let expected_turns: Vec<QuarterTurns> = expected.iter().copied().map(QuarterTurns::new).collect();
    assert_eq!(saved, encode_saved_seed(&expected_turns));
    assert_eq!(turns_to_values(h.session.seed()), expected);

    // The player page now starts from the saved seed.
    let params = LaunchParams::default();
    let stores = Stores::new(h.local.clone(), MemoryStore::new());
    let player = PuzzleSession::new(&PLAIN, &params, stores);
    assert_eq!(player.seed_origin(), SeedOrigin::Saved);
    assert_eq!(turns_to_values(player.seed()), expected);

    h.session.clear_setup().expect("clear");
    assert!(h.local.get(PLAIN.seed_storage_key).is_none());
}

#[test]
fn setup_back_navigation_ignores_solved_marker() {
    let saved = seed_values(&[2, 0, 0, 0, 0, 1]);
    let mut h = harness(&PLAIN, Some(saved.clone()), "?setup=1");
    assert_eq!(h.session.seed_origin(), SeedOrigin::Saved);
    h.tab.set(PLAIN.solved_marker_key, "1");

    for signal in [
        PageShowSignal::load(NavigationKind::BackForward),
        PageShowSignal::page_show(NavigationKind::Navigate, true),
    ] {
        assert_eq!(h.session.page_show(signal), ResumeDecision::Fresh);
        assert_eq!(current(&h.session), saved);
        assert!(h.session.answers().fields().iter().all(|field| field.value.is_empty()));
    }
    assert_eq!(h.tab.get(PLAIN.solved_marker_key).as_deref(), Some("1"));

    h.session.save_setup().expect("save");
    let turns: Vec<QuarterTurns> = saved.iter().copied().map(QuarterTurns::new).collect();
    assert_eq!(
        h.local.get(PLAIN.seed_storage_key),
        Some(encode_saved_seed(&turns))
    );
}

#[test]
fn setup_actions_refused_in_play_mode() {
    let mut h = harness(&PLAIN, None, "");
    assert_eq!(h.session.save_setup(), Err(ActionError::SetupOnly));
    assert_eq!(h.session.clear_setup(), Err(ActionError::SetupOnly));
}

#[test]
fn malformed_saved_seed_falls_back_to_derived() {
    let mut local = MemoryStore::new();
    local.set(PLAIN.seed_storage_key, "[1, 2, 3]");
    let params = LaunchParams::from_query("?token=moon");
    let session = PuzzleSession::new(&PLAIN, &params, Stores::new(local, MemoryStore::new()));
    assert_eq!(session.seed_origin(), SeedOrigin::Derived);
    assert_eq!(
        session.seed(),
        kaiten_core::derive_seed("plain", "moon", PuzzleRules::DEFAULT.grid, true).as_slice()
    );
}

#[test]
fn token_param_drives_reproducible_seed() {
    let params = LaunchParams::from_query("?token=moon");
    let a = PuzzleSession::new(&PLAIN, &params, Stores::in_memory());
    let b = PuzzleSession::new(&PLAIN, &params, Stores::in_memory());
    assert_eq!(a.seed(), b.seed());
    assert_eq!(a.token(), "moon");
    let other = PuzzleSession::new(&PLAIN, &LaunchParams::default(), Stores::in_memory());
    assert_eq!(other.token(), "plain");
    assert_ne!(a.seed(), other.seed());
}
