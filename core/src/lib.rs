pub mod answer;
pub mod budget;
pub mod catalog;
pub mod completion;
pub mod error;
pub mod grid;
pub mod launch;
pub mod resume;
pub mod rules;
pub mod seed;
pub mod session;
pub mod state;
pub mod status;
pub mod storage;

pub use answer::{AnswerField, AnswerGate};
pub use budget::{MoveBudget, UndoBudgetPolicy};
pub use catalog::{
    chapter_by_key, chapter_or_default, default_chapter, AnswerSpec, ChapterConfig,
    CHAPTER_CATALOG, DEFAULT_CHAPTER_KEY,
};
pub use completion::{CompletionSequencer, CountdownPhase, CountdownStart, TickOutcome};
pub use error::ActionError;
pub use grid::{min_moves_to_solve, GridError, GridSpec, QuarterTurns, TileRect, DEFAULT_GRID};
pub use launch::LaunchParams;
pub use resume::{
    classify, NavigationClass, NavigationKind, PageShowSignal, ResumeBinding, ResumeDecision,
    SessionResumeController,
};
pub use rules::PuzzleRules;
pub use seed::{derive_seed, encode_saved_seed, parse_saved_seed, resolve_seed, SeedOrigin, SeedRequest};
pub use session::{PuzzleSession, SessionPhase, SubmitOutcome};
pub use state::PuzzleState;
pub use status::{Status, StatusMessage, StatusTone};
pub use storage::{KeyValueStore, MemoryStore, Stores};
