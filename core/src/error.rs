#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("puzzle is not ready")]
    NotReady,
    #[error("puzzle is locked")]
    Locked,
    #[error("move limit of {limit} reached")]
    MoveLimitReached { limit: u32 },
    #[error("tile {index} is out of range for {count} tiles")]
    TileOutOfRange { index: usize, count: usize },
    #[error("unknown answer field: {0}")]
    UnknownField(String),
    #[error("only available in setup mode")]
    SetupOnly,
}
