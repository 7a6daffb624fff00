use std::fmt;

use crate::error::ActionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Ok,
    Bad,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusMessage {
    Loading,
    PlayHint { limit: Option<u32> },
    SetupHint,
    LimitReached { limit: u32 },
    Refused(ActionError),
    UndoDone,
    RejectedUnsolved,
    RejectedAnswer,
    Accepted { remaining: u32 },
    Continuing,
    Completed,
    Resumed,
    SetupSaved,
    SetupCleared,
    SetupCheck { solved: bool },
    AssetFailed { src: String },
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Loading => write!(f, "Loading image..."),
            StatusMessage::PlayHint { limit: Some(limit) } => write!(
                f,
                "Click a tile to turn it 90° clockwise. At most {limit} clicks. Undo returns to the start."
            ),
            StatusMessage::PlayHint { limit: None } => write!(
                f,
                "Click a tile to turn it 90° clockwise. Undo returns to the start."
            ),
            StatusMessage::SetupHint => write!(
                f,
                "Setup: click tiles to set their starting angle, then save."
            ),
            StatusMessage::LimitReached { limit } => write!(
                f,
                "Reached the limit of {limit} clicks. Submit, or use Undo to try again."
            ),
            StatusMessage::Refused(ActionError::MoveLimitReached { limit }) => write!(
                f,
                "No clicks left (limit {limit}). Use Undo to return to the start."
            ),
            StatusMessage::Refused(ActionError::Locked) => {
                write!(f, "The puzzle is finished and locked.")
            }
            StatusMessage::Refused(ActionError::NotReady) => {
                write!(f, "Still loading, please wait.")
            }
            StatusMessage::Refused(err) => write!(f, "Not allowed: {err}."),
            StatusMessage::UndoDone => write!(f, "Back to the starting position."),
            StatusMessage::RejectedUnsolved => write!(f, "Try again"),
            StatusMessage::RejectedAnswer => write!(f, "The answer is not right yet"),
            StatusMessage::Accepted { remaining } => {
                write!(f, "Success! Continuing in {remaining}...")
            }
            StatusMessage::Continuing => write!(f, "Success! Continuing..."),
            StatusMessage::Completed => write!(f, "Success"),
            StatusMessage::Resumed => write!(f, "Already solved. Press submit to continue."),
            StatusMessage::SetupSaved => write!(
                f,
                "Setup saved in this browser. Open the page without ?setup=1 to play it."
            ),
            StatusMessage::SetupCleared => write!(f, "Saved setup cleared."),
            StatusMessage::SetupCheck { solved: true } => write!(f, "Success"),
            StatusMessage::SetupCheck { solved: false } => write!(f, "Try again"),
            StatusMessage::AssetFailed { src } => write!(
                f,
                "Could not load {src}. Check that the image sits next to the page, then reload."
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub id: u64,
    pub message: StatusMessage,
    pub tone: StatusTone,
    pub clear_after_ms: Option<u32>,
}

impl Status {
    pub fn text(&self) -> String {
        self.message.to_string()
    }
}
