//! The one-vote-per-user toggle.
//!
//! | existing | requested | action          | result    |
//! |----------|-----------|-----------------|-----------|
//! | none     | d         | insert d        | d         |
//! | d        | d         | delete          | none      |
//! | d        | !d        | update to !d    | !d        |

use serde::Serialize;

use super::repo_types::VoteDirection;

/// What the caller's vote looks like after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    None,
    Up,
    Down,
}

impl From<VoteDirection> for VoteState {
    fn from(d: VoteDirection) -> Self {
        match d {
            VoteDirection::Up => Self::Up,
            VoteDirection::Down => Self::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Insert(VoteDirection),
    Delete,
    Flip(VoteDirection),
}

impl VoteAction {
    pub fn resulting_state(self) -> VoteState {
        match self {
            Self::Insert(d) | Self::Flip(d) => d.into(),
            Self::Delete => VoteState::None,
        }
    }
}

pub fn decide(existing: Option<VoteDirection>, requested: VoteDirection) -> VoteAction {
    match existing {
        None => VoteAction::Insert(requested),
        Some(current) if current == requested => VoteAction::Delete,
        Some(_) => VoteAction::Flip(requested),
    }
}
