use serde::{Deserialize, Serialize};

use super::{
    repo_types::{VoteDirection, VoteTally},
    vote::VoteState,
};

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteSummary {
    pub up: i64,
    pub down: i64,
    pub score: i64,
}

impl From<VoteTally> for VoteSummary {
    fn from(t: VoteTally) -> Self {
        Self {
            up: t.up,
            down: t.down,
            score: t.score(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub state: VoteState,
    pub votes: VoteSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_request_accepts_lowercase_directions() {
        let up: VoteRequest = serde_json::from_str(r#"{"direction":"up"}"#).unwrap();
        assert_eq!(up.direction, VoteDirection::Up);
        let down: VoteRequest = serde_json::from_str(r#"{"direction":"down"}"#).unwrap();
        assert_eq!(down.direction, VoteDirection::Down);
        assert!(serde_json::from_str::<VoteRequest>(r#"{"direction":"sideways"}"#).is_err());
    }

    #[test]
    fn summary_derives_score() {
        let s = VoteSummary::from(VoteTally { up: 3, down: 5 });
        assert_eq!(s, VoteSummary { up: 3, down: 5, score: -2 });
    }
}
