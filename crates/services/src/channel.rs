use serde::{Deserialize, Serialize};
use std::fmt;

/// The independently timed broadcast categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    LiveMatches,
    LiveScore,
    Predictions,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::LiveMatches, Channel::LiveScore, Channel::Predictions];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::LiveMatches => "live_matches",
            Channel::LiveScore => "live_score",
            Channel::Predictions => "predictions",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
