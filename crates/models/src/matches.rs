use serde::{Deserialize, Serialize};
use std::fmt;

use crate::innings::Overs;
use crate::predictions::WinProbability;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamScore {
    pub name: String,
    pub short_name: String,
    pub score: u32,
    pub wickets: u8,
    pub overs: Overs,
}

impl TeamScore {
    pub fn new(name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            score: 0,
            wickets: 0,
            overs: Overs::default(),
        }
    }

    pub fn with_score(mut self, score: u32, wickets: u8, overs: Overs) -> Self {
        self.score = score;
        self.wickets = wickets.min(10);
        self.overs = overs;
        self
    }

    pub fn is_all_out(&self) -> bool {
        self.wickets >= 10
    }

    pub fn has_batted(&self) -> bool {
        self.overs.balls() > 0
    }
}

impl fmt::Display for TeamScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_batted() {
            return write!(f, "{} yet to bat", self.short_name);
        }
        write!(f, "{} {}/{} ({})", self.short_name, self.score, self.wickets, self.overs)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchFormat {
    T20,
    Odi,
    Test,
}

impl MatchFormat {
    /// Overs per innings for limited-overs formats.
    pub fn innings_overs(&self) -> Option<Overs> {
        match self {
            MatchFormat::T20 => Some(Overs::new(20, 0)),
            MatchFormat::Odi => Some(Overs::new(50, 0)),
            MatchFormat::Test => None,
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchFormat::T20 => write!(f, "T20"),
            MatchFormat::Odi => write!(f, "ODI"),
            MatchFormat::Test => write!(f, "Test"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchStatus {
    Upcoming,
    Live,
    InningsBreak,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveMatch {
    pub id: String,
    pub series: String,
    pub venue: String,
    pub format: MatchFormat,
    pub status: MatchStatus,
    pub team_a: TeamScore,
    pub team_b: TeamScore,
    pub status_text: String,
    pub win_probability: Option<WinProbability>,
}

impl LiveMatch {
    pub fn is_live(&self) -> bool {
        matches!(self.status, MatchStatus::Live | MatchStatus::InningsBreak)
    }

    pub fn title(&self) -> String {
        format!("{} vs {}", self.team_a.short_name, self.team_b.short_name)
    }
}
