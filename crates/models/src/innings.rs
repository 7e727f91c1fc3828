use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::matches::TeamScore;
use crate::stats::{self, BALLS_PER_OVER};

/// Legal deliveries bowled, shown as `overs.balls`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Overs {
    balls: u32,
}

impl Overs {
    pub fn from_balls(balls: u32) -> Self {
        Self { balls }
    }

    /// Build from the scorecard notation, e.g. `(18, 4)` for 18.4 overs.
    /// A ball count of six or more carries into the completed overs.
    pub fn new(completed: u32, balls: u32) -> Self {
        Self::from_balls(completed * BALLS_PER_OVER + balls)
    }

    pub fn balls(&self) -> u32 {
        self.balls
    }

    pub fn completed(&self) -> u32 {
        self.balls / BALLS_PER_OVER
    }

    pub fn balls_in_over(&self) -> u32 {
        self.balls % BALLS_PER_OVER
    }

    /// Overs as a true fraction (18.4 overs is 18.667).
    pub fn as_decimal(&self) -> f64 {
        f64::from(self.balls) / f64::from(BALLS_PER_OVER)
    }

    pub fn remaining_in(&self, limit: Overs) -> Overs {
        Overs::from_balls(limit.balls.saturating_sub(self.balls))
    }
}

impl fmt::Display for Overs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.completed(), self.balls_in_over())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatsmanStats {
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub on_strike: bool,
    pub strike_rate: f64,
}

impl BatsmanStats {
    pub fn new(name: impl Into<String>, runs: u32, balls: u32) -> Self {
        Self {
            name: name.into(),
            runs,
            balls,
            fours: 0,
            sixes: 0,
            on_strike: false,
            strike_rate: stats::strike_rate(runs, balls),
        }
    }

    pub fn with_boundaries(mut self, fours: u32, sixes: u32) -> Self {
        self.fours = fours;
        self.sixes = sixes;
        self
    }

    pub fn on_strike(mut self) -> Self {
        self.on_strike = true;
        self
    }

    pub fn boundary_runs(&self) -> u32 {
        self.fours * 4 + self.sixes * 6
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BowlerStats {
    pub name: String,
    pub overs: Overs,
    pub maidens: u32,
    pub runs: u32,
    pub wickets: u32,
    pub economy: f64,
}

impl BowlerStats {
    pub fn new(name: impl Into<String>, overs: Overs, runs: u32, wickets: u32) -> Self {
        Self {
            name: name.into(),
            overs,
            maidens: 0,
            runs,
            wickets,
            economy: stats::economy(runs, overs.balls()),
        }
    }

    pub fn with_maidens(mut self, maidens: u32) -> Self {
        self.maidens = maidens;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BallOutcome {
    Dot,
    Runs(u8),
    Four,
    Six,
    Wicket,
    Wide,
    NoBall,
}

impl BallOutcome {
    /// Runs added to the batting side's total, extras included.
    pub fn runs(&self) -> u32 {
        match self {
            BallOutcome::Dot | BallOutcome::Wicket => 0,
            BallOutcome::Runs(runs) => u32::from(*runs),
            BallOutcome::Four => 4,
            BallOutcome::Six => 6,
            BallOutcome::Wide | BallOutcome::NoBall => 1,
        }
    }

    pub fn is_legal(&self) -> bool {
        !matches!(self, BallOutcome::Wide | BallOutcome::NoBall)
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, BallOutcome::Four | BallOutcome::Six)
    }
}

impl fmt::Display for BallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BallOutcome::Dot => write!(f, "."),
            BallOutcome::Runs(runs) => write!(f, "{runs}"),
            BallOutcome::Four => write!(f, "4"),
            BallOutcome::Six => write!(f, "6"),
            BallOutcome::Wicket => write!(f, "W"),
            BallOutcome::Wide => write!(f, "wd"),
            BallOutcome::NoBall => write!(f, "nb"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BallEvent {
    pub over: Overs,
    pub outcome: BallOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Partnership {
    pub runs: u32,
    pub balls: u32,
}

impl Partnership {
    pub fn run_rate(&self) -> f64 {
        stats::run_rate(self.runs, self.balls)
    }
}

/// One innings as seen on the live scorecard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveScoreData {
    pub match_id: String,
    pub batting_team: TeamScore,
    pub bowling_team: TeamScore,
    pub innings_overs: Overs,
    pub current_run_rate: f64,
    pub target: Option<u32>,
    pub required_run_rate: Option<f64>,
    pub batsmen: Vec<BatsmanStats>,
    pub bowlers: Vec<BowlerStats>,
    pub recent_balls: Vec<BallEvent>,
    pub partnership: Partnership,
    pub last_updated: DateTime<Utc>,
}

impl LiveScoreData {
    pub fn balls_remaining(&self) -> u32 {
        self.batting_team.overs.remaining_in(self.innings_overs).balls()
    }

    pub fn runs_needed(&self) -> Option<u32> {
        self.target
            .map(|target| target.saturating_sub(self.batting_team.score))
    }

    /// Total the batting side reaches if it keeps scoring at the current rate.
    pub fn projected_total(&self) -> u32 {
        let remaining_overs = f64::from(self.balls_remaining()) / f64::from(BALLS_PER_OVER);
        self.batting_team.score + (self.current_run_rate * remaining_overs).round() as u32
    }

    pub fn striker(&self) -> Option<&BatsmanStats> {
        self.batsmen.iter().find(|batsman| batsman.on_strike)
    }

    pub fn recent_runs(&self) -> u32 {
        self.recent_balls.iter().map(|ball| ball.outcome.runs()).sum()
    }
}
