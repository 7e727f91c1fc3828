use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CricketError, Result};

/// Whole-number win percentages for both sides; always sums to exactly 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawWinProbability")]
pub struct WinProbability {
    team_a: u8,
    team_b: u8,
}

#[derive(Deserialize)]
struct RawWinProbability {
    team_a: u8,
    team_b: u8,
}

impl TryFrom<RawWinProbability> for WinProbability {
    type Error = CricketError;

    fn try_from(raw: RawWinProbability) -> Result<Self> {
        Self::new(raw.team_a, raw.team_b)
    }
}

impl WinProbability {
    pub fn new(team_a: u8, team_b: u8) -> Result<Self> {
        if u16::from(team_a) + u16::from(team_b) != 100 {
            return Err(CricketError::UnbalancedProbability { team_a, team_b });
        }
        Ok(Self { team_a, team_b })
    }

    pub fn even() -> Self {
        Self { team_a: 50, team_b: 50 }
    }

    /// Renormalize two raw weights into percentages.
    ///
    /// Weights are clamped to `[0, 100]` first, so jittered baselines that
    /// drift negative count as zero rather than flipping the other side past
    /// 100. Two zero weights give an even split.
    pub fn from_weights(team_a: f64, team_b: f64) -> Self {
        let a = if team_a.is_finite() { team_a.clamp(0.0, 100.0) } else { 0.0 };
        let b = if team_b.is_finite() { team_b.clamp(0.0, 100.0) } else { 0.0 };
        let total = a + b;
        if total <= 0.0 {
            return Self::even();
        }
        let team_a = (a / total * 100.0).round().clamp(0.0, 100.0) as u8;
        Self {
            team_a,
            team_b: 100 - team_a,
        }
    }

    pub fn team_a(&self) -> u8 {
        self.team_a
    }

    pub fn team_b(&self) -> u8 {
        self.team_b
    }

    pub fn favourite(&self) -> Option<Side> {
        match self.team_a.cmp(&self.team_b) {
            std::cmp::Ordering::Greater => Some(Side::TeamA),
            std::cmp::Ordering::Less => Some(Side::TeamB),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Side {
    TeamA,
    TeamB,
}

/// Projected innings total; `max` is always strictly greater than `min`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawScoreRange")]
pub struct ScoreRange {
    min: u32,
    max: u32,
}

#[derive(Deserialize)]
struct RawScoreRange {
    min: u32,
    max: u32,
}

impl TryFrom<RawScoreRange> for ScoreRange {
    type Error = CricketError;

    fn try_from(raw: RawScoreRange) -> Result<Self> {
        Self::new(raw.min, raw.max)
    }
}

impl ScoreRange {
    pub const MIN_SPREAD: u32 = 5;

    pub fn new(min: u32, max: u32) -> Result<Self> {
        if max <= min {
            return Err(CricketError::InvalidScoreRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Accept any pair, pushing `max` above `min` when they cross or touch.
    pub fn coerce(min: u32, max: u32) -> Self {
        let (min, max) = if max < min { (max, min) } else { (min, max) };
        if max > min {
            Self { min, max }
        } else {
            Self {
                min,
                max: min.saturating_add(Self::MIN_SPREAD),
            }
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn midpoint(&self) -> u32 {
        self.min + (self.max - self.min) / 2
    }

    pub fn contains(&self, score: u32) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchPrediction {
    pub id: Uuid,
    pub match_id: String,
    pub team_a: String,
    pub team_b: String,
    pub win_probability: WinProbability,
    pub projected_score: ScoreRange,
    pub confidence: f64,
    pub key_factors: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl MatchPrediction {
    pub fn new(
        match_id: String,
        team_a: String,
        team_b: String,
        win_probability: WinProbability,
        projected_score: ScoreRange,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id,
            team_a,
            team_b,
            win_probability,
            projected_score,
            confidence: 0.0,
            key_factors: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CricketError::InvalidProbability {
                value: confidence * 100.0,
            });
        }
        self.confidence = confidence;
        Ok(self)
    }

    pub fn with_factors(mut self, factors: Vec<String>) -> Self {
        self.key_factors = factors;
        self
    }

    pub fn favourite(&self) -> Option<&str> {
        match self.win_probability.favourite()? {
            Side::TeamA => Some(&self.team_a),
            Side::TeamB => Some(&self.team_b),
        }
    }

    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}
