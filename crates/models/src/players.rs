use serde::{Deserialize, Serialize};

use crate::stats;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlayerRole {
    Batter,
    Bowler,
    AllRounder,
    WicketKeeper,
}

/// Career row on the stats leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSummary {
    pub name: String,
    pub team: String,
    pub role: PlayerRole,
    pub matches: u32,
    pub innings: u32,
    pub not_outs: u32,
    pub runs: u32,
    pub balls_faced: u32,
    pub wickets: u32,
}

impl PlayerSummary {
    pub fn batting_average(&self) -> Option<f64> {
        let dismissals = self.innings.saturating_sub(self.not_outs);
        if dismissals == 0 {
            return None;
        }
        Some(stats::round_to(f64::from(self.runs) / f64::from(dismissals), 2))
    }

    pub fn strike_rate(&self) -> f64 {
        stats::strike_rate(self.runs, self.balls_faced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batting_average_excludes_not_outs() {
        let player = PlayerSummary {
            name: "J Root".to_string(),
            team: "England".to_string(),
            role: PlayerRole::Batter,
            matches: 10,
            innings: 10,
            not_outs: 2,
            runs: 412,
            balls_faced: 500,
            wickets: 0,
        };
        assert_eq!(player.batting_average(), Some(51.5));
        assert_eq!(player.strike_rate(), 82.4);
    }

    #[test]
    fn test_batting_average_undefined_without_dismissal() {
        let player = PlayerSummary {
            name: "Tail Ender".to_string(),
            team: "Test XI".to_string(),
            role: PlayerRole::Bowler,
            matches: 3,
            innings: 2,
            not_outs: 2,
            runs: 9,
            balls_faced: 14,
            wickets: 7,
        };
        assert_eq!(player.batting_average(), None);
    }
}
