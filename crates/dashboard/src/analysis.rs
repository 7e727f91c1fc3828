use cricket_models::{stats, LiveScoreData};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InningsAnalysis {
    pub current_run_rate: f64,
    pub required_run_rate: Option<f64>,
    pub runs_needed: Option<u32>,
    pub balls_remaining: u32,
    pub projected_total: u32,
    pub partnership_runs: u32,
    pub partnership_run_rate: f64,
    pub recent_runs: u32,
    pub recent_boundaries: usize,
    /// Share of the batters' runs that came in fours and sixes.
    pub boundary_percent: f64,
}

impl InningsAnalysis {
    pub fn from_score(score: &LiveScoreData) -> Self {
        let batter_runs: u32 = score.batsmen.iter().map(|b| b.runs).sum();
        let boundary_runs: u32 = score.batsmen.iter().map(|b| b.boundary_runs()).sum();
        let boundary_percent = if batter_runs == 0 {
            0.0
        } else {
            stats::round_to(f64::from(boundary_runs) / f64::from(batter_runs) * 100.0, 1)
        };

        Self {
            current_run_rate: score.current_run_rate,
            required_run_rate: score.required_run_rate,
            runs_needed: score.runs_needed(),
            balls_remaining: score.balls_remaining(),
            projected_total: score.projected_total(),
            partnership_runs: score.partnership.runs,
            partnership_run_rate: score.partnership.run_rate(),
            recent_runs: score.recent_runs(),
            recent_boundaries: score
                .recent_balls
                .iter()
                .filter(|ball| ball.outcome.is_boundary())
                .count(),
            boundary_percent,
        }
    }

    /// Whether the chase is ahead of the rate it needs.
    pub fn is_ahead_of_rate(&self) -> Option<bool> {
        self.required_run_rate
            .map(|required| self.current_run_rate >= required)
    }

    pub fn render(&self) -> String {
        let mut lines = vec![format!(
            "Run rate: {:.2} current | {}",
            self.current_run_rate,
            self.required_run_rate
                .map_or_else(|| "no target".to_string(), |rrr| format!("{rrr:.2} required")),
        )];
        if let Some(needed) = self.runs_needed {
            lines.push(format!("Need {needed} from {} balls", self.balls_remaining));
        }
        match self.is_ahead_of_rate() {
            Some(true) => lines.push("Scoring at or above the required rate".to_string()),
            Some(false) => lines.push("Falling behind the required rate".to_string()),
            None => {}
        }
        lines.push(format!("Projected at current rate: {}", self.projected_total));
        lines.push(format!(
            "Partnership: {} runs at {:.2}",
            self.partnership_runs, self.partnership_run_rate
        ));
        lines.push(format!(
            "Last six balls: {} runs, {} boundaries",
            self.recent_runs, self.recent_boundaries
        ));
        lines.push(format!("Boundary share: {:.1}%", self.boundary_percent));
        lines.join("\n")
    }
}
