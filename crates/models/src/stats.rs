//! Cricket arithmetic shared by the generators and the views.
//!
//! Every rate is rounded the way a scorecard shows it: strike rates to one
//! decimal place, economy and run rates to two.

pub const BALLS_PER_OVER: u32 = 6;

/// Round `value` to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Runs per 100 balls faced, one decimal place. Zero when no balls faced.
pub fn strike_rate(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round_to(f64::from(runs) / f64::from(balls) * 100.0, 1)
}

/// Runs conceded per six legal balls, two decimal places.
pub fn economy(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round_to(f64::from(runs) / (f64::from(balls) / f64::from(BALLS_PER_OVER)), 2)
}

/// Runs per over for an innings, two decimal places.
pub fn run_rate(runs: u32, balls: u32) -> f64 {
    economy(runs, balls)
}

/// Rate needed to reach `target` from `runs` in the balls that remain.
///
/// Returns `None` once the target is reached or the innings has no balls left.
pub fn required_run_rate(target: u32, runs: u32, balls_remaining: u32) -> Option<f64> {
    if runs >= target || balls_remaining == 0 {
        return None;
    }
    Some(run_rate(target - runs, balls_remaining))
}
