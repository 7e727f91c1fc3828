//! Stateless text widgets. Each takes data and returns rendered lines.

use cricket_models::{
    stats, BallEvent, BatsmanStats, BowlerStats, LiveMatch, LiveScoreData, MatchPrediction,
    MatchStatus, Overs, PlayerSummary, TeamScore, WinProbability,
};

pub const BAR_WIDTH: usize = 30;

pub fn loading(title: &str) -> String {
    format!("{title}\n  Loading live data...")
}

pub fn win_probability_bar(team_a: &str, team_b: &str, probability: &WinProbability, width: usize) -> String {
    let filled = (usize::from(probability.team_a()) * width + 50) / 100;
    format!(
        "{team_a} {:>3}% [{}{}] {:>3}% {team_b}",
        probability.team_a(),
        "#".repeat(filled),
        "-".repeat(width - filled),
        probability.team_b(),
    )
}

pub fn match_card(live: &LiveMatch) -> String {
    let badge = match live.status {
        MatchStatus::Live => "LIVE",
        MatchStatus::InningsBreak => "BREAK",
        MatchStatus::Completed => "RESULT",
        MatchStatus::Upcoming => "UPCOMING",
    };

    let mut lines = vec![
        format!("[{badge}] {} ({}) - {}", live.title(), live.format, live.series),
        format!("  {}", live.venue),
        format!("  {}", live.team_a),
        format!("  {}", live.team_b),
        format!("  {}", live.status_text),
    ];
    if let Some(probability) = &live.win_probability {
        lines.push(format!(
            "  {}",
            win_probability_bar(&live.team_a.short_name, &live.team_b.short_name, probability, BAR_WIDTH)
        ));
    }
    lines.join("\n")
}

pub fn score_header(score: &LiveScoreData) -> String {
    let mut header = format!(
        "{} v {}  |  CRR {:.2}",
        score.batting_team, score.bowling_team.short_name, score.current_run_rate
    );
    if let (Some(target), Some(rrr)) = (score.target, score.required_run_rate) {
        header.push_str(&format!("  |  Target {target}  RRR {rrr:.2}"));
    }
    header
}

pub fn batting_table(batsmen: &[BatsmanStats]) -> String {
    let mut lines = vec![format!("{:<18}{:>5}{:>5}{:>5}{:>5}{:>8}", "Batter", "R", "B", "4s", "6s", "SR")];
    for batsman in batsmen {
        let name = if batsman.on_strike {
            format!("{}*", batsman.name)
        } else {
            batsman.name.clone()
        };
        lines.push(format!(
            "{:<18}{:>5}{:>5}{:>5}{:>5}{:>8.1}",
            name, batsman.runs, batsman.balls, batsman.fours, batsman.sixes, batsman.strike_rate
        ));
    }
    lines.join("\n")
}

pub fn bowling_table(bowlers: &[BowlerStats]) -> String {
    let mut lines = vec![format!("{:<18}{:>6}{:>5}{:>5}{:>5}{:>8}", "Bowler", "O", "M", "R", "W", "Econ")];
    for bowler in bowlers {
        lines.push(format!(
            "{:<18}{:>6}{:>5}{:>5}{:>5}{:>8.2}",
            bowler.name,
            bowler.overs.to_string(),
            bowler.maidens,
            bowler.runs,
            bowler.wickets,
            bowler.economy
        ));
    }
    lines.join("\n")
}

pub fn recent_balls(balls: &[BallEvent]) -> String {
    let tokens: Vec<String> = balls.iter().map(|ball| ball.outcome.to_string()).collect();
    format!("Recent: {}", tokens.join(" "))
}

pub fn prediction_card(prediction: &MatchPrediction) -> String {
    let range = prediction.projected_score;
    let mut lines = vec![
        format!("{} vs {}", prediction.team_a, prediction.team_b),
        format!(
            "  {}",
            win_probability_bar(&prediction.team_a, &prediction.team_b, &prediction.win_probability, BAR_WIDTH)
        ),
        format!("  Projected score: {}-{}", range.min(), range.max()),
        format!("  Confidence: {:.0}%", prediction.confidence * 100.0),
    ];
    for factor in &prediction.key_factors {
        lines.push(format!("  - {factor}"));
    }
    lines.join("\n")
}

/// Confidence at or above this reads as a firm call.
pub const CONFIDENT_THRESHOLD: f64 = 0.75;

pub fn prediction_insights(prediction: &MatchPrediction) -> String {
    let verdict = if prediction.is_confident(CONFIDENT_THRESHOLD) {
        "High confidence"
    } else {
        "Moderate confidence"
    };
    let favourite = prediction.favourite().unwrap_or("Neither side");

    let mut lines = vec![
        format!("{verdict} ({:.0}%)", prediction.confidence * 100.0),
        format!("Favourite: {favourite}"),
        format!("Projected midpoint: {}", prediction.projected_score.midpoint()),
        "Key factors:".to_string(),
    ];
    lines.extend(prediction.key_factors.iter().map(|factor| format!("  - {factor}")));
    lines.join("\n")
}

/// Side-by-side innings figures, with how much of each innings is used up.
pub fn team_comparison(batting: &TeamScore, bowling: &TeamScore, innings: Overs) -> String {
    let row = |team: &TeamScore| {
        let used = if innings.balls() == 0 {
            0.0
        } else {
            team.overs.as_decimal() / innings.as_decimal() * 100.0
        };
        format!(
            "{:<14}{:>8}{:>7}{:>7.2}{:>9.1}%",
            team.name,
            format!("{}/{}", team.score, team.wickets),
            team.overs.to_string(),
            stats::run_rate(team.score, team.overs.balls()),
            used
        )
    };

    [
        format!("{:<14}{:>8}{:>7}{:>7}{:>10}", "Team", "Score", "Overs", "RR", "Innings"),
        row(batting),
        row(bowling),
    ]
    .join("\n")
}

pub fn leaderboard_table(players: &[PlayerSummary]) -> String {
    let mut lines = vec![format!(
        "{:<18}{:<14}{:>5}{:>7}{:>8}{:>8}{:>5}",
        "Player", "Team", "M", "Runs", "Avg", "SR", "W"
    )];
    for player in players {
        let average = player
            .batting_average()
            .map_or_else(|| "-".to_string(), |avg| format!("{avg:.2}"));
        lines.push(format!(
            "{:<18}{:<14}{:>5}{:>7}{:>8}{:>8.1}{:>5}",
            player.name,
            player.team,
            player.matches,
            player.runs,
            average,
            player.strike_rate(),
            player.wickets
        ));
    }
    lines.join("\n")
}
