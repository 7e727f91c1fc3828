use chrono::Utc;
use cricket_models::{
    stats, BallEvent, BallOutcome, BatsmanStats, BowlerStats, LiveMatch, LiveScoreData,
    MatchFormat, MatchPrediction, MatchStatus, Overs, Partnership, PlayerRole, PlayerSummary,
    Result, ScoreRange, TeamScore, WinProbability,
};
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Produces one fresh snapshot per call for each polling channel.
pub trait SnapshotSource: Send + Sync {
    fn live_matches(&self) -> Result<Vec<LiveMatch>>;
    fn live_score(&self) -> Result<LiveScoreData>;
    fn prediction(&self) -> Result<MatchPrediction>;
}

const FEATURED_MATCH_ID: &str = "t20wc-ind-aus";
const FEATURED_FORMAT: MatchFormat = MatchFormat::T20;
const CHASE_TARGET: u32 = 188;

const PREDICTION_FACTORS: &[&str] = &[
    "Dew expected in the second innings",
    "Chasing side has won 7 of the last 10 at this venue",
    "Spinners conceding under 7 an over",
    "Set batter still at the crease",
    "Short boundary on the leg side",
    "Death-over specialist has 2 overs left",
    "Required rate climbing above 10",
];

/// Randomized cricket data drifting around fixed baselines.
///
/// Nothing is carried between calls: every snapshot is sampled fresh, so
/// scores wobble rather than progress.
pub struct MockDataGenerator {
    rng: Mutex<SmallRng>,
}

impl MockDataGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    fn featured_innings() -> Overs {
        FEATURED_FORMAT.innings_overs().unwrap_or_default()
    }

    fn featured_chase(rng: &mut SmallRng) -> (TeamScore, TeamScore, u32) {
        let innings = Self::featured_innings().balls();
        let balls = (110 + rng.gen_range(0..=3u32)).min(innings);
        let score = 156 + rng.gen_range(0..=8);
        let wickets = if rng.gen_bool(0.1) { 5 } else { 4 };

        let india = TeamScore::new("India", "IND").with_score(score, wickets, Overs::from_balls(balls));
        let australia = TeamScore::new("Australia", "AUS").with_score(
            CHASE_TARGET - 1,
            6,
            Self::featured_innings(),
        );
        (india, australia, balls)
    }

    /// The last six deliveries, newest last. Wides and no-balls carry the
    /// marker of the legal ball before them.
    fn recent_balls(rng: &mut SmallRng, current_ball: u32) -> Vec<BallEvent> {
        let count = current_ball.min(6) as usize;
        let outcomes: Vec<BallOutcome> = (0..count).map(|_| Self::sample_outcome(rng)).collect();

        let mut marker = current_ball;
        let mut events: Vec<BallEvent> = outcomes
            .into_iter()
            .rev()
            .map(|outcome| {
                let event = BallEvent {
                    over: Overs::from_balls(marker),
                    outcome,
                };
                if outcome.is_legal() {
                    marker = marker.saturating_sub(1);
                }
                event
            })
            .collect();
        events.reverse();
        events
    }

    fn sample_outcome(rng: &mut SmallRng) -> BallOutcome {
        match rng.gen_range(0..100) {
            0..=29 => BallOutcome::Dot,
            30..=59 => BallOutcome::Runs(1),
            60..=69 => BallOutcome::Runs(2),
            70..=71 => BallOutcome::Runs(3),
            72..=83 => BallOutcome::Four,
            84..=89 => BallOutcome::Six,
            90..=93 => BallOutcome::Wicket,
            94..=97 => BallOutcome::Wide,
            _ => BallOutcome::NoBall,
        }
    }

    /// Baseline pair jittered by up to `spread` points on each side.
    fn jittered_probability(rng: &mut SmallRng, team_a: f64, team_b: f64, spread: f64) -> WinProbability {
        WinProbability::from_weights(
            team_a + rng.gen_range(-spread..=spread),
            team_b + rng.gen_range(-spread..=spread),
        )
    }
}

impl SnapshotSource for MockDataGenerator {
    fn live_matches(&self) -> Result<Vec<LiveMatch>> {
        let mut rng = self.rng.lock();

        let (india, australia, balls) = Self::featured_chase(&mut rng);
        let needed = CHASE_TARGET.saturating_sub(india.score);
        let remaining = Self::featured_innings().balls().saturating_sub(balls);
        let featured = LiveMatch {
            id: FEATURED_MATCH_ID.to_string(),
            series: "ICC Men's T20 World Cup".to_string(),
            venue: "Melbourne Cricket Ground".to_string(),
            format: FEATURED_FORMAT,
            status: MatchStatus::Live,
            status_text: format!("IND need {needed} runs in {remaining} balls"),
            win_probability: Some(Self::jittered_probability(&mut rng, 62.0, 38.0, 8.0)),
            team_a: india,
            team_b: australia,
        };

        let eng_balls = 249 + rng.gen_range(0..=6);
        let eng_score = 234 + rng.gen_range(0..=10);
        let odi = LiveMatch {
            id: "odi-eng-sa".to_string(),
            series: "England v South Africa ODI Series".to_string(),
            venue: "Lord's, London".to_string(),
            format: MatchFormat::Odi,
            status: MatchStatus::Live,
            status_text: "ENG opted to bat".to_string(),
            win_probability: Some(Self::jittered_probability(&mut rng, 55.0, 45.0, 6.0)),
            team_a: TeamScore::new("England", "ENG").with_score(eng_score, 5, Overs::from_balls(eng_balls)),
            team_b: TeamScore::new("South Africa", "SA"),
        };

        let test = LiveMatch {
            id: "test-nz-pak".to_string(),
            series: "Pakistan tour of New Zealand".to_string(),
            venue: "Basin Reserve, Wellington".to_string(),
            format: MatchFormat::Test,
            status: MatchStatus::Upcoming,
            status_text: "Day 1 starts at 10:30 local".to_string(),
            win_probability: None,
            team_a: TeamScore::new("New Zealand", "NZ"),
            team_b: TeamScore::new("Pakistan", "PAK"),
        };

        Ok(vec![featured, odi, test])
    }

    fn live_score(&self) -> Result<LiveScoreData> {
        let mut rng = self.rng.lock();
        let (batting, bowling, balls) = Self::featured_chase(&mut rng);
        let innings_overs = Self::featured_innings();
        let balls_remaining = Overs::from_balls(balls).remaining_in(innings_overs).balls();

        let striker_first = rng.gen_bool(0.5);
        let mut kohli = BatsmanStats::new("V Kohli", 67 + rng.gen_range(0..=6), 48 + rng.gen_range(0..=3))
            .with_boundaries(6, 2);
        let mut pandya = BatsmanStats::new("H Pandya", 23 + rng.gen_range(0..=6), 14 + rng.gen_range(0..=3))
            .with_boundaries(1, 2);
        if striker_first {
            kohli = kohli.on_strike();
        } else {
            pandya = pandya.on_strike();
        }

        let bowlers = vec![
            BowlerStats::new("M Starc", Overs::new(3, 4), 31 + rng.gen_range(0..=5), 1),
            BowlerStats::new("P Cummins", Overs::new(4, 0), 30, 2).with_maidens(1),
            BowlerStats::new("A Zampa", Overs::new(4, 0), 28 + rng.gen_range(0..=4), 1),
        ];

        Ok(LiveScoreData {
            match_id: FEATURED_MATCH_ID.to_string(),
            current_run_rate: stats::run_rate(batting.score, balls),
            target: Some(CHASE_TARGET),
            required_run_rate: stats::required_run_rate(CHASE_TARGET, batting.score, balls_remaining),
            batting_team: batting,
            bowling_team: bowling,
            innings_overs,
            batsmen: vec![kohli, pandya],
            bowlers,
            recent_balls: Self::recent_balls(&mut rng, balls),
            partnership: Partnership {
                runs: 48 + rng.gen_range(0..=8),
                balls: 31 + rng.gen_range(0..=3),
            },
            last_updated: Utc::now(),
        })
    }

    fn prediction(&self) -> Result<MatchPrediction> {
        let mut rng = self.rng.lock();
        let win_probability = Self::jittered_probability(&mut rng, 58.0, 42.0, 10.0);

        let min = 175 + rng.gen_range(0..=20) - 10;
        let max = min + rng.gen_range(0..=25);
        let projected_score = ScoreRange::coerce(min, max);

        let factors: Vec<String> = PREDICTION_FACTORS
            .choose_multiple(&mut *rng, 3)
            .map(|factor| (*factor).to_string())
            .collect();

        MatchPrediction::new(
            FEATURED_MATCH_ID.to_string(),
            "India".to_string(),
            "Australia".to_string(),
            win_probability,
            projected_score,
        )
        .with_confidence(rng.gen_range(0.6..0.9))
        .map(|prediction| prediction.with_factors(factors))
    }
}

impl Default for MockDataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Static season leaderboard shown on the stats page.
pub fn top_performers() -> Vec<PlayerSummary> {
    let row = |name: &str, team: &str, role, matches, innings, not_outs, runs, balls_faced, wickets| {
        PlayerSummary {
            name: name.to_string(),
            team: team.to_string(),
            role,
            matches,
            innings,
            not_outs,
            runs,
            balls_faced,
            wickets,
        }
    };

    vec![
        row("V Kohli", "India", PlayerRole::Batter, 12, 12, 3, 541, 402, 0),
        row("J Buttler", "England", PlayerRole::WicketKeeper, 11, 11, 1, 468, 318, 0),
        row("T Head", "Australia", PlayerRole::Batter, 12, 12, 0, 455, 287, 0),
        row("H Pandya", "India", PlayerRole::AllRounder, 12, 10, 4, 286, 182, 14),
        row("Shaheen Afridi", "Pakistan", PlayerRole::Bowler, 10, 5, 3, 41, 37, 19),
        row("J Bumrah", "India", PlayerRole::Bowler, 12, 3, 2, 12, 15, 21),
    ]
}
