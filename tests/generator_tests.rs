use cricket_models::{stats, MatchStatus};
use cricket_services::{top_performers, MockDataGenerator, SnapshotSource};
use proptest::prelude::*;
use tokio_test::assert_ok;

#[test]
fn test_same_seed_same_scores() {
    let first = MockDataGenerator::with_seed(99);
    let second = MockDataGenerator::with_seed(99);

    let a = assert_ok!(first.live_score());
    let b = assert_ok!(second.live_score());
    assert_eq!(a.batting_team, b.batting_team);
    assert_eq!(a.batsmen, b.batsmen);
    assert_eq!(a.recent_balls, b.recent_balls);
}

#[test]
fn test_fixture_list_shape() {
    let generator = MockDataGenerator::with_seed(1);
    let matches = assert_ok!(generator.live_matches());

    assert_eq!(matches.len(), 3);
    assert!(matches.iter().filter(|m| m.is_live()).count() >= 2);

    let upcoming = matches
        .iter()
        .find(|m| m.status == MatchStatus::Upcoming)
        .expect("one fixture is yet to start");
    assert!(upcoming.win_probability.is_none());
    assert!(!upcoming.team_a.has_batted());
}

#[test]
fn test_leaderboard_sorted_by_runs() {
    let players = top_performers();
    assert!(!players.is_empty());
    assert!(players.windows(2).all(|pair| pair[0].runs >= pair[1].runs));
}

proptest! {
    #[test]
    fn prop_probabilities_sum_to_100(seed in any::<u64>()) {
        let generator = MockDataGenerator::with_seed(seed);

        let prediction = generator.prediction().unwrap();
        let probability = prediction.win_probability;
        prop_assert_eq!(u32::from(probability.team_a()) + u32::from(probability.team_b()), 100);

        for live in generator.live_matches().unwrap() {
            if let Some(probability) = live.win_probability {
                prop_assert_eq!(u32::from(probability.team_a()) + u32::from(probability.team_b()), 100);
            }
        }
    }

    #[test]
    fn prop_projected_range_is_ordered(seed in any::<u64>()) {
        let prediction = MockDataGenerator::with_seed(seed).prediction().unwrap();
        let range = prediction.projected_score;

        prop_assert!(range.max() > range.min());
        prop_assert!(range.contains(range.midpoint()));
        prop_assert!((0.0..=1.0).contains(&prediction.confidence));
        prop_assert_eq!(prediction.key_factors.len(), 3);
    }

    #[test]
    fn prop_strike_rates_match_runs_and_balls(seed in any::<u64>()) {
        let score = MockDataGenerator::with_seed(seed).live_score().unwrap();

        prop_assert_eq!(score.batsmen.iter().filter(|b| b.on_strike).count(), 1);
        for batsman in &score.batsmen {
            prop_assert_eq!(batsman.strike_rate, stats::strike_rate(batsman.runs, batsman.balls));
        }
        for bowler in &score.bowlers {
            prop_assert_eq!(bowler.economy, stats::economy(bowler.runs, bowler.overs.balls()));
        }
        prop_assert!(score.recent_balls.len() <= 6);
    }
}
