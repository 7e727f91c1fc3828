//! Page containers: subscribe on mount, hold the latest snapshot, render
//! through the widgets, unsubscribe on unmount.

use cricket_models::{LiveMatch, LiveScoreData, MatchPrediction, MatchStatus, PlayerSummary, Result};
use cricket_services::{PollingService, Subscription};
use cricket_stream::Notification;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analysis::InningsAnalysis;
use crate::widgets;

pub trait Page {
    fn title(&self) -> &'static str;

    /// True until the first snapshot arrives.
    fn is_loading(&self) -> bool;

    fn render(&self) -> String;

    fn to_json(&self) -> Result<serde_json::Value>;
}

/// Latest value pushed by a subscription, shared with the callback.
struct Latest<T> {
    value: Arc<RwLock<Option<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Latest<T> {
    fn new() -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
        }
    }

    fn setter(&self) -> impl Fn(&T) + Send + Sync + 'static {
        let value = self.value.clone();
        move |snapshot: &T| {
            *value.write() = Some(snapshot.clone());
        }
    }

    fn get(&self) -> Option<T> {
        self.value.read().clone()
    }

    fn is_empty(&self) -> bool {
        self.value.read().is_none()
    }
}

impl Latest<Vec<LiveMatch>> {
    fn list_setter(&self) -> impl Fn(&[LiveMatch]) + Send + Sync + 'static {
        let value = self.value.clone();
        move |list: &[LiveMatch]| {
            *value.write() = Some(list.to_vec());
        }
    }
}

fn unmount_all(subscriptions: Vec<Subscription>) {
    debug!("Unmounting page with {} subscriptions", subscriptions.len());
    for subscription in subscriptions {
        subscription.unsubscribe();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub sync_active: bool,
    pub matches: Vec<LiveMatch>,
    pub live_score: Option<LiveScoreData>,
}

/// Match cards for every fixture plus the featured scorecard.
pub struct DashboardPage {
    service: PollingService,
    sync_active: bool,
    matches: Latest<Vec<LiveMatch>>,
    live_score: Latest<LiveScoreData>,
    subscriptions: Vec<Subscription>,
}

impl DashboardPage {
    pub fn mount(service: &PollingService) -> Self {
        let matches: Latest<Vec<LiveMatch>> = Latest::new();
        let live_score = Latest::new();

        let subscriptions = vec![
            service.subscribe_live_matches(matches.list_setter()),
            service.subscribe_live_score(live_score.setter()),
        ];

        Self {
            service: service.clone(),
            sync_active: true,
            matches,
            live_score,
            subscriptions,
        }
    }

    pub fn is_sync_active(&self) -> bool {
        self.sync_active
    }

    /// Pause or resume the live-matches and live-score timers. The last
    /// snapshot stays on screen while paused. Returns the new state.
    pub fn toggle_sync(&mut self) -> bool {
        self.sync_active = !self.sync_active;

        let message = if self.sync_active {
            self.service.start_live_score_polling();
            self.service.start_live_matches_polling();
            "Live data syncing resumed"
        } else {
            self.service.stop_live_score_polling();
            self.service.stop_live_matches_polling();
            "Live data syncing paused"
        };

        info!("🔁 {}", message);
        self.service.publish(Notification::info("dashboard", message));
        self.sync_active
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            sync_active: self.sync_active,
            matches: self.matches.get().unwrap_or_default(),
            live_score: self.live_score.get(),
        }
    }

    pub fn unmount(self) {
        unmount_all(self.subscriptions);
    }
}

impl Page for DashboardPage {
    fn title(&self) -> &'static str {
        "Dashboard"
    }

    fn is_loading(&self) -> bool {
        self.matches.is_empty() && self.live_score.is_empty()
    }

    fn render(&self) -> String {
        if self.is_loading() {
            return widgets::loading(self.title());
        }

        let view = self.view();
        let sync = if view.sync_active { "on" } else { "paused" };
        let mut sections = vec![format!("== {} ==  (live sync: {sync})", self.title())];
        sections.extend(view.matches.iter().map(widgets::match_card));
        if let Some(score) = &view.live_score {
            sections.push(widgets::score_header(score));
            sections.push(widgets::recent_balls(&score.recent_balls));
        }
        sections.join("\n\n")
    }

    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.view())?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatsTab {
    Batting,
    Bowling,
    Leaderboard,
}

/// Live batting and bowling cards, plus the season leaderboard.
pub struct StatsPage {
    leaderboard: Vec<PlayerSummary>,
    live_score: Latest<LiveScoreData>,
    active_tab: StatsTab,
    subscriptions: Vec<Subscription>,
}

impl StatsPage {
    pub fn mount(service: &PollingService, leaderboard: Vec<PlayerSummary>) -> Self {
        let live_score = Latest::new();
        let subscriptions = vec![service.subscribe_live_score(live_score.setter())];

        Self {
            leaderboard,
            live_score,
            active_tab: StatsTab::Batting,
            subscriptions,
        }
    }

    pub fn active_tab(&self) -> StatsTab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: StatsTab) {
        self.active_tab = tab;
    }

    pub fn unmount(self) {
        unmount_all(self.subscriptions);
    }
}

impl Page for StatsPage {
    fn title(&self) -> &'static str {
        "Stats"
    }

    fn is_loading(&self) -> bool {
        // The leaderboard is static, so only the live tabs wait for data.
        self.active_tab != StatsTab::Leaderboard && self.live_score.is_empty()
    }

    fn render(&self) -> String {
        if self.is_loading() {
            return widgets::loading(self.title());
        }

        let body = match self.active_tab {
            StatsTab::Leaderboard => widgets::leaderboard_table(&self.leaderboard),
            StatsTab::Batting => self
                .live_score
                .get()
                .map(|score| widgets::batting_table(&score.batsmen))
                .unwrap_or_default(),
            StatsTab::Bowling => self
                .live_score
                .get()
                .map(|score| widgets::bowling_table(&score.bowlers))
                .unwrap_or_default(),
        };
        format!("== {} ({:?}) ==\n{}", self.title(), self.active_tab, body)
    }

    fn to_json(&self) -> Result<serde_json::Value> {
        let score = self.live_score.get();
        Ok(serde_json::json!({
            "active_tab": self.active_tab,
            "leaderboard": self.leaderboard,
            "batsmen": score.as_ref().map(|s| &s.batsmen),
            "bowlers": score.as_ref().map(|s| &s.bowlers),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PredictionTab {
    Live,
    Upcoming,
    Insights,
}

/// Live call for the featured match, fixtures still to come, and what
/// drives the current call.
pub struct PredictionsPage {
    prediction: Latest<MatchPrediction>,
    matches: Latest<Vec<LiveMatch>>,
    active_tab: PredictionTab,
    subscriptions: Vec<Subscription>,
}

impl PredictionsPage {
    pub fn mount(service: &PollingService) -> Self {
        let prediction = Latest::new();
        let matches: Latest<Vec<LiveMatch>> = Latest::new();
        let subscriptions = vec![
            service.subscribe_predictions(prediction.setter()),
            service.subscribe_live_matches(matches.list_setter()),
        ];
        Self {
            prediction,
            matches,
            active_tab: PredictionTab::Live,
            subscriptions,
        }
    }

    pub fn latest(&self) -> Option<MatchPrediction> {
        self.prediction.get()
    }

    /// Fixtures that have not started yet.
    pub fn upcoming(&self) -> Vec<LiveMatch> {
        self.matches
            .get()
            .unwrap_or_default()
            .into_iter()
            .filter(|live| live.status == MatchStatus::Upcoming)
            .collect()
    }

    pub fn active_tab(&self) -> PredictionTab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: PredictionTab) {
        self.active_tab = tab;
    }

    pub fn unmount(self) {
        unmount_all(self.subscriptions);
    }
}

impl Page for PredictionsPage {
    fn title(&self) -> &'static str {
        "Predictions"
    }

    fn is_loading(&self) -> bool {
        match self.active_tab {
            PredictionTab::Live | PredictionTab::Insights => self.prediction.is_empty(),
            PredictionTab::Upcoming => self.matches.is_empty(),
        }
    }

    fn render(&self) -> String {
        if self.is_loading() {
            return widgets::loading(self.title());
        }

        let body = match self.active_tab {
            PredictionTab::Live => self
                .latest()
                .map(|prediction| widgets::prediction_card(&prediction))
                .unwrap_or_default(),
            PredictionTab::Insights => self
                .latest()
                .map(|prediction| widgets::prediction_insights(&prediction))
                .unwrap_or_default(),
            PredictionTab::Upcoming => {
                let upcoming = self.upcoming();
                if upcoming.is_empty() {
                    "No upcoming fixtures".to_string()
                } else {
                    upcoming.iter().map(widgets::match_card).collect::<Vec<_>>().join("\n\n")
                }
            }
        };
        format!("== {} ({:?}) ==\n{}", self.title(), self.active_tab, body)
    }

    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "active_tab": self.active_tab,
            "prediction": self.latest(),
            "upcoming": self.upcoming(),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisTab {
    Overview,
    Batting,
    Bowling,
    Comparison,
}

/// Derived chase numbers for the featured innings.
pub struct AnalysisPage {
    live_score: Latest<LiveScoreData>,
    active_tab: AnalysisTab,
    subscriptions: Vec<Subscription>,
}

impl AnalysisPage {
    pub fn mount(service: &PollingService) -> Self {
        let live_score = Latest::new();
        let subscriptions = vec![service.subscribe_live_score(live_score.setter())];
        Self {
            live_score,
            active_tab: AnalysisTab::Overview,
            subscriptions,
        }
    }

    pub fn analysis(&self) -> Option<InningsAnalysis> {
        self.live_score.get().as_ref().map(InningsAnalysis::from_score)
    }

    pub fn active_tab(&self) -> AnalysisTab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: AnalysisTab) {
        self.active_tab = tab;
    }

    pub fn unmount(self) {
        unmount_all(self.subscriptions);
    }
}

impl Page for AnalysisPage {
    fn title(&self) -> &'static str {
        "Analysis"
    }

    fn is_loading(&self) -> bool {
        self.live_score.is_empty()
    }

    fn render(&self) -> String {
        let Some(score) = self.live_score.get() else {
            return widgets::loading(self.title());
        };

        let body = match self.active_tab {
            AnalysisTab::Overview => InningsAnalysis::from_score(&score).render(),
            AnalysisTab::Batting => format!(
                "{}\nPartnership: {} off {} balls",
                widgets::batting_table(&score.batsmen),
                score.partnership.runs,
                score.partnership.balls
            ),
            AnalysisTab::Bowling => widgets::bowling_table(&score.bowlers),
            AnalysisTab::Comparison => {
                widgets::team_comparison(&score.batting_team, &score.bowling_team, score.innings_overs)
            }
        };
        format!("== {} ({:?}) ==\n{}", self.title(), self.active_tab, body)
    }

    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "active_tab": self.active_tab,
            "analysis": self.analysis(),
        }))
    }
}
