//! Application state management for quakecache.
//!
//! This module contains the `App` struct that owns the dashboard, the UI
//! state, and the channel that brings results of button actions back from
//! their background tasks.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use quakecache_core::dashboard::{Action, ActionOutcome, Button, Dashboard};
use quakecache_core::render::ContainerView;
use quakecache_core::{Config, FeedClient, QuakeStore};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the action result channel.
/// A handful of in-flight button presses at most.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Current UI focus area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Buttons,
    Container,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ShowingAlert,
    ConfirmingQuit,
    Quitting,
}

/// Result of one background action, sent back through the channel
struct ActionResult {
    action: Action,
    result: Result<ActionOutcome>,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    dashboard: Dashboard,

    // UI State
    pub state: AppState,
    pub focus: Focus,
    pub button_selection: usize,
    pub row_selection: usize,

    /// Content of the data container
    pub view: ContainerView,
    pub alert: Option<String>,
    pub status_message: Option<String>,
    pub last_updated: String,

    /// Actions spawned but not yet reported back
    pub pending_actions: usize,

    result_rx: mpsc::Receiver<ActionResult>,
    result_tx: mpsc::Sender<ActionResult>,
}

impl App {
    /// Create the application: build the static UI (buttons and an empty
    /// container), then wire the buttons to the dashboard. Once this returns
    /// every button is live for the rest of the process.
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        debug!(?data_dir, "Data directory configured");

        let store = QuakeStore::open(&data_dir)
            .with_context(|| format!("Failed to open local store in {}", data_dir.display()))?;
        let client = FeedClient::with_base_url(&config.feed_base_url, config.request_timeout())?;
        let dashboard = Dashboard::new(Arc::new(store), client, config.fetch_feed);

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut app = Self {
            config,
            dashboard,

            state: AppState::Normal,
            focus: Focus::Buttons,
            button_selection: 0,
            row_selection: 0,

            view: ContainerView::Empty,
            alert: None,
            status_message: None,
            last_updated: "never".to_string(),

            pending_actions: 0,

            result_rx: rx,
            result_tx: tx,
        };
        app.refresh_last_updated();

        info!(buttons = Button::ALL.len(), "Dashboard wired");
        Ok(app)
    }

    fn refresh_last_updated(&mut self) {
        self.last_updated = match self.dashboard.store().last_written() {
            Ok(Some(at)) => at.age_display(),
            Ok(None) => "never".to_string(),
            Err(e) => {
                debug!(error = %e, "Failed to read store timestamp");
                "unknown".to_string()
            }
        };
    }

    pub fn selected_button(&self) -> Button {
        Button::ALL[self.button_selection % Button::ALL.len()]
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub fn press(&mut self, button: Button) {
        debug!(button = button.id(), "Button pressed");
        self.dispatch(button.action());
    }

    /// Spawn a task running the action; its result arrives via the channel
    pub fn dispatch(&mut self, action: Action) {
        let dashboard = self.dashboard.clone();
        let tx = self.result_tx.clone();

        self.status_message = Some(match action {
            Action::Fetch => format!("Fetching {} of earthquakes...", self.config.fetch_feed.label()),
            _ => format!("Working: {}...", action.describe()),
        });
        self.pending_actions += 1;

        tokio::spawn(async move {
            let result = dashboard.run(action.clone()).await;
            if tx.send(ActionResult { action, result }).await.is_err() {
                warn!("Action finished after the UI closed its channel");
            }
        });
    }

    /// Filter the full store by the magType of the selected summary row
    pub fn select_summary_row(&mut self) {
        if let ContainerView::Summary(ref rows) = self.view {
            if let Some(row) = rows.get(self.row_selection) {
                let mag_type = row.mag_type.clone();
                self.dispatch(Action::FilterByMagType(mag_type));
            }
        }
    }

    /// Apply every finished action
    pub fn check_background_tasks(&mut self) {
        while let Ok(finished) = self.result_rx.try_recv() {
            self.apply_result(finished.action, finished.result);
        }
    }

    fn apply_result(&mut self, action: Action, result: Result<ActionOutcome>) {
        self.pending_actions = self.pending_actions.saturating_sub(1);
        if self.pending_actions == 0 {
            self.status_message = None;
        }

        match result {
            Ok(outcome) => {
                // Every render replaces the whole container
                self.view = outcome.view;
                self.row_selection = 0;
                if let Some(alert) = outcome.alert {
                    self.show_alert(alert);
                }
            }
            Err(e) => {
                self.show_alert(format!("Could not {}: {:#}", action.describe(), e));
            }
        }
        self.refresh_last_updated();
    }

    fn show_alert(&mut self, message: String) {
        self.alert = Some(message);
        self.state = AppState::ShowingAlert;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Number of selectable rows in the container
    pub fn row_count(&self) -> usize {
        match &self.view {
            ContainerView::Summary(rows) => rows.len(),
            ContainerView::Records { records, .. } => records.len(),
            ContainerView::Empty | ContainerView::Message(_) => 0,
        }
    }

    pub fn next_button(&mut self) {
        self.button_selection = (self.button_selection + 1) % Button::ALL.len();
    }

    pub fn prev_button(&mut self) {
        self.button_selection = (self.button_selection + Button::ALL.len() - 1) % Button::ALL.len();
    }

    pub fn move_row(&mut self, delta: isize) {
        let count = self.row_count();
        if count == 0 {
            self.row_selection = 0;
            return;
        }
        let current = self.row_selection as isize;
        self.row_selection = (current + delta).clamp(0, count as isize - 1) as usize;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Buttons => Focus::Container,
            Focus::Container => Focus::Buttons,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quakecache_core::dashboard::{CLEARED_ALERT, FETCHED_ALERT};
    use quakecache_core::models::{Earthquake, FeedResponse};
    use quakecache_core::render::{RecordsKind, SummaryRow};

    fn test_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            feed_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        let app = App::new(config).expect("app builds");
        (dir, app)
    }

    fn seed(app: &App, quakes: &[(&str, &str)]) {
        let features = quakes
            .iter()
            .map(|(id, mag_type)| {
                serde_json::from_value::<Earthquake>(serde_json::json!({
                    "type": "Feature",
                    "id": id,
                    "properties": {"mag": 1.0, "place": "somewhere", "time": 0, "magType": mag_type}
                }))
                .expect("fixture parses")
            })
            .collect();
        app.dashboard
            .ingest(FeedResponse { metadata: None, features })
            .expect("ingest");
    }

    /// Wait for every dispatched action and apply its result
    async fn settle(app: &mut App) {
        while app.pending_actions > 0 {
            let finished = app.result_rx.recv().await.expect("channel open");
            app.apply_result(finished.action, finished.result);
        }
    }

    #[tokio::test]
    async fn test_summary_row_selection_filters() {
        let (_dir, mut app) = test_app();
        seed(&app, &[("a", "md"), ("b", "ml"), ("c", "md")]);

        app.press(Button::ShowSummary);
        settle(&mut app).await;
        assert_eq!(
            app.view,
            ContainerView::Summary(vec![
                SummaryRow { mag_type: Some("md".into()), count: 2 },
                SummaryRow { mag_type: Some("ml".into()), count: 1 },
            ])
        );
        assert_eq!(app.state, AppState::Normal);

        app.select_summary_row();
        settle(&mut app).await;
        match &app.view {
            ContainerView::Records { kind, records } => {
                assert_eq!(*kind, RecordsKind::Filtered(Some("md".into())));
                assert_eq!(records.len(), 2);
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clear_shows_alert_and_empties_container() {
        let (_dir, mut app) = test_app();
        seed(&app, &[("a", "md")]);

        app.press(Button::ShowOriginal);
        settle(&mut app).await;
        assert_eq!(app.row_count(), 1);

        app.press(Button::ClearStore);
        settle(&mut app).await;
        assert_eq!(app.view, ContainerView::Empty);
        assert_eq!(app.state, AppState::ShowingAlert);
        assert_eq!(app.alert.as_deref(), Some(CLEARED_ALERT));

        app.dismiss_alert();
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.alert, None);
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces_alert() {
        let (_dir, mut app) = test_app();
        app.press(Button::FetchData);
        assert!(app.status_message.is_some());
        settle(&mut app).await;

        assert_eq!(app.state, AppState::ShowingAlert);
        let alert = app.alert.clone().unwrap_or_default();
        assert!(alert.starts_with("Could not fetch"));
        assert_ne!(alert, FETCHED_ALERT);
        assert_eq!(app.view, ContainerView::Empty);
        assert_eq!(app.status_message, None);
    }

    #[test]
    fn test_button_cycling() {
        let (_dir, mut app) = test_app();
        assert_eq!(app.selected_button(), Button::FetchData);
        app.prev_button();
        assert_eq!(app.selected_button(), Button::ClearStore);
        app.next_button();
        app.next_button();
        assert_eq!(app.selected_button(), Button::ShowSummary);
    }

    #[test]
    fn test_move_row_clamps() {
        let (_dir, mut app) = test_app();
        app.move_row(5);
        assert_eq!(app.row_selection, 0);

        app.view = ContainerView::Summary(vec![
            SummaryRow { mag_type: Some("md".into()), count: 1 },
            SummaryRow { mag_type: Some("ml".into()), count: 1 },
        ]);
        app.move_row(PAGE_SCROLL_SIZE as isize);
        assert_eq!(app.row_selection, 1);
        app.move_row(-3);
        assert_eq!(app.row_selection, 0);
    }
}
