//! Dashboard actions: the work behind each button.
//!
//! Every action is an async task that returns the new container content, or
//! an error, to whoever awaited it. Actions share nothing but the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::api::{Feed, FeedClient};
use crate::models::{Earthquake, FeedResponse};
use crate::render::{filter_by_mag_type, summarize, ContainerView, RecordsKind};
use crate::store::QuakeStore;

/// Alert shown after a successful fetch
pub const FETCHED_ALERT: &str = "Data fetched and stored locally.";

/// Alert shown after the store is cleared
pub const CLEARED_ALERT: &str = "Local store has been cleared.";

/// Container message when summary or original is requested on an empty store
pub const NO_DATA_MESSAGE: &str = "No data available. Please fetch data first.";

/// The four dashboard buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    FetchData,
    ShowSummary,
    ShowOriginal,
    ClearStore,
}

impl Button {
    pub const ALL: [Button; 4] = [
        Button::FetchData,
        Button::ShowSummary,
        Button::ShowOriginal,
        Button::ClearStore,
    ];

    /// Element id of the button on the dashboard page
    pub fn id(&self) -> &'static str {
        match self {
            Button::FetchData => "fetch-data-button",
            Button::ShowSummary => "show-summary-button",
            Button::ShowOriginal => "show-original-button",
            Button::ClearStore => "clear-db-button",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Button::FetchData => "Fetch Data",
            Button::ShowSummary => "Show Summary Table",
            Button::ShowOriginal => "Show Original Data",
            Button::ClearStore => "Clear Local Store",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.id() == id)
    }

    pub fn action(&self) -> Action {
        match self {
            Button::FetchData => Action::Fetch,
            Button::ShowSummary => Action::ShowSummary,
            Button::ShowOriginal => Action::ShowOriginal,
            Button::ClearStore => Action::Clear,
        }
    }
}

/// A user request to the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Fetch,
    ShowSummary,
    ShowOriginal,
    Clear,
    /// A summary row was selected
    FilterByMagType(Option<String>),
}

impl Action {
    pub fn describe(&self) -> &'static str {
        match self {
            Action::Fetch => "fetch",
            Action::ShowSummary => "show summary",
            Action::ShowOriginal => "show original data",
            Action::Clear => "clear local store",
            Action::FilterByMagType(_) => "filter by magType",
        }
    }
}

/// What an action produced: the new container content and an optional alert
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub view: ContainerView,
    pub alert: Option<String>,
}

impl ActionOutcome {
    fn view(view: ContainerView) -> Self {
        Self { view, alert: None }
    }

    fn no_data() -> Self {
        Self::view(ContainerView::Message(NO_DATA_MESSAGE.to_string()))
    }
}

/// Store plus feed client; cheap to clone into spawned tasks
#[derive(Clone)]
pub struct Dashboard {
    store: Arc<QuakeStore>,
    client: FeedClient,
    fetch_feed: Feed,
}

impl Dashboard {
    pub fn new(store: Arc<QuakeStore>, client: FeedClient, fetch_feed: Feed) -> Self {
        Self {
            store,
            client,
            fetch_feed,
        }
    }

    pub fn store(&self) -> &QuakeStore {
        &self.store
    }

    /// Run one action to completion. Store work runs on the blocking pool.
    pub async fn run(&self, action: Action) -> Result<ActionOutcome> {
        let result = match &action {
            Action::Fetch => self.fetch_and_store().await,
            Action::ShowSummary => self.blocking(Self::show_summary).await,
            Action::ShowOriginal => self.blocking(Self::show_original).await,
            Action::Clear => self.blocking(Self::clear).await,
            Action::FilterByMagType(mag_type) => {
                let mag_type = mag_type.clone();
                self.blocking(move |dash| dash.show_by_mag_type(mag_type.as_deref()))
                    .await
            }
        };

        if let Err(ref e) = result {
            error!(action = action.describe(), error = %e, "Dashboard action failed");
        }
        result
    }

    /// Run synchronous store work off the async worker threads
    async fn blocking<F>(&self, work: F) -> Result<ActionOutcome>
    where
        F: FnOnce(&Dashboard) -> Result<ActionOutcome> + Send + 'static,
    {
        let dash = self.clone();
        tokio::task::spawn_blocking(move || work(&dash))
            .await
            .context("Store task did not complete")?
    }

    /// Download the configured feed, upsert every feature, show what came back
    pub async fn fetch_and_store(&self) -> Result<ActionOutcome> {
        let feed = self.client.fetch_feed(self.fetch_feed).await?;
        self.blocking(move |dash| dash.ingest(feed)).await
    }

    /// Upsert a parsed feed and render its features
    pub fn ingest(&self, feed: FeedResponse) -> Result<ActionOutcome> {
        let written = self
            .store
            .put_all(&feed.features)
            .context("Failed to store fetched earthquakes")?;
        info!(written, "Stored fetched earthquakes");

        Ok(ActionOutcome {
            view: ContainerView::Records {
                kind: RecordsKind::Fetched,
                records: feed.features,
            },
            alert: Some(FETCHED_ALERT.to_string()),
        })
    }

    fn load_all(&self) -> Result<Vec<Earthquake>> {
        self.store
            .get_all()
            .context("Failed to read earthquakes from local store")
    }

    pub fn show_summary(&self) -> Result<ActionOutcome> {
        let records = self.load_all()?;
        if records.is_empty() {
            return Ok(ActionOutcome::no_data());
        }
        Ok(ActionOutcome::view(ContainerView::Summary(summarize(&records))))
    }

    pub fn show_original(&self) -> Result<ActionOutcome> {
        let records = self.load_all()?;
        if records.is_empty() {
            return Ok(ActionOutcome::no_data());
        }
        Ok(ActionOutcome::view(ContainerView::Records {
            kind: RecordsKind::Original,
            records,
        }))
    }

    /// Re-read the full store and keep one magType
    pub fn show_by_mag_type(&self, mag_type: Option<&str>) -> Result<ActionOutcome> {
        let records = self.load_all()?;
        Ok(ActionOutcome::view(ContainerView::Records {
            kind: RecordsKind::Filtered(mag_type.map(str::to_string)),
            records: filter_by_mag_type(&records, mag_type),
        }))
    }

    pub fn clear(&self) -> Result<ActionOutcome> {
        self.store.clear().context("Error clearing local store")?;
        Ok(ActionOutcome {
            view: ContainerView::Empty,
            alert: Some(CLEARED_ALERT.to_string()),
        })
    }
}
