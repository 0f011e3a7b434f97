/// Lake panel coordination.
///
/// `AppState` owns everything the UI used to keep in globals: which lake is
/// selected, whether the panel is open, the active plot and page tabs, the
/// theme and the deep link. Loading is split off into `load_panel`, which
/// never fails: a fetch or parse error becomes a placeholder message for
/// that panel only.
///
/// Every request carries a `SelectionToken`. Each new selection, plot
/// switch or close bumps the token, and `AppState::deliver` only applies a
/// response whose token is still current. A slow response for a lake the
/// user already left is dropped instead of overwriting the newer panel.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;

use crate::analysis::coverage::IceCoverSeries;
use crate::analysis::phenology::{PhenologyChart, PhenologyTable, derive_phenology};
use crate::analysis::yearly::YearlyProfile;
use crate::config::DataPaths;
use crate::ingest::DataSource;
use crate::ingest::phenology::fetch_phenology;
use crate::ingest::timeseries::fetch_timeseries;
use crate::lakes::LakeCatalog;
use crate::logging::{self, DataSource as LogSource};
use crate::model::DataError;
use crate::route::{DeepLink, MAP_TAB};
use crate::theme::{Palette, Theme};

pub const NO_TIMESERIES_MESSAGE: &str = "No timeseries data available.";
pub const NO_PHENOLOGY_MESSAGE: &str = "No phenology data available.";

// ---------------------------------------------------------------------------
// Requests and content
// ---------------------------------------------------------------------------

/// Identifies one selection. Strictly increasing within an `AppState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SelectionToken(u64);

impl SelectionToken {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        SelectionToken(self.0 + 1)
    }
}

/// The two plot bookmarks of the lake panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotTab {
    /// Lake ice cover: scatter plus average ice year.
    #[default]
    Lic,
    /// Lake ice phenology: interval chart plus table.
    Lip,
}

impl PlotTab {
    pub fn parse(name: &str) -> Option<PlotTab> {
        match name {
            "lic" => Some(PlotTab::Lic),
            "lip" => Some(PlotTab::Lip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRequest {
    pub token: SelectionToken,
    pub lake_id: String,
    pub plot: PlotTab,
}

/// One panel's payload, or the message shown in its place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Section<T> {
    Ready { data: T },
    Unavailable { message: String },
}

impl<T> Section<T> {
    pub fn unavailable(message: &str) -> Self {
        Section::Unavailable {
            message: message.to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Ready { data } => Some(data),
            Section::Unavailable { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Section::Ready { .. } => None,
            Section::Unavailable { message } => Some(message),
        }
    }
}

/// Ice cover panel: the raw series and the average ice year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IceCoverPanel {
    pub coverage: IceCoverSeries,
    pub yearly: YearlyProfile,
}

/// Phenology panel: the interval chart and the table beneath it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhenologyPanel {
    pub chart: PhenologyChart,
    pub table: PhenologyTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelContent {
    Lic(Section<IceCoverPanel>),
    Lip(Section<PhenologyPanel>),
}

impl PanelContent {
    pub fn plot(&self) -> PlotTab {
        match self {
            PanelContent::Lic(_) => PlotTab::Lic,
            PanelContent::Lip(_) => PlotTab::Lip,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelResponse {
    pub token: SelectionToken,
    pub lake_id: String,
    pub content: PanelContent,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn build_ice_cover(
    source: &dyn DataSource,
    paths: &DataPaths,
    lake_id: &str,
) -> Result<IceCoverPanel, DataError> {
    let rows = fetch_timeseries(source, paths, lake_id)?;
    let no_rows = || DataError::NoDataAvailable(format!("timeseries for {lake_id}"));
    let coverage = IceCoverSeries::from_rows(&rows).ok_or_else(no_rows)?;
    let yearly = YearlyProfile::from_rows(&rows).ok_or_else(no_rows)?;
    Ok(IceCoverPanel { coverage, yearly })
}

fn build_phenology(
    source: &dyn DataSource,
    paths: &DataPaths,
    lake_id: &str,
) -> Result<PhenologyPanel, DataError> {
    let rows = fetch_phenology(source, paths, lake_id)?;
    if rows.is_empty() {
        return Err(DataError::NoDataAvailable(format!("phenology for {lake_id}")));
    }
    Ok(PhenologyPanel {
        chart: derive_phenology(&rows),
        table: PhenologyTable::from_rows(&rows),
    })
}

/// Loads the ice cover panel, degrading to the placeholder on any error.
pub fn load_ice_cover(source: &dyn DataSource, paths: &DataPaths, lake_id: &str) -> Section<IceCoverPanel> {
    match build_ice_cover(source, paths, lake_id) {
        Ok(data) => Section::Ready { data },
        Err(e) => {
            logging::log_fetch_failure(LogSource::Timeseries, Some(lake_id), "load ice cover", &e);
            Section::unavailable(NO_TIMESERIES_MESSAGE)
        }
    }
}

/// Loads the phenology panel, degrading to the placeholder on any error.
pub fn load_phenology(source: &dyn DataSource, paths: &DataPaths, lake_id: &str) -> Section<PhenologyPanel> {
    match build_phenology(source, paths, lake_id) {
        Ok(data) => Section::Ready { data },
        Err(e) => {
            logging::log_fetch_failure(LogSource::Phenology, Some(lake_id), "load phenology", &e);
            Section::unavailable(NO_PHENOLOGY_MESSAGE)
        }
    }
}

/// Fetches and transforms the data for one request.
pub fn load_panel(source: &dyn DataSource, paths: &DataPaths, request: &PanelRequest) -> PanelResponse {
    let content = match request.plot {
        PlotTab::Lic => PanelContent::Lic(load_ice_cover(source, paths, &request.lake_id)),
        PlotTab::Lip => PanelContent::Lip(load_phenology(source, paths, &request.lake_id)),
    };
    PanelResponse {
        token: request.token,
        lake_id: request.lake_id.clone(),
        content,
    }
}

/// Both panels of one lake, as printed by the command line tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LakePayload {
    pub lake_id: String,
    pub title: String,
    pub metadata: Vec<(String, String)>,
    pub lic: Section<IceCoverPanel>,
    pub lip: Section<PhenologyPanel>,
}

/// Loads both panels of a lake. The panels load independently; one failing
/// leaves the other intact.
pub fn load_lake(
    source: &dyn DataSource,
    paths: &DataPaths,
    catalog: Option<&LakeCatalog>,
    lake_id: &str,
) -> LakePayload {
    let meta = catalog.and_then(|c| c.find(lake_id));
    LakePayload {
        lake_id: lake_id.to_string(),
        title: meta.map(|m| m.title()).unwrap_or_else(|| lake_id.to_string()),
        metadata: meta
            .map(|m| {
                m.display_fields()
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect()
            })
            .unwrap_or_default(),
        lic: load_ice_cover(source, paths, lake_id),
        lip: load_phenology(source, paths, lake_id),
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    selection: Option<String>,
    token: SelectionToken,
    panel_open: bool,
    plot: PlotTab,
    page: String,
    theme: Theme,
    palette: Palette,
    content: Option<PanelContent>,
    deep_link: DeepLink,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let theme = Theme::default();
        Self {
            selection: None,
            token: SelectionToken(0),
            panel_open: false,
            plot: PlotTab::default(),
            page: MAP_TAB.to_string(),
            theme,
            palette: theme.palette(),
            content: None,
            deep_link: DeepLink::default(),
        }
    }

    fn request(&mut self, lake_id: String) -> PanelRequest {
        self.token = self.token.next();
        self.content = None;
        PanelRequest {
            token: self.token,
            lake_id,
            plot: self.plot,
        }
    }

    /// Fragment for the current page. The map is the landing page and
    /// leaves the fragment off.
    fn page_fragment(&self) -> Option<String> {
        (self.page != MAP_TAB).then(|| self.page.clone())
    }

    /// Selects a lake: opens the panel on the map page, updates the deep
    /// link and returns the request to load.
    pub fn select(&mut self, lake_id: &str) -> PanelRequest {
        self.selection = Some(lake_id.to_string());
        self.panel_open = true;
        self.page = MAP_TAB.to_string();
        self.deep_link = DeepLink::for_lake(lake_id);
        logging::debug(LogSource::Panel, Some(lake_id), "Lake selected");
        self.request(lake_id.to_string())
    }

    /// Restores the page tab of a deep link (no fragment means the map),
    /// then opens the lake it names if the catalog knows it. A lake id on a
    /// page other than the map is not opened.
    pub fn open_deep_link(&mut self, link: &DeepLink, catalog: &LakeCatalog) -> Option<PanelRequest> {
        self.switch_page(link.tab.as_deref().unwrap_or(MAP_TAB));
        if self.page != MAP_TAB {
            return None;
        }
        let lake_id = link.lake_id.as_deref()?;
        if catalog.find(lake_id).is_none() {
            logging::warn(LogSource::Panel, Some(lake_id), "Deep link names an unknown lake");
            return None;
        }
        Some(self.select(lake_id))
    }

    /// Closes the panel. Responses still in flight become stale.
    pub fn close(&mut self) {
        self.selection = None;
        self.panel_open = false;
        self.content = None;
        self.deep_link = DeepLink {
            lake_id: None,
            tab: self.page_fragment(),
        };
        self.token = self.token.next();
    }

    /// Switches the plot bookmark. Returns a reload request when a lake is
    /// selected.
    pub fn switch_plot(&mut self, plot: PlotTab) -> Option<PanelRequest> {
        self.plot = plot;
        let lake_id = self.selection.clone()?;
        Some(self.request(lake_id))
    }

    /// Switches the page tab. Any tab other than the map closes the panel.
    pub fn switch_page(&mut self, tab: &str) {
        self.page = tab.to_string();
        if tab != MAP_TAB {
            self.close();
        } else {
            self.deep_link.tab = None;
        }
    }

    pub fn set_theme(&mut self, theme: Theme) -> Palette {
        self.theme = theme;
        self.palette = theme.palette();
        self.palette
    }

    /// Whether a response carrying `token` may still be applied.
    pub fn accept(&self, token: SelectionToken) -> bool {
        self.panel_open && token == self.token
    }

    /// Applies a response if it is current. Stale responses are dropped
    /// and `false` is returned.
    pub fn deliver(&mut self, response: PanelResponse) -> bool {
        if !self.accept(response.token) {
            logging::debug(
                LogSource::Panel,
                Some(&response.lake_id),
                &format!(
                    "Discarding stale response (token {} != {})",
                    response.token.value(),
                    self.token.value()
                ),
            );
            return false;
        }
        self.content = Some(response.content);
        true
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn token(&self) -> SelectionToken {
        self.token
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn plot(&self) -> PlotTab {
        self.plot
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn content(&self) -> Option<&PanelContent> {
        self.content.as_ref()
    }

    pub fn deep_link(&self) -> &DeepLink {
        &self.deep_link
    }
}

// ---------------------------------------------------------------------------
// Background loading
// ---------------------------------------------------------------------------

/// Runs panel loads on background threads and hands the responses back
/// over a channel. Each request gets its own thread; there is no
/// cancellation, `AppState::deliver` filters what arrives late.
pub struct PanelWorker {
    source: Arc<dyn DataSource>,
    paths: Arc<DataPaths>,
    tx: Sender<PanelResponse>,
    rx: Receiver<PanelResponse>,
}

impl PanelWorker {
    pub fn new(source: Arc<dyn DataSource>, paths: DataPaths) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            paths: Arc::new(paths),
            tx,
            rx,
        }
    }

    pub fn submit(&self, request: PanelRequest) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let paths = Arc::clone(&self.paths);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let response = load_panel(source.as_ref(), &paths, &request);
            // The receiver only goes away with the worker itself.
            let _ = tx.send(response);
        })
    }

    pub fn try_recv(&self) -> Option<PanelResponse> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<PanelResponse> {
        self.rx.recv_timeout(timeout).ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
