use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};
use crate::buffer::RollingSeries;
use crate::chart::Chart;
use crate::config::DashboardConfig;
use crate::data::{PriceRecord, Symbol, DATE_FORMAT};
use crate::rest_client::PriceSource;
use crate::scheduler::ScheduledTask;

const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Polling,
    HistoricalView,
}

/// Live polling applies when both dates are empty or both are today.
pub fn should_poll(start: &str, end: &str, today: NaiveDate) -> bool {
    let (start, end) = (start.trim(), end.trim());
    let today = today.format(DATE_FORMAT).to_string();
    (start.is_empty() && end.is_empty()) || (start == today && end == today)
}

#[derive(Debug)]
struct ViewState {
    current: Symbol,
    mode: Mode,
    series: HashMap<Symbol, RollingSeries>,
    chart: Chart,
}

struct Shared<S> {
    source: S,
    view: Mutex<ViewState>,
    redraws: watch::Sender<Chart>,
}

impl<S: PriceSource> Shared<S> {
    async fn fetch_current(&self) {
        let symbol = self.view.lock().await.current;
        self.fetch_latest(symbol).await;
    }

    async fn fetch_latest(&self, symbol: Symbol) {
        let record = match self.source.latest(symbol).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("No price available yet for {}", symbol);
                return;
            }
            Err(e) => {
                error!("Error fetching latest {} price: {}", symbol, e);
                return;
            }
        };

        let mut view = self.view.lock().await;
        let label = Utc::now().format(LABEL_FORMAT).to_string();
        if let Some(series) = view.series.get_mut(&symbol) {
            series.push(label, record.price);
        }
        self.redraw(&mut view, symbol);
    }

    async fn load_history(&self, symbol: Symbol, start: NaiveDate, end: NaiveDate) {
        let records = match self.source.history(symbol, start, end).await {
            Ok(records) => records,
            Err(e) => {
                error!("Error fetching {} history: {}", symbol, e);
                return;
            }
        };

        info!("Loaded {} historical {} prices", records.len(), symbol);
        let mut view = self.view.lock().await;
        if let Some(series) = view.series.get_mut(&symbol) {
            series.replace(records.iter().map(history_point));
        }
        self.redraw(&mut view, symbol);
    }

    // A response for a tab that is no longer shown updates its series but not the chart.
    fn redraw(&self, view: &mut ViewState, symbol: Symbol) {
        if view.current != symbol {
            return;
        }

        let ViewState { series, chart, .. } = view;
        if let Some(series) = series.get(&symbol) {
            chart.update(symbol, series);
            self.redraws.send_replace(chart.clone());
        }
    }
}

fn history_point(record: &PriceRecord) -> (String, rust_decimal::Decimal) {
    (record.timestamp.format(LABEL_FORMAT).to_string(), record.price)
}

/// Client-side controller: one tab per symbol, live polling or a historical range.
pub struct Dashboard<S: PriceSource + 'static> {
    shared: Arc<Shared<S>>,
    poller: Option<ScheduledTask>,
    poll_interval: Duration,
}

impl<S: PriceSource + 'static> Dashboard<S> {
    pub fn new(source: S, config: &DashboardConfig) -> Self {
        let series = Symbol::ALL
            .into_iter()
            .map(|symbol| (symbol, RollingSeries::new(config.window_size)))
            .collect();

        let (redraws, _) = watch::channel(Chart::new());

        Self {
            shared: Arc::new(Shared {
                source,
                view: Mutex::new(ViewState {
                    current: Symbol::Bitcoin,
                    mode: Mode::Idle,
                    series,
                    chart: Chart::new(),
                }),
                redraws,
            }),
            poller: None,
            poll_interval: config.poll_interval(),
        }
    }

    /// Initial page state: live polling on the default tab.
    pub async fn start(&mut self) {
        self.start_polling().await;
    }

    /// Makes `symbol` the current tab without fetching anything.
    pub async fn set_symbol(&mut self, symbol: Symbol) {
        self.shared.view.lock().await.current = symbol;
        info!("Switched to {} tab", symbol);
    }

    pub async fn select_tab(&mut self, symbol: Symbol) {
        self.set_symbol(symbol).await;
        self.shared.fetch_latest(symbol).await;
    }

    /// Handles the fetch button. Empty or today's dates poll; anything else loads history.
    pub async fn fetch(&mut self, start: &str, end: &str) {
        self.stop_polling().await;

        if should_poll(start, end, Utc::now().date_naive()) {
            self.start_polling().await;
            return;
        }

        let dates = (
            NaiveDate::parse_from_str(start.trim(), DATE_FORMAT),
            NaiveDate::parse_from_str(end.trim(), DATE_FORMAT),
        );
        let (start, end) = match dates {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                error!("Invalid date range '{}'..'{}', nothing fetched", start, end);
                self.shared.view.lock().await.mode = Mode::Idle;
                return;
            }
        };

        let symbol = {
            let mut view = self.shared.view.lock().await;
            view.mode = Mode::HistoricalView;
            view.current
        };
        info!("Historical view for {} from {} to {}", symbol, start, end);
        self.shared.load_history(symbol, start, end).await;
    }

    async fn start_polling(&mut self) {
        self.stop_polling().await;
        self.shared.view.lock().await.mode = Mode::Polling;
        info!("Polling latest prices every {:?}", self.poll_interval);

        let shared = Arc::clone(&self.shared);
        self.poller = Some(ScheduledTask::spawn("dashboard-poll", self.poll_interval, move || {
            let shared = Arc::clone(&shared);
            async move { shared.fetch_current().await }
        }));
    }

    async fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(ScheduledTask::is_running)
    }

    pub async fn mode(&self) -> Mode {
        self.shared.view.lock().await.mode
    }

    pub async fn current_symbol(&self) -> Symbol {
        self.shared.view.lock().await.current
    }

    pub async fn series(&self, symbol: Symbol) -> Option<RollingSeries> {
        self.shared.view.lock().await.series.get(&symbol).cloned()
    }

    pub async fn chart(&self) -> Chart {
        self.shared.view.lock().await.chart.clone()
    }

    /// Receives a copy of the chart after every redraw.
    pub fn subscribe(&self) -> watch::Receiver<Chart> {
        self.shared.redraws.subscribe()
    }

    pub async fn shutdown(&mut self) {
        self.stop_polling().await;
        self.shared.view.lock().await.mode = Mode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dates_poll() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(should_poll("", "", today));
        assert!(should_poll("  ", "", today));
    }

    #[test]
    fn todays_dates_poll() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(should_poll("2024-05-01", "2024-05-01", today));
    }

    #[test]
    fn past_or_mixed_dates_do_not_poll() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(!should_poll("2024-04-01", "2024-04-30", today));
        assert!(!should_poll("2024-05-01", "", today));
        assert!(!should_poll("", "2024-05-01", today));
        assert!(!should_poll("2024-04-30", "2024-05-01", today));
    }
}
