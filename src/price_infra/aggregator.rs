use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use futures_util::FutureExt;
use serde_json::{json, Map, Value};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;
use crate::error::{Error, Result};
use crate::observability::events::{
    with_context, EventSink, TracingEventSink, PRICE_ARBITRATION_DONE, PRICE_SOURCE_DONE,
};
use crate::observability::metrics::{record_arbitration, record_source_call};
use crate::observability::tracing::trace_item_check;
use crate::price_infra::arbitrator::arbitrate;
use crate::price_infra::enabled::{EnabledSources, EnabledState};
use crate::price_infra::normalizer::normalize_row;
use crate::price_infra::sources::PriceSource;
use crate::types::row::{PriceRow, RawRow};

pub const DEFAULT_MAX_WORKERS: usize = 8;
pub const ARBITRATED_SOURCE: &str = "arbitrated";

/// Invoked with the full enabled-state after every `set_enabled_state`.
pub type EnabledStateCallback = Box<dyn Fn(&EnabledState) -> Result<()> + Send + Sync>;

type SourceOutcome = std::result::Result<Result<Vec<RawRow>>, Box<dyn Any + Send>>;

/// Fans an item check out to every enabled price source and merges the
/// normalized rows, optionally prepending one arbitrated best row.
pub struct MultiSourcePriceService {
    sources: Vec<Arc<dyn PriceSource>>,
    enabled: RwLock<EnabledSources>,
    max_workers: usize,
    arbitration_enabled: bool,
    log_context: Map<String, Value>,
    event_sink: Arc<dyn EventSink>,
    on_enabled_change: Option<EnabledStateCallback>,
}

impl MultiSourcePriceService {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::NoSources);
        }

        let names: Vec<String> = sources.iter().map(|s| s.name().to_string()).collect();
        let max_workers = DEFAULT_MAX_WORKERS.min(sources.len());

        Ok(MultiSourcePriceService {
            enabled: RwLock::new(EnabledSources::all(&names)),
            sources,
            max_workers,
            arbitration_enabled: false,
            log_context: Map::new(),
            event_sink: Arc::new(TracingEventSink),
            on_enabled_change: None,
        })
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_arbitration(mut self, enabled: bool) -> Self {
        self.arbitration_enabled = enabled;
        self
    }

    /// Static fields merged into every structured event.
    pub fn with_log_context(mut self, context: Map<String, Value>) -> Self {
        self.log_context = context;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Restores a previously persisted state. Does not fire the callback.
    pub fn with_enabled_state(self, state: &EnabledState) -> Self {
        self.write_enabled().apply(state);
        self
    }

    pub fn on_enabled_change(mut self, callback: EnabledStateCallback) -> Self {
        self.on_enabled_change = Some(callback);
        self
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn arbitration_enabled(&self) -> bool {
        self.arbitration_enabled
    }

    pub fn get_enabled_state(&self) -> EnabledState {
        self.read_enabled().state()
    }

    /// Sources mapped to `false` are disabled, everything else is enabled.
    /// Disabling every source re-enables all of them instead.
    pub fn set_enabled_state(&self, requested: &EnabledState) {
        let state = {
            let mut enabled = self.write_enabled();
            if enabled.apply(requested) {
                tracing::warn!("Enabled-source update would disable every source; enabling all");
            }
            enabled.state()
        };
        tracing::info!(?state, "Price sources enabled-state updated");

        if let Some(callback) = &self.on_enabled_change {
            match catch_unwind(AssertUnwindSafe(|| callback(&state))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Enabled-state callback failed: {}", e),
                Err(panic) => tracing::error!(
                    "Enabled-state callback panicked: {}",
                    panic_message(panic.as_ref())
                ),
            }
        }
    }

    /// Checks `text` against every enabled source.
    ///
    /// Never fails: a source that errors or panics contributes no rows.
    pub async fn check_item(&self, text: &str) -> Vec<PriceRow> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let active: Vec<Arc<dyn PriceSource>> = {
            let enabled = self.read_enabled();
            self.sources
                .iter()
                .filter(|s| enabled.is_enabled(s.name()))
                .cloned()
                .collect()
        };
        if active.is_empty() {
            return Vec::new();
        }

        let span = trace_item_check(text.len(), active.len());
        async {
            let mut rows = self.fan_out(&active, text).await;

            if self.arbitration_enabled {
                let priority: Vec<String> = active.iter().map(|s| s.name().to_string()).collect();
                if let Some(winner) = self.arbitrate_rows(&rows, &priority) {
                    rows.insert(0, winner);
                }
            }
            rows
        }
        .instrument(span)
        .await
    }

    async fn fan_out(&self, active: &[Arc<dyn PriceSource>], text: &str) -> Vec<PriceRow> {
        let text: Arc<str> = Arc::from(text);
        // One pool per call: concurrent calls never queue behind each other
        let workers = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for source in active {
            let source = Arc::clone(source);
            let text = Arc::clone(&text);
            let workers = Arc::clone(&workers);

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition cannot fail
                let _permit = workers.acquire_owned().await.ok();
                let started = Instant::now();
                let outcome: SourceOutcome = AssertUnwindSafe(async { source.check_item(&text).await })
                    .catch_unwind()
                    .await;
                (source, outcome, started.elapsed())
            });
        }

        let mut rows = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (source, outcome, elapsed) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!("Price source task aborted: {}", e);
                    continue;
                }
            };
            let name = source.name();

            let (ok, raw_rows) = match outcome {
                Ok(Ok(raw_rows)) => (true, raw_rows),
                Ok(Err(e)) => {
                    tracing::warn!(source = name, elapsed_ms = elapsed.as_millis() as u64, "Price source failed: {}", e);
                    (false, Vec::new())
                }
                Err(panic) => {
                    tracing::error!(
                        source = name,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Price source panicked: {}",
                        panic_message(panic.as_ref())
                    );
                    (false, Vec::new())
                }
            };

            self.report_source_done(name, elapsed, ok, raw_rows.len());

            rows.extend(raw_rows.iter().map(|raw| {
                let mut row = normalize_row(raw);
                if row.source.trim().is_empty() {
                    row.source = name.to_string();
                }
                row
            }));
        }
        rows
    }

    fn arbitrate_rows(&self, rows: &[PriceRow], priority: &[String]) -> Option<PriceRow> {
        let winner = match catch_unwind(AssertUnwindSafe(|| arbitrate(rows, priority))) {
            Ok(winner) => winner,
            Err(panic) => {
                tracing::error!("Arbitration failed: {}", panic_message(panic.as_ref()));
                record_arbitration("failed");
                return None;
            }
        };

        let Some(mut chosen) = winner else {
            record_arbitration("no_winner");
            return None;
        };
        if chosen.source.trim().is_empty() {
            chosen.source = ARBITRATED_SOURCE.to_string();
        }
        chosen.is_arbitrated = true;

        record_arbitration("chosen");
        self.emit(
            PRICE_ARBITRATION_DONE,
            json!({
                "chosen_source": chosen.source,
                "chosen_chaos": chosen.chaos_value,
                "is_arbitrated": true,
            }),
        );
        Some(chosen)
    }

    fn report_source_done(&self, name: &str, elapsed: Duration, ok: bool, row_count: usize) {
        record_source_call(name, ok, elapsed.as_secs_f64());
        self.emit(
            PRICE_SOURCE_DONE,
            json!({
                "source": name,
                "duration_ms": elapsed.as_secs_f64() * 1000.0,
                "ok": ok,
                "row_count": row_count,
            }),
        );
    }

    fn emit(&self, event: &str, extras: Value) {
        let Value::Object(extras) = extras else {
            return;
        };
        let fields = with_context(&self.log_context, extras);
        if catch_unwind(AssertUnwindSafe(|| self.event_sink.emit(event, &fields))).is_err() {
            tracing::warn!("Event sink panicked while emitting {}", event);
        }
    }

    fn read_enabled(&self) -> RwLockReadGuard<'_, EnabledSources> {
        self.enabled.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_enabled(&self) -> RwLockWriteGuard<'_, EnabledSources> {
        self.enabled.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
