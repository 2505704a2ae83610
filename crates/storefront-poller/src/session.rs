//! Console session: the single owner of the aggregate tree.
//!
//! Fetch tasks run independently and post a [`StatsCompletion`] to one
//! channel. The session drains that channel and applies completions one at
//! a time (instance, region, fleet, presenter), so the tree is never
//! touched concurrently and needs no lock.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use storefront_core::completion::apply_completion;
use storefront_core::global_aggregator::{recalculate, GlobalSummary};
use storefront_core::model::{InstanceKey, RegionData};
use storefront_core::presenter::{present, DashboardView};
use storefront_core::refresh_pass::begin_refresh_pass;
use storefront_core::stats::StatsCompletion;

use crate::fetcher::{fetch_or_sentinel, stats_url, StatFetcher};
use crate::logging::Logger;

/// Receives every view the session produces.
pub trait DashboardSink {
    fn publish(&mut self, view: &DashboardView);
}

/// Outcome of a pass run to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub requested: usize,
    pub summary: GlobalSummary,
}

pub struct ConsoleSession {
    data: RegionData,
    summary: GlobalSummary,
    fetcher: Arc<dyn StatFetcher>,
    stats_path: String,
    logger: Logger,
    completions_tx: mpsc::UnboundedSender<StatsCompletion>,
    completions_rx: mpsc::UnboundedReceiver<StatsCompletion>,
}

impl ConsoleSession {
    pub fn new(
        mut data: RegionData,
        fetcher: Arc<dyn StatFetcher>,
        stats_path: impl Into<String>,
        logger: Logger,
    ) -> Self {
        let summary = recalculate(&mut data);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            data,
            summary,
            fetcher,
            stats_path: stats_path.into(),
            logger: logger.component("session"),
            completions_tx,
            completions_rx,
        }
    }

    pub fn data(&self) -> &RegionData {
        &self.data
    }

    pub fn summary(&self) -> &GlobalSummary {
        &self.summary
    }

    pub fn view(&self) -> DashboardView {
        present(&self.data, &self.summary)
    }

    /// Starts a refresh pass: marks idle instances refreshing and spawns
    /// one fetch task for each. Must be called from within a tokio runtime.
    pub fn start_pass(&mut self) -> usize {
        let keys = begin_refresh_pass(&mut self.data);
        self.summary = recalculate(&mut self.data);
        let requested = keys.len().to_string();
        let in_flight = self
            .data
            .outstanding_requests()
            .saturating_sub(keys.len())
            .to_string();
        self.logger.info_with(
            "refresh pass started",
            &[
                ("requested", requested.as_str()),
                ("still_in_flight", in_flight.as_str()),
            ],
        );
        for key in &keys {
            self.spawn_fetch(*key);
        }
        keys.len()
    }

    fn spawn_fetch(&self, key: InstanceKey) {
        let (Some(region), Some(instance)) = (
            self.data.regions.get(key.region),
            self.data.instance(key),
        ) else {
            return;
        };
        let url = stats_url(&instance.url, &self.stats_path);
        let logger = self
            .logger
            .with_region(&region.region_name)
            .with_instance(&instance.uuid);
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.completions_tx.clone();

        logger.trace("stats requested");
        tokio::spawn(async move {
            let outcome = fetch_or_sentinel(fetcher.as_ref(), &url, &logger).await;
            // The session may already be gone; the result is then abandoned.
            let _ = tx.send(StatsCompletion { key, outcome });
        });
    }

    /// Applies one completion and publishes the resulting view.
    pub fn apply(&mut self, completion: StatsCompletion, sink: &mut dyn DashboardSink) {
        let key = completion.key;
        let responded = completion.outcome.responded;
        match apply_completion(&mut self.data, completion) {
            Ok(summary) => {
                self.summary = summary;
                if let Some(instance) = self.data.instance(key) {
                    self.logger.debug_with(
                        "completion applied",
                        &[
                            ("instance", instance.uuid.as_str()),
                            ("responded", if responded { "true" } else { "false" }),
                        ],
                    );
                }
                sink.publish(&self.view());
            }
            Err(err) => self.logger.warn(err.to_string().as_str()),
        }
    }

    /// One pass, the way a page load works: request every idle instance,
    /// then apply completions until none is outstanding.
    pub async fn run_once(&mut self, sink: &mut dyn DashboardSink) -> PassReport {
        let requested = self.start_pass();
        sink.publish(&self.view());

        while self.data.outstanding_requests() > 0 {
            let Some(completion) = self.completions_rx.recv().await else {
                break;
            };
            self.apply(completion, sink);
        }

        self.log_pass_finished();
        PassReport {
            requested,
            summary: self.summary.clone(),
        }
    }

    /// Starts a pass every `interval` until `shutdown` resolves. A tick
    /// that fires late is delayed rather than replayed. Instances still in
    /// flight are not requested again.
    pub async fn run_watch<S>(
        &mut self,
        interval: Duration,
        sink: &mut dyn DashboardSink,
        shutdown: S,
    ) where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes: u64 = 0;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    let passes = passes.to_string();
                    self.logger.info_with("watch stopped", &[("passes", passes.as_str())]);
                    break;
                }
                _ = ticker.tick() => {
                    self.start_pass();
                    passes = passes.saturating_add(1);
                    sink.publish(&self.view());
                }
                Some(completion) = self.completions_rx.recv() => {
                    self.apply(completion, sink);
                    if self.data.outstanding_requests() == 0 {
                        self.log_pass_finished();
                    }
                }
            }
        }
    }

    fn log_pass_finished(&self) {
        let tally = self.summary.instances;
        let users = &self.summary.users;
        let active = tally.active.to_string();
        let heavy_load = tally.heavy_load.to_string();
        let not_responding = tally.not_responding.to_string();
        let simulated = users.total_simulated_users.to_string();
        let real = users.total_real_users.to_string();
        self.logger.info_with(
            "refresh pass finished",
            &[
                ("active", active.as_str()),
                ("heavy_load", heavy_load.as_str()),
                ("not_responding", not_responding.as_str()),
                ("simulated_users", simulated.as_str()),
                ("real_users", real.as_str()),
            ],
        );
    }
}

/// Sink that keeps only the latest view.
#[derive(Debug, Default)]
pub struct LatestViewSink {
    pub latest: Option<DashboardView>,
    pub published: usize,
}

impl DashboardSink for LatestViewSink {
    fn publish(&mut self, view: &DashboardView) {
        self.latest = Some(view.clone());
        self.published += 1;
    }
}
