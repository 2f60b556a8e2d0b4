//! Read-only rollups over the quota ledger and delivery log.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use courier_core::{
    ChartDay, ChartPoint, Clock, CoreError, DeliveryLogEntry, Provider, ProviderDayStats,
    ProviderId, QuotaCounter, RangeStats, RangeTotals, ServiceHealth, StatsReadModel, TodayStats,
    TotalStats,
};
use tracing::instrument;

/// Entries returned by [`StatsAggregator::recent`] when no limit is given.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Upper bound on [`StatsAggregator::recent`].
pub const MAX_RECENT_LIMIT: usize = 500;

/// Days covered by the week and chart views, including today.
pub const WINDOW_DAYS: i64 = 7;

/// Computes the stats views. Never writes.
pub struct StatsAggregator {
    read: Arc<dyn StatsReadModel>,
    providers: Vec<Provider>,
    clock: Arc<dyn Clock>,
}

impl StatsAggregator {
    /// Creates an aggregator over `providers`, reported in priority order.
    pub fn new(
        read: Arc<dyn StatsReadModel>,
        mut providers: Vec<Provider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        providers.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));
        Self {
            read,
            providers,
            clock,
        }
    }

    /// Providers in report order.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Today's per-provider usage, hourly histogram and totals.
    #[instrument(skip(self))]
    pub async fn today(&self) -> Result<TodayStats, CoreError> {
        let date = self.clock.today();
        let counters = index_by_provider(self.read.counters_for_day(date).await?);

        let providers: Vec<ProviderDayStats> = self
            .providers
            .iter()
            .map(|p| {
                let counter = counters
                    .get(&p.id)
                    .cloned()
                    .unwrap_or_else(|| QuotaCounter::zero(p.id, date));
                ProviderDayStats::from_counter(&counter, p.daily_quota, p.enabled)
            })
            .collect();

        let hourly = self.read.hourly_attempts(date).await?;
        let total = TotalStats::from_rows(&providers);

        Ok(TodayStats {
            date,
            providers,
            hourly,
            total,
        })
    }

    /// Totals over the last seven days including today.
    pub async fn week(&self) -> Result<RangeStats, CoreError> {
        let to = self.clock.today();
        self.range(to - Duration::days(WINDOW_DAYS - 1), to).await
    }

    /// Totals from the first of the current month through today.
    pub async fn month(&self) -> Result<RangeStats, CoreError> {
        let to = self.clock.today();
        let from = to.with_day(1).unwrap_or(to);
        self.range(from, to).await
    }

    /// Per-provider totals over `from..=to`, zero-filled.
    pub async fn range(&self, from: NaiveDate, to: NaiveDate) -> Result<RangeStats, CoreError> {
        let mut totals: HashMap<ProviderId, RangeTotals> = self
            .read
            .range_totals(from, to)
            .await?
            .into_iter()
            .map(|t| (t.provider, t))
            .collect();

        let providers = self
            .providers
            .iter()
            .map(|p| totals.remove(&p.id).unwrap_or_else(|| RangeTotals::zero(p.id)))
            .collect();

        Ok(RangeStats {
            from,
            to,
            providers,
        })
    }

    /// One point per provider per day for the last seven days, oldest first.
    pub async fn chart(&self) -> Result<Vec<ChartDay>, CoreError> {
        let to = self.clock.today();
        let from = to - Duration::days(WINDOW_DAYS - 1);
        let series = self.read.daily_series(from, to).await?;

        let mut by_key: HashMap<(NaiveDate, ProviderId), QuotaCounter> = series
            .into_iter()
            .map(|c| ((c.date, c.provider), c))
            .collect();

        Ok(from
            .iter_days()
            .take_while(|d| *d <= to)
            .map(|date| ChartDay {
                date,
                points: self
                    .providers
                    .iter()
                    .map(|p| match by_key.remove(&(date, p.id)) {
                        Some(c) => ChartPoint {
                            provider: p.id,
                            sent: c.attempted,
                            success: c.succeeded,
                            failed: c.failed,
                        },
                        None => ChartPoint {
                            provider: p.id,
                            sent: 0,
                            success: 0,
                            failed: 0,
                        },
                    })
                    .collect(),
            })
            .collect())
    }

    /// Most recent entries, newest first.
    ///
    /// Defaults to 20 and never returns more than 500.
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<DeliveryLogEntry>, CoreError> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .min(MAX_RECENT_LIMIT);
        self.read.recent(limit).await
    }

    /// Derived health per provider for today.
    pub async fn health(&self) -> Result<Vec<ServiceHealth>, CoreError> {
        let date = self.clock.today();
        let counters = index_by_provider(self.read.counters_for_day(date).await?);

        Ok(self
            .providers
            .iter()
            .map(|p| {
                let counter = counters
                    .get(&p.id)
                    .cloned()
                    .unwrap_or_else(|| QuotaCounter::zero(p.id, date));
                ServiceHealth::from_counter(p.enabled, p.daily_quota, &counter)
            })
            .collect())
    }
}

impl std::fmt::Debug for StatsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsAggregator")
            .field("providers", &self.providers)
            .finish_non_exhaustive()
    }
}

fn index_by_provider(counters: Vec<QuotaCounter>) -> HashMap<ProviderId, QuotaCounter> {
    counters.into_iter().map(|c| (c.provider, c)).collect()
}
