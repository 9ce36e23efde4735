use std::sync::OnceLock;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload. Only the first call installs a
/// recorder; later calls reuse it, so tests can build the app repeatedly
/// inside one process.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            // Pre-register counters so they appear even before the first increment.
            counter!("markets_created_total").absolute(0);
            counter!("markets_resolved_total").absolute(0);
            counter!("markets_cancelled_total").absolute(0);
            counter!("bets_placed_total").absolute(0);
            counter!("bets_rejected_total").absolute(0);
            counter!("rewards_claimed_total").absolute(0);

            // Pre-register gauges at zero.
            gauge!("markets_active").set(0.0);

            // Histogram is lazily created on first record; force creation.
            histogram!("bet_amount").record(0.0);

            handle
        })
        .clone()
}
