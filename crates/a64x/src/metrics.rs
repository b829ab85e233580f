//! Lift metrics using metrics-rs.
//!
//! Every dispatch decision bumps `a64x_lift_total{mnemonic,outcome}`. With no
//! recorder installed the macros are no-ops; the CLI installs
//! [`CliRecorder`] to print a summary at exit.

use std::sync::Arc;

use a64x_isa::Mnemonic;
use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

pub const LIFT_TOTAL: &str = "a64x_lift_total";
pub const FRAGMENT_LEN: &str = "a64x_fragment_instructions";
pub const REGION_LIFTED_RATIO: &str = "a64x_region_lifted_ratio";

/// Outcome of one dispatch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiftResult {
    /// A lifter emitted IL.
    Lifted,
    /// A lifter exists but declined; the base lifted instead.
    Rejected,
    /// No lifter for the mnemonic; the base lifted instead.
    Unsupported,
    /// The bytes did not decode; the base got the whole buffer.
    Undecoded,
}

impl LiftResult {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lifted => "lifted",
            Self::Rejected => "rejected",
            Self::Unsupported => "unsupported",
            Self::Undecoded => "undecoded",
        }
    }
}

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(
        LIFT_TOTAL,
        Unit::Count,
        "Instructions seen by the extension, by mnemonic and outcome"
    );
    describe_histogram!(
        FRAGMENT_LEN,
        Unit::Count,
        "IL instructions emitted per lifted instruction"
    );
    describe_gauge!(
        REGION_LIFTED_RATIO,
        Unit::Count,
        "Fraction of a region's instructions that produced IL (0-1)"
    );
}

/// Record one dispatch decision.
pub fn record_lift(mnemonic: Option<Mnemonic>, result: LiftResult) {
    let mnemonic = mnemonic.map_or("none", Mnemonic::name);
    counter!(LIFT_TOTAL, "mnemonic" => mnemonic, "outcome" => result.as_str()).increment(1);
}

/// Record the size of an emitted fragment.
#[allow(clippy::cast_precision_loss)]
pub fn record_fragment(mnemonic: Mnemonic, len: usize) {
    histogram!(FRAGMENT_LEN, "mnemonic" => mnemonic.name()).record(len as f64);
}

/// Record how much of a region produced IL.
#[allow(clippy::cast_precision_loss)]
pub fn record_region(total: usize, lifted: usize) {
    if total > 0 {
        gauge!(REGION_LIFTED_RATIO).set(lifted as f64 / total as f64);
    }
}

// ============================================================================
// CLI Recorder for terminal output
// ============================================================================

type Storage<T> = Arc<RwLock<FxHashMap<String, T>>>;

struct CliCounter {
    key: String,
    storage: Storage<u64>,
}

impl metrics::CounterFn for CliCounter {
    fn increment(&self, value: u64) {
        *self.storage.write().entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        self.storage.write().insert(self.key.clone(), value);
    }
}

struct CliGauge {
    key: String,
    storage: Storage<f64>,
}

impl metrics::GaugeFn for CliGauge {
    fn increment(&self, value: f64) {
        *self.storage.write().entry(self.key.clone()).or_insert(0.0) += value;
    }

    fn decrement(&self, value: f64) {
        *self.storage.write().entry(self.key.clone()).or_insert(0.0) -= value;
    }

    fn set(&self, value: f64) {
        self.storage.write().insert(self.key.clone(), value);
    }
}

struct CliHistogram {
    key: String,
    storage: Storage<Vec<f64>>,
}

impl metrics::HistogramFn for CliHistogram {
    fn record(&self, value: f64) {
        self.storage.write().entry(self.key.clone()).or_default().push(value);
    }
}

/// In-memory recorder that can print a summary for CLI usage.
#[derive(Default)]
pub struct CliRecorder {
    counters: Storage<u64>,
    gauges: Storage<f64>,
    histograms: Storage<Vec<f64>>,
}

impl CliRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the global recorder. Returns `None` if one is already set.
    #[must_use]
    pub fn install(self) -> Option<CliRecorderHandle> {
        let handle = self.handle();
        metrics::set_global_recorder(self).ok()?;
        Some(handle)
    }

    fn handle(&self) -> CliRecorderHandle {
        CliRecorderHandle {
            counters: Arc::clone(&self.counters),
            gauges: Arc::clone(&self.gauges),
            histograms: Arc::clone(&self.histograms),
        }
    }
}

fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for CliRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CliCounter {
            key: key_to_string(key),
            storage: Arc::clone(&self.counters),
        }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(CliGauge {
            key: key_to_string(key),
            storage: Arc::clone(&self.gauges),
        }))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(CliHistogram {
            key: key_to_string(key),
            storage: Arc::clone(&self.histograms),
        }))
    }
}

/// Handle for reading metrics after installing the CLI recorder.
pub struct CliRecorderHandle {
    counters: Storage<u64>,
    gauges: Storage<f64>,
    histograms: Storage<Vec<f64>>,
}

impl CliRecorderHandle {
    #[must_use]
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.counters.read().get(key).copied()
    }

    #[must_use]
    pub fn get_gauge(&self, key: &str) -> Option<f64> {
        self.gauges.read().get(key).copied()
    }

    #[must_use]
    pub fn get_histogram(&self, key: &str) -> Option<Vec<f64>> {
        self.histograms.read().get(key).cloned()
    }

    /// Render all collected metrics, sorted by key.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self) -> String {
        use std::fmt::Write;

        let counters = self.counters.read();
        let gauges = self.gauges.read();
        let histograms = self.histograms.read();
        if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
            return "No metrics collected.\n".to_string();
        }

        let mut out = String::from("\n## Metrics Summary\n\n");
        if !counters.is_empty() {
            out.push_str("### Counters\n");
            for (key, value) in sorted(&counters) {
                let _ = writeln!(out, "  {key}: {value}");
            }
            out.push('\n');
        }
        if !gauges.is_empty() {
            out.push_str("### Gauges\n");
            for (key, value) in sorted(&gauges) {
                let _ = writeln!(out, "  {key}: {value:.6}");
            }
            out.push('\n');
        }
        if !histograms.is_empty() {
            out.push_str("### Histograms\n");
            for (key, values) in sorted(&histograms) {
                if values.is_empty() {
                    continue;
                }
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let avg = values.iter().sum::<f64>() / values.len() as f64;
                let _ = writeln!(
                    out,
                    "  {key}: count={}, min={min:.2}, max={max:.2}, avg={avg:.2}",
                    values.len()
                );
            }
            out.push('\n');
        }
        out
    }

    pub fn print_summary(&self) {
        print!("{}", self.summary());
    }
}

fn sorted<T>(map: &FxHashMap<String, T>) -> Vec<(&String, &T)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
