//! Run metrics via the `metrics` facade.
//!
//! Library code records through the global recorder; the binary installs
//! [`CliRecorder`] when `--metrics` is passed and prints a summary at exit.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use parking_lot::RwLock;
use presid_patch::PatchStats;

/// Which emulated routine a run executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Frame-driven free run of a player program.
    FreeRun,
    Init,
    Play,
}

impl RunKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FreeRun => "free_run",
            Self::Init => "init",
            Self::Play => "play",
        }
    }
}

// ============================================================================
// Metric descriptions
// ============================================================================

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(
        "presid_instructions_total",
        Unit::Count,
        "Total 6502 instructions stepped"
    );
    describe_counter!("presid_frames_total", Unit::Count, "Total frames played");
    describe_counter!(
        "presid_unbalanced_calls_total",
        Unit::Count,
        "Calls that left the sentinel stack cells unbalanced"
    );
    describe_counter!(
        "presid_usage_lines_total",
        Unit::Count,
        "Usage listing lines parsed"
    );

    describe_gauge!(
        "presid_changed_cells",
        Unit::Count,
        "Cells matching the reported state mask"
    );
    describe_gauge!("presid_patch_bytes", Unit::Bytes, "Encoded patch size");
    describe_gauge!(
        "presid_patch_stores",
        Unit::Count,
        "Store instructions in the patch"
    );

    describe_histogram!(
        "presid_run_duration_seconds",
        Unit::Seconds,
        "Emulation wall-clock time per run"
    );
}

// ============================================================================
// Metric recording functions
// ============================================================================

/// Record one emulation run.
pub fn record_run(kind: RunKind, steps: u64, frames: u32, elapsed: Duration) {
    let labels = [("routine", kind.as_str())];
    counter!("presid_instructions_total", &labels).increment(steps);
    if frames > 0 {
        counter!("presid_frames_total", &labels).increment(u64::from(frames));
    }
    histogram!("presid_run_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

pub fn record_unbalanced_calls(kind: RunKind, calls: u32) {
    if calls > 0 {
        counter!("presid_unbalanced_calls_total", "routine" => kind.as_str())
            .increment(u64::from(calls));
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn record_changed_cells(count: usize) {
    gauge!("presid_changed_cells").set(count as f64);
}

#[allow(clippy::cast_precision_loss)]
pub fn record_patch(stats: &PatchStats) {
    gauge!("presid_patch_bytes").set(stats.bytes as f64);
    gauge!("presid_patch_stores").set(stats.stores as f64);
}

pub fn record_usage_lines(lines: u64) {
    counter!("presid_usage_lines_total").increment(lines);
}

// ============================================================================
// CLI Recorder for terminal output
// ============================================================================

#[derive(Default)]
struct CounterStorage {
    values: RwLock<HashMap<String, u64>>,
}

#[derive(Default)]
struct GaugeStorage {
    values: RwLock<HashMap<String, f64>>,
}

#[derive(Default)]
struct HistogramStorage {
    values: RwLock<HashMap<String, Vec<f64>>>,
}

struct CliCounter {
    key: String,
    storage: Arc<CounterStorage>,
}

impl metrics::CounterFn for CliCounter {
    fn increment(&self, value: u64) {
        let mut values = self.storage.values.write();
        let slot = values.entry(self.key.clone()).or_insert(0);
        *slot = slot.saturating_add(value);
    }

    fn absolute(&self, value: u64) {
        self.storage.values.write().insert(self.key.clone(), value);
    }
}

struct CliGauge {
    key: String,
    storage: Arc<GaugeStorage>,
}

impl metrics::GaugeFn for CliGauge {
    fn increment(&self, value: f64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0.0) += value;
    }

    fn decrement(&self, value: f64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0.0) -= value;
    }

    fn set(&self, value: f64) {
        self.storage.values.write().insert(self.key.clone(), value);
    }
}

struct CliHistogram {
    key: String,
    storage: Arc<HistogramStorage>,
}

impl metrics::HistogramFn for CliHistogram {
    fn record(&self, value: f64) {
        self.storage
            .values
            .write()
            .entry(self.key.clone())
            .or_default()
            .push(value);
    }
}

/// In-memory recorder whose contents are printed at exit.
#[derive(Default)]
pub struct CliRecorder {
    counters: Arc<CounterStorage>,
    gauges: Arc<GaugeStorage>,
    histograms: Arc<HistogramStorage>,
}

impl CliRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the global recorder.
    ///
    /// Returns `None` if another recorder is already installed.
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

/// Read access to what an installed [`CliRecorder`] collected.
pub struct CliRecorderHandle {
    counters: Arc<CounterStorage>,
    gauges: Arc<GaugeStorage>,
    histograms: Arc<HistogramStorage>,
}

impl CliRecorderHandle {
    #[must_use]
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.counters.values.read().get(key).copied()
    }

    #[must_use]
    pub fn get_gauge(&self, key: &str) -> Option<f64> {
        self.gauges.values.read().get(key).copied()
    }

    /// Write the summary in markdown-ish sections, keys sorted.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    #[allow(clippy::cast_precision_loss)]
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let counters = self.counters.values.read();
        let gauges = self.gauges.values.read();
        let histograms = self.histograms.values.read();

        if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
            return writeln!(out, "No metrics collected.");
        }

        writeln!(out)?;
        writeln!(out, "## Metrics Summary")?;
        writeln!(out)?;

        if !counters.is_empty() {
            writeln!(out, "### Counters")?;
            for (key, value) in sorted(&counters) {
                writeln!(out, "  {key}: {value}")?;
            }
            writeln!(out)?;
        }

        if !gauges.is_empty() {
            writeln!(out, "### Gauges")?;
            for (key, value) in sorted(&gauges) {
                writeln!(out, "  {key}: {value:.6}")?;
            }
            writeln!(out)?;
        }

        if !histograms.is_empty() {
            writeln!(out, "### Histograms")?;
            for (key, values) in sorted(&histograms) {
                if values.is_empty() {
                    continue;
                }
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let avg = values.iter().sum::<f64>() / values.len() as f64;
                writeln!(
                    out,
                    "  {key}: count={}, min={min:.6}, max={max:.6}, avg={avg:.6}",
                    values.len()
                )?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Print the summary to stdout.
    pub fn print_summary(&self) {
        let _ = self.write_summary(&mut io::stdout().lock());
    }
}

fn sorted<V>(map: &HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
