//! nanobench Core Library
//!
//! Lightweight CPU and memory micro-benchmarking. A [`Harness`] runs a task
//! through warm-up and measured iterations, times each one and feeds the
//! records to the active aggregators, which report average time, total time,
//! throughput, memory usage or task-reported byte counts once per labelled
//! run.
//!
//! ```no_run
//! use nanobench_core::Harness;
//!
//! let mut bench = Harness::new();
//! bench.measurements(50).warm_ups(20).cpu_only();
//! bench
//!     .measure("new_string", || {
//!         let list: Vec<String> = (0..10_000).map(|i| i.to_string()).collect();
//!         std::hint::black_box(list);
//!     })
//!     .unwrap();
//! println!("avg: {:.4} ms", bench.avg_time().unwrap());
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod executor;
pub mod harness;
pub mod host;
pub mod record;
pub mod report;
pub mod sink;
pub mod task;
pub mod types;

// Re-export commonly used types
pub use aggregator::{
    Aggregator, AggregatorSet, BytesStats, CpuStats, Formatters, MemoryStats,
};
pub use config::{Config, ConfigLoader, HarnessConfig, ReportConfig, MAX_SETTLE_DELAY_MS};
pub use error::{BenchError, BenchResult, HostError, ValidationError};
pub use executor::RunExecutor;
pub use harness::Harness;
pub use host::{FakeHost, HostRuntime, SystemHost};
pub use record::RunRecord;
pub use report::{BenchmarkReport, BenchmarkResult, JsonReporter, SystemInfo};
pub use sink::{CollectingSink, ReportSink, TracingSink};
pub use task::{bytes_task, ByteTask, ProducesBytes, Task};
pub use types::{Label, MetricKind, Phase, Preset, Timestamp, WARMUP_LABEL};
