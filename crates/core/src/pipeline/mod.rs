//! Batch transcription pipeline.
//!
//! A [`JobPipeline`] takes one media file through extraction (video only),
//! a payload size check, transcription with retry, and output. The
//! [`BatchOrchestrator`] runs many jobs as tokio tasks, bounded by a
//! [`ConcurrencyGate`], and folds their results into a [`BatchSummary`].
//!
//! # Example
//!
//! ```ignore
//! use transcribe_core::pipeline::{BatchOrchestrator, JobPipeline, RunConfig, TracingObserver};
//!
//! let orchestrator = BatchOrchestrator::new(Arc::new(pipeline), 4)?;
//! let summary = orchestrator
//!     .process_directory(Path::new("/recordings"), true, RunConfig::default(), Arc::new(TracingObserver))
//!     .await?;
//! println!("{}/{} transcribed", summary.successful, summary.total_files);
//! ```

mod batch;
mod config;
mod gate;
mod job;
mod progress;
mod types;

pub use batch::{BatchError, BatchOrchestrator};
pub use config::{BatchConfig, PipelineSettings};
pub use gate::{
    ConcurrencyGate, GateError, GatePermit, GateStats, MAX_CONCURRENCY, MIN_CONCURRENCY,
};
pub use job::JobPipeline;
pub use progress::{NoopObserver, ProgressObserver, TracingObserver};
pub use types::{
    BatchSummary, Job, JobResult, JobStage, ProgressEvent, ProgressStatus, RunConfig,
};
