pub mod catalog;
pub mod config;
pub mod extractor;
pub mod output;
pub mod pipeline;
pub mod testing;
pub mod transcription;

pub use catalog::{CatalogError, MediaCatalog, MediaFile, MediaKind};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, require_api_key, validate_config,
    Config, ConfigError, SanitizedConfig,
};
pub use extractor::{AudioExtractor, AudioFormat, ExtractorConfig, ExtractorError, FfmpegExtractor};
pub use output::{FsOutputWriter, OutputError, OutputFormat, OutputWriter};
pub use pipeline::{
    BatchConfig, BatchError, BatchOrchestrator, BatchSummary, ConcurrencyGate, GateError,
    JobPipeline, JobResult, JobStage, NoopObserver, PipelineSettings, ProgressEvent,
    ProgressObserver, ProgressStatus, RunConfig, TracingObserver,
};
pub use transcription::{
    OpenAiProvider, ProviderConfig, RetryConfig, RetryPolicy, RetryingTranscriptionClient,
    TranscriptionError, TranscriptionProvider, TranscriptionResult,
};
