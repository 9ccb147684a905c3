//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use transcribe_core::{
    require_api_key, validate_config, AudioExtractor, AudioFormat, BatchOrchestrator, Config,
    FfmpegExtractor, FsOutputWriter, JobPipeline, MediaCatalog, MediaFile, OpenAiProvider,
    ProgressObserver, RetryingTranscriptionClient, RunConfig, SanitizedConfig, TracingObserver,
};

use crate::cli::OutputArgs;
use crate::report;

/// Applies command-line overrides to the `[batch]` section.
pub fn apply_output_args(config: &mut Config, args: OutputArgs) {
    if let Some(dir) = args.output_dir {
        config.batch.output_dir = Some(dir);
    }
    if let Some(format) = args.format {
        config.batch.output_format = format;
    }
    if let Some(language) = args.language {
        config.batch.language = language;
    }
}

/// Creates the extractor and checks its tooling.
async fn ready_extractor(config: &Config) -> Result<Arc<FfmpegExtractor>> {
    let extractor = FfmpegExtractor::new(config.extractor.clone());
    extractor
        .validate()
        .await
        .context("FFmpeg is required to extract audio from video files")?;
    info!(version = ?extractor.version().await.ok(), "FFmpeg ready");
    Ok(Arc::new(extractor))
}

async fn build_pipeline(config: &Config, needs_extraction: bool) -> Result<JobPipeline> {
    require_api_key(config)?;

    let extractor: Arc<dyn AudioExtractor> = if needs_extraction {
        ready_extractor(config).await?
    } else {
        Arc::new(FfmpegExtractor::new(config.extractor.clone()))
    };

    let provider = OpenAiProvider::new(config.transcription.clone())
        .context("Failed to create transcription provider")?;
    info!(model = %config.transcription.model, "Using OpenAI transcription");

    Ok(JobPipeline::new(
        extractor,
        RetryingTranscriptionClient::new(Arc::new(provider), config.retry_policy()),
        Arc::new(FsOutputWriter::new()),
        config.pipeline_settings(),
    ))
}

/// `transcribe file`
pub async fn transcribe_file(mut config: Config, file: PathBuf, output: OutputArgs) -> Result<ExitCode> {
    apply_output_args(&mut config, output);
    validate_config(&config)?;

    let media = MediaFile::from_path(&file)
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let Some(media) = media else {
        bail!(
            "Unsupported file type: {} (supported: {})",
            file.display(),
            transcribe_core::catalog::supported_extensions().join(", ")
        );
    };

    let pipeline = build_pipeline(&config, media.kind.needs_extraction()).await?;
    let result = pipeline
        .run_file(media, config.batch.run_config(), &TracingObserver)
        .await;

    match (&result.output_path, result.success) {
        (Some(path), true) => {
            println!("Saved transcript to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            eprintln!("{}", report::render_failure(&result));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// `transcribe batch`
pub async fn transcribe_batch(
    mut config: Config,
    dir: PathBuf,
    output: OutputArgs,
    concurrency: Option<usize>,
    recursive: bool,
    skip_existing: bool,
) -> Result<ExitCode> {
    apply_output_args(&mut config, output);
    if let Some(concurrency) = concurrency {
        config.batch.concurrency = concurrency;
    }
    config.batch.recursive |= recursive;
    config.batch.skip_existing |= skip_existing;
    validate_config(&config)?;

    let files = MediaCatalog::scan(&dir, config.batch.recursive)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;
    if files.is_empty() {
        warn!(dir = %dir.display(), "No supported media files found");
        eprintln!("No supported media files found in {}", dir.display());
        return Ok(ExitCode::FAILURE);
    }

    let needs_extraction = files.iter().any(|f| f.kind.needs_extraction());
    let pipeline = build_pipeline(&config, needs_extraction).await?;
    let orchestrator = BatchOrchestrator::new(Arc::new(pipeline), config.batch.concurrency)?;

    println!(
        "Transcribing {} file(s) from {} with concurrency {}",
        files.len(),
        dir.display(),
        config.batch.concurrency
    );

    // Unbounded: the printer is the only consumer and every event becomes a line.
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(report::print_progress(rx, files.len(), std::io::stdout()));
    let observer: Arc<dyn ProgressObserver> = Arc::new(tx);

    let summary = orchestrator
        .run(files, config.batch.run_config(), observer)
        .await?;
    let _ = printer.await;

    println!();
    print!("{}", report::render_summary(&summary));

    if summary.failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// `transcribe extract`
pub async fn extract_audio(
    config: Config,
    file: PathBuf,
    output: Option<PathBuf>,
    format: Option<AudioFormat>,
) -> Result<ExitCode> {
    let format = format.unwrap_or(config.extractor.audio_format);
    let output = output.unwrap_or_else(|| file.with_extension(format.extension()));
    if same_file(&file, &output) {
        bail!(
            "Output would overwrite the input: {} (pass --output)",
            output.display()
        );
    }

    let extractor = ready_extractor(&config).await?;
    let result = extractor
        .extract(&file, &output, format)
        .await
        .with_context(|| format!("Failed to extract audio from {}", file.display()))?;

    println!(
        "Extracted {} of audio to {}",
        result.size_display(),
        result.output_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// `transcribe config`
pub fn show_config(config: &Config) -> Result<ExitCode> {
    let rendered = toml::to_string_pretty(&SanitizedConfig::from(config))
        .context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(ExitCode::SUCCESS)
}
