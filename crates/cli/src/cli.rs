//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use transcribe_core::{AudioFormat, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "transcribe", author, version)]
#[command(about = "Batch transcription of audio and video files")]
pub struct Cli {
    /// Configuration file (defaults to ./transcribe.toml when present)
    #[arg(long, global = true, env = "TRANSCRIBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transcribe a single audio or video file
    File {
        /// Input media file
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Transcribe every supported file in a directory
    Batch {
        /// Input directory
        dir: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Maximum files processed at once (1-20)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Skip files whose transcript already exists
        #[arg(long)]
        skip_existing: bool,
    },
    /// Extract the audio track of a video file
    Extract {
        /// Input media file
        file: PathBuf,

        /// Output audio file (defaults to the input with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Audio format (mp3 or wav)
        #[arg(short, long)]
        format: Option<AudioFormat>,
    },
    /// Print the effective configuration with secrets redacted
    Config,
}

/// Output options shared by `file` and `batch`.
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Directory for transcripts (defaults to next to each input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Transcript format (txt or srt)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Language code, or "auto" to detect
    #[arg(short, long)]
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch() {
        let cli = Cli::try_parse_from([
            "transcribe", "batch", "/media", "-c", "4", "-r", "-f", "srt", "--skip-existing",
        ])
        .unwrap();

        match cli.command {
            Command::Batch {
                dir,
                output,
                concurrency,
                recursive,
                skip_existing,
            } => {
                assert_eq!(dir, PathBuf::from("/media"));
                assert_eq!(concurrency, Some(4));
                assert!(recursive);
                assert!(skip_existing);
                assert_eq!(output.format, Some(OutputFormat::Srt));
                assert!(output.output_dir.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_file_with_globals() {
        let cli = Cli::try_parse_from([
            "transcribe", "file", "talk.mkv", "-l", "de", "--verbose", "--config", "t.toml",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("t.toml")));
        assert!(matches!(
            cli.command,
            Command::File { ref output, .. } if output.language.as_deref() == Some("de")
        ));
    }

    #[test]
    fn test_parse_extract_format() {
        let cli = Cli::try_parse_from(["transcribe", "extract", "a.mp4", "-f", "wav"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Extract { format: Some(AudioFormat::Wav), .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["transcribe", "file", "a.mp3", "-f", "docx"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["transcribe", "-v", "-q", "config"]).is_err());
    }
}
