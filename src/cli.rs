use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bandlight",
    about = "Drives a three-LED low/mid/high indicator from the dominant frequency of a looping sample table"
)]
pub struct Cli {
    /// Audio file to cut the sample table from (WAV, MP3, FLAC, OGG)
    pub input: Option<PathBuf>,

    /// Use a synthetic sine at this frequency (Hz) instead of a file
    #[arg(long, conflicts_with_all = ["input", "silence"])]
    pub tone: Option<f32>,

    /// Use an all-zero sample table
    #[arg(long, conflicts_with = "input")]
    pub silence: bool,

    /// Sample rate of synthetic tables
    #[arg(long, default_value_t = 44100)]
    pub sample_rate: u32,

    /// Length of synthetic tables in samples
    #[arg(long, default_value_t = 44100)]
    pub source_len: usize,

    /// Samples per analysis frame (power of two)
    #[arg(long, default_value_t = 1024)]
    pub frame_size: usize,

    /// Pause between cycles in milliseconds
    #[arg(long, default_value_t = 50)]
    pub interval_ms: u64,

    /// Stop after this many cycles instead of running until interrupted
    #[arg(long)]
    pub cycles: Option<usize>,

    /// Forward transform implementation
    #[arg(long, value_enum, default_value_t = TransformKind::Rustfft)]
    pub transform: TransformKind,

    /// Offset into the input file where the table starts, in seconds
    #[arg(long, default_value_t = 10.0)]
    pub segment_start: f32,

    /// Length of the table cut from the input file, in seconds
    #[arg(long, default_value_t = 1.0)]
    pub segment_duration: f32,

    /// Write the sample table as a C array to this path and exit
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Array name used by --export
    #[arg(long, default_value = "sound_samples")]
    pub export_name: String,

    /// Print the run summary as JSON (with --cycles)
    #[arg(long)]
    pub summary_json: bool,

    /// Config file (defaults to bandlight.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformKind {
    /// Planned rustfft FFT
    Rustfft,
    /// Radix-2 FFT over an explicit twiddle table
    Reference,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["bandlight"]).unwrap();
        assert!(cli.input.is_none());
        assert_eq!(cli.frame_size, 1024);
        assert_eq!(cli.interval_ms, 50);
        assert_eq!(cli.sample_rate, 44100);
        assert_eq!(cli.transform, TransformKind::Rustfft);
        assert_eq!(cli.cycles, None);
        assert_eq!(cli.export_name, "sound_samples");
    }

    #[test]
    fn tone_run() {
        let cli = Cli::try_parse_from([
            "bandlight",
            "--tone",
            "3000",
            "--cycles",
            "20",
            "--transform",
            "reference",
            "--summary-json",
        ])
        .unwrap();
        assert_eq!(cli.tone, Some(3000.0));
        assert_eq!(cli.cycles, Some(20));
        assert_eq!(cli.transform, TransformKind::Reference);
        assert!(cli.summary_json);
    }

    #[test]
    fn tone_conflicts_with_input_and_silence() {
        assert!(Cli::try_parse_from(["bandlight", "song.wav", "--tone", "440"]).is_err());
        assert!(Cli::try_parse_from(["bandlight", "--silence", "--tone", "440"]).is_err());
        assert!(Cli::try_parse_from(["bandlight", "song.wav", "--silence"]).is_err());
    }
}
