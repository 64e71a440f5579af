use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use soundmask_core::masking::AdaptiveMaskingCalculator;
use soundmask_core::{AppConfig, MaskingConfig, MonitorEngine, NoiseColor, NoiseSynthesizer};

#[derive(Parser, Debug)]
#[command(
    name = "soundmask_cli",
    about = "Offline harness for the soundmask signal-intelligence core"
)]
struct Cli {
    /// Optional JSON configuration file (defaults apply when absent)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a seamlessly loopable colored-noise buffer to a WAV file
    Synth {
        #[arg(long, value_enum)]
        color: ColorArg,
        /// Buffer duration in seconds
        #[arg(long, default_value_t = 10.0)]
        seconds: f32,
        #[arg(long, default_value_t = 48000)]
        sample_rate: u32,
        /// Fixed RNG seed for reproducible renders
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output: PathBuf,
    },
    /// Run a WAV file through the detection pipeline, streaming events as JSON lines
    Analyze {
        #[arg(long)]
        input: PathBuf,
        /// Skip the masking recommendation printed after the event stream
        #[arg(long)]
        no_recommend: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorArg {
    White,
    Pink,
    Brown,
    Blue,
    Violet,
}

impl From<ColorArg> for NoiseColor {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::White => NoiseColor::White,
            ColorArg::Pink => NoiseColor::Pink,
            ColorArg::Brown => NoiseColor::Brown,
            ColorArg::Blue => NoiseColor::Blue,
            ColorArg::Violet => NoiseColor::Violet,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    match cli.command {
        Commands::Synth {
            color,
            seconds,
            sample_rate,
            seed,
            output,
        } => run_synth(color.into(), seconds, sample_rate, seed, &output),
        Commands::Analyze { input, no_recommend } => run_analyze(&config, &input, !no_recommend),
    }
}

fn run_synth(
    color: NoiseColor,
    seconds: f32,
    sample_rate: u32,
    seed: Option<u64>,
    output: &PathBuf,
) -> Result<ExitCode> {
    anyhow::ensure!(seconds > 0.0, "duration must be positive");
    anyhow::ensure!(sample_rate > 0, "sample rate must be positive");

    let mut synth = match seed {
        Some(seed) => NoiseSynthesizer::with_seed(seed),
        None => NoiseSynthesizer::new(),
    };
    let buffer = synth.synthesize(color, seconds, sample_rate);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(output, spec)
        .with_context(|| format!("creating {}", output.display()))?;
    for sample in &buffer {
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize().context("finalizing WAV file")?;

    tracing::info!(
        "wrote {} samples of {} noise to {}",
        buffer.len(),
        color,
        output.display()
    );
    Ok(ExitCode::from(0))
}

fn run_analyze(config: &AppConfig, input: &PathBuf, recommend: bool) -> Result<ExitCode> {
    let mut reader = hound::WavReader::open(input)
        .with_context(|| format!("opening {}", input.display()))?;
    let spec = reader.spec();
    let audio = read_mono(&mut reader)?;

    // The pipeline analyzes at the file's own rate
    let mut config = config.clone();
    config.analyser.sample_rate = spec.sample_rate;

    let mut spectrum =
        soundmask_core::analysis::SpectrumProcessor::new(config.analyser.fft_size);
    let mut engine = MonitorEngine::new(&config);

    let hop = (spec.sample_rate as u64 * config.pipeline.frame_period_ms / 1000) as usize;
    let window = config.analyser.fft_size;
    anyhow::ensure!(hop > 0, "frame period too short for sample rate");

    let mut pos = 0usize;
    while pos + window <= audio.len() {
        let timestamp_ms = pos as u64 * 1000 / spec.sample_rate as u64;
        let frame = spectrum.process(&audio[pos..pos + window]);
        for event in engine.process_frame(&frame, timestamp_ms) {
            println!("{}", serde_json::to_string(&event)?);
        }
        pos += hop;
    }

    if recommend {
        let calculator = AdaptiveMaskingCalculator::new(spec.sample_rate);
        let current = MaskingConfig::default();
        let learned = calculator.from_history(engine.history(), &current);
        let from_events = calculator.from_event_log(engine.event_log(), &current);

        println!("{}", serde_json::to_string(&learned)?);
        println!("{}", serde_json::to_string(&from_events)?);
    }

    let snapshot = soundmask_core::telemetry::hub().snapshot();
    eprintln!(
        "frames: {}, footsteps: {}, friction: {}, generic: {}",
        snapshot.frames_processed,
        snapshot.footstep_events,
        snapshot.friction_events,
        snapshot.generic_events
    );

    Ok(ExitCode::from(0))
}

/// Read a WAV file as mono f32, averaging channels
fn read_mono(reader: &mut hound::WavReader<std::io::BufReader<std::fs::File>>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    if channels == 1 {
        return Ok(interleaved);
    }
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect())
}
