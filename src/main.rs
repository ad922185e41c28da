use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fingerspell_gateway::config::Overrides;
use fingerspell_gateway::{Config, Daemon, Surface, speech, vision};

/// Fingerspell - sign-language letter recognition and speech gateway
#[derive(Parser)]
#[command(name = "fingerspell", version, about)]
struct Cli {
    /// Route set to serve: combined, asl or tts
    #[arg(short, long, env = "FINGERSPELL_SURFACE")]
    surface: Option<Surface>,

    /// Port to listen on (default 5000, or 5001 for tts)
    #[arg(short, long, env = "FINGERSPELL_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "FINGERSPELL_BIND")]
    bind: Option<String>,

    /// Config file (default ~/.config/fingerspell/config.toml)
    #[arg(short, long, env = "FINGERSPELL_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize text to a local WAV file
    Synthesize {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
        /// Output file
        #[arg(short, long, default_value = "speech.wav")]
        output: PathBuf,
    },
    /// Run the recognition pipeline on an image file
    ClassifyImage {
        /// Image path (PNG, JPEG, WebP or BMP)
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,fingerspell_gateway=info",
        1 => "info,fingerspell_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = Overrides {
        surface: cli.surface,
        port: cli.port,
        bind: cli.bind,
        config_path: cli.config,
    };
    let config = Config::load(&overrides)?;
    tracing::debug!(?config, "loaded configuration");

    let daemon = Daemon::new(config);

    match cli.command {
        Some(Command::Synthesize { text, output }) => synthesize(&daemon, &text, &output).await,
        Some(Command::ClassifyImage { path }) => classify_image(&daemon, &path).await,
        None => {
            daemon.run().await?;
            Ok(())
        }
    }
}

/// Speak text through the configured synthesizer and write one WAV file
async fn synthesize(daemon: &Daemon, text: &str, output: &std::path::Path) -> anyhow::Result<()> {
    let service = daemon.init_speech()?;
    let sample_rate = service.store().sample_rate();

    println!("Synthesizing: \"{text}\"");
    let chunks = service.synthesizer().synthesize(text, service.voice()).await?;
    let samples = speech::concatenate(&chunks);
    if samples.is_empty() {
        anyhow::bail!("synthesizer produced no audio");
    }

    let wav = speech::samples_to_wav(&samples, sample_rate)?;
    tokio::fs::write(output, wav).await?;

    #[allow(clippy::cast_precision_loss)]
    let seconds = samples.len() as f32 / sample_rate as f32;
    println!(
        "Wrote {} ({} chunks, {seconds:.2}s)",
        output.display(),
        chunks.len()
    );
    Ok(())
}

/// Recognize the letter shown in a single image
async fn classify_image(daemon: &Daemon, path: &std::path::Path) -> anyhow::Result<()> {
    let recognizer = daemon.init_recognizer()?;

    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let frame = vision::Frame::from_rgb(width, height, rgb.into_raw())?;

    let result = tokio::task::spawn_blocking(move || recognizer.recognize(&frame)).await??;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
