mod console;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use neozones_core::{
    AnimationKind, Animator, Base64Codec, CmdResult, Command, Container, ManualClock, NeoPixels,
    Rgbw, StripConfig,
};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleStrip;

fn main() -> neozones_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Send { messages } => run_send(&config, &messages),
        Commands::Replay {
            script,
            frames,
            frame_ms,
        } => run_replay(&config, &script, frames, frame_ms),
        Commands::EncodeZone(zone) => run_encode_zone(&config, &zone),
    }
}

fn load_config(path: Option<&Path>) -> neozones_core::Result<StripConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading strip configuration");
            StripConfig::from_path(path)
        }
        None => Ok(StripConfig::default()),
    }
}

fn run_send(config: &StripConfig, messages: &[String]) -> neozones_core::Result<()> {
    let driver = ConsoleStrip::new(usize::from(config.pixel_count), config.color_feature);
    let mut pixels = NeoPixels::from_config(driver, config)?;

    for message in messages {
        let reply = pixels.b64_command(message);
        print_reply(message, &reply);
    }
    pixels.update()
}

fn run_replay(
    config: &StripConfig,
    script: &Path,
    frames: usize,
    frame_ms: u64,
) -> neozones_core::Result<()> {
    tracing::info!(?script, frames, frame_ms, "replaying command script");

    let clock = ManualClock::new();
    let animator = Animator::new(
        clock.clone(),
        usize::from(config.max_animations),
        Duration::from_millis(u64::from(config.animation_timescale_ms)),
    );
    let driver = ConsoleStrip::new(usize::from(config.pixel_count), config.color_feature);
    let mut pixels = NeoPixels::new(driver, animator, config)?;

    let text = std::fs::read_to_string(script)?;
    let mut rejected = 0usize;
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let reply = pixels.b64_command(line);
        if reply.is_error() {
            rejected += 1;
        }
        print_reply(line, &reply);
    }
    if rejected > 0 {
        tracing::warn!(rejected, "script contained rejected commands");
    }

    for _ in 0..frames {
        pixels.update()?;
        clock.advance(Duration::from_millis(frame_ms));
    }
    Ok(())
}

fn run_encode_zone(config: &StripConfig, zone: &ZoneArgs) -> neozones_core::Result<()> {
    let mut container = Container::new(zone.start, zone.length);
    if let Some(led_length) = zone.led_length {
        container = container.with_custom(zone.led_start, led_length, zone.led_offset);
    }
    if let Some(animation) = zone.animation {
        container = container.with_animation(animation.into(), zone.time);
    }
    container.validate(usize::from(config.pixel_count))?;

    let codec = Base64Codec::new(&config.base64_last_chars)?;
    let command = Command::RgbwRange {
        container,
        color: zone.color,
    };
    println!("{}", codec.encode(&command.encode()));
    Ok(())
}

fn print_reply(message: &str, reply: &CmdResult) {
    let bytes = reply
        .to_bytes()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    println!("{message} -> {bytes}");
}

fn parse_color(text: &str) -> Result<Rgbw, String> {
    let hex = text.trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) {
        return Err(format!("`{text}` is not RRGGBB or RRGGBBWW"));
    }
    let mut channels = [0u8; 4];
    for (slot, chunk) in channels.iter_mut().zip(hex.as_bytes().chunks(2)) {
        let pair = std::str::from_utf8(chunk).map_err(|err| err.to_string())?;
        *slot = u8::from_str_radix(pair, 16).map_err(|err| format!("`{text}`: {err}"))?;
    }
    Ok(Rgbw::from_bytes(channels))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive a zoned LED strip from the command line", long_about = None)]
struct Cli {
    /// JSON strip configuration; defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply base64 commands in order and render one frame.
    Send {
        /// Base64 encoded binary messages.
        #[arg(required = true)]
        messages: Vec<String>,
    },
    /// Apply a script of base64 commands, then render a run of frames.
    Replay {
        /// One base64 message per line; `#` starts a comment line.
        script: PathBuf,
        /// Number of frames to render.
        #[arg(short, long, default_value_t = 10)]
        frames: usize,
        /// Simulated time between frames in milliseconds.
        #[arg(long, default_value_t = 50)]
        frame_ms: u64,
    },
    /// Print the base64 command defining a solid or animated zone.
    EncodeZone(ZoneArgs),
}

#[derive(clap::Args, Debug)]
struct ZoneArgs {
    #[arg(long)]
    start: u16,
    #[arg(long)]
    length: u16,
    /// Zone color as RRGGBB or RRGGBBWW hex.
    #[arg(long, value_parser = parse_color)]
    color: Rgbw,
    /// First pixel of a custom window.
    #[arg(long, default_value_t = 0)]
    led_start: u16,
    /// Length of a custom window; makes the zone custom when set.
    #[arg(long)]
    led_length: Option<u16>,
    #[arg(long, default_value_t = 0)]
    led_offset: u16,
    #[arg(long, value_enum)]
    animation: Option<AnimationArg>,
    /// Animation period in configured time units.
    #[arg(long, default_value_t = 10)]
    time: u16,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AnimationArg {
    Breathe,
    FadeIn,
    Wipe,
    Comet,
}

impl From<AnimationArg> for AnimationKind {
    fn from(value: AnimationArg) -> Self {
        match value {
            AnimationArg::Breathe => AnimationKind::Breathe,
            AnimationArg::FadeIn => AnimationKind::FadeIn,
            AnimationArg::Wipe => AnimationKind::Wipe,
            AnimationArg::Comet => AnimationKind::Comet,
        }
    }
}
