use std::path::{Path, PathBuf};

use anyhow::Context as _;
use argand::encode::mux::ensure_parent_dir;
use argand::{
    AnimationConfig, Animator, ElementaryStreamMuxer, EncodePipeline, FfmpegEncoder,
    FfmpegMuxer, FfmpegMuxerOpts, FormulaKind, FrameIndex, Muxer, VideoEncoder,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "argand", version, about = "Domain-coloring animation renderer")]
struct Cli {
    /// More logging (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the animation to a video file.
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EncoderChoice {
    /// Encode through system `ffmpeg` with the configured codec.
    Ffmpeg,
    /// Uncompressed RGB24 frames, no external tools.
    Raw,
}

#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// Animation configuration JSON. Defaults reproduce the reference animation.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override frame width.
    #[arg(long)]
    width: Option<u32>,

    /// Override frame height.
    #[arg(long)]
    height: Option<u32>,

    /// Override the number of frames.
    #[arg(long)]
    frames: Option<u64>,

    /// Override the render worker count.
    #[arg(long)]
    threads: Option<usize>,

    /// Override the animation formula.
    #[arg(long, value_enum)]
    formula: Option<FormulaArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormulaArg {
    RationalPower,
    PolynomialBlend,
}

impl From<FormulaArg> for FormulaKind {
    fn from(f: FormulaArg) -> Self {
        match f {
            FormulaArg::RationalPower => FormulaKind::RationalPower,
            FormulaArg::PolynomialBlend => FormulaKind::PolynomialBlend,
        }
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Output path. `.mp4`, `.mkv` and `.mov` are muxed by ffmpeg (raw frames only fit `.mkv`
    /// and `.mov`); anything else receives the elementary stream.
    out: PathBuf,

    /// Encoder backend.
    #[arg(long, value_enum, default_value_t = EncoderChoice::Ffmpeg)]
    encoder: EncoderChoice,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Output PNG path.
    out: PathBuf,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    index: u64,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<AnimationConfig> {
    let mut cfg = match &args.config {
        Some(path) => AnimationConfig::from_json_file(path)?,
        None => AnimationConfig::default(),
    };
    if let Some(w) = args.width {
        cfg.width = w;
    }
    if let Some(h) = args.height {
        cfg.height = h;
    }
    if let Some(n) = args.frames {
        cfg.frame_count = n;
    }
    if let Some(t) = args.threads {
        cfg.threads = t;
    }
    if let Some(f) = args.formula {
        cfg.formula = f.into();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let animator = Animator::new(cfg.clone())?;

    let stats = match args.encoder {
        EncoderChoice::Ffmpeg => {
            let encoder = FfmpegEncoder::spawn(&cfg.ffmpeg_encoder_opts())?;
            run_with_output(&animator, encoder, &args.out)?
        }
        EncoderChoice::Raw => run_with_output(&animator, cfg.raw_encoder()?, &args.out)?,
    };

    eprintln!(
        "wrote {} ({} frames, {} packets, {} bytes)",
        args.out.display(),
        stats.frames_submitted,
        stats.packets_written,
        stats.bytes_written
    );
    Ok(())
}

fn run_with_output<E: VideoEncoder>(
    animator: &Animator,
    encoder: E,
    out: &Path,
) -> anyhow::Result<argand::RenderStats> {
    if is_container_path(out) {
        let muxer = FfmpegMuxer::new(FfmpegMuxerOpts::new(out));
        run_pipeline(animator, encoder, muxer)
    } else {
        let muxer = ElementaryStreamMuxer::create(out)?;
        run_pipeline(animator, encoder, muxer)
    }
}

fn run_pipeline<E: VideoEncoder, M: Muxer>(
    animator: &Animator,
    encoder: E,
    muxer: M,
) -> anyhow::Result<argand::RenderStats> {
    let mut pipeline = EncodePipeline::new(encoder, muxer)?;
    Ok(animator.run(&mut pipeline)?)
}

fn is_container_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            ["mp4", "mkv", "mov"]
                .iter()
                .any(|c| e.eq_ignore_ascii_case(c))
        })
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let animator = Animator::new(cfg)?;
    let frame = animator.render_frame(FrameIndex(args.index))?;

    ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.to_packed_rgb(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
