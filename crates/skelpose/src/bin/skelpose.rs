//! `skelpose` command line tool.
//!
//! - `skelpose process` recovers a pose from four renders and writes a JSON
//!   report.
//! - `skelpose render` writes front/side rest-pose overlays of a rig.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use skelpose::core::ColorChannel;
use skelpose::load::process_image_files;
use skelpose::overlay::{write_rest_views, OverlayParams};
use skelpose::pose::io::{load_rig, PoseConfig, PoseReport};
use skelpose::pose::CorrespondenceKind;
use skelpose::PoseRig;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Recover a skeletal rig pose from front/side renders.
#[derive(Parser)]
#[command(name = "skelpose")]
#[command(about = "Recover a skeletal rig pose from front and side renders", long_about = None)]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect, reconstruct, solve and apply a pose, then write a report
    Process(ProcessArgs),

    /// Write front.png and side.png rest-pose overlays of a rig
    Render(RenderArgs),
}

#[derive(Args)]
struct ProcessArgs {
    /// JSON run config; the flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rig hierarchy JSON
    #[arg(long)]
    rig: Option<PathBuf>,

    #[arg(long)]
    front_rest: Option<PathBuf>,

    #[arg(long)]
    side_rest: Option<PathBuf>,

    #[arg(long)]
    front_target: Option<PathBuf>,

    #[arg(long)]
    side_target: Option<PathBuf>,

    /// Blend factor between rest (0) and full rotation (1)
    #[arg(long)]
    influence: Option<f64>,

    /// Fixed channel threshold; pixels strictly above it are foreground
    #[arg(long)]
    threshold: Option<u8>,

    /// Highlight channel
    #[arg(long, value_enum)]
    channel: Option<ChannelArg>,

    /// Only pose these joints (repeatable)
    #[arg(long = "filter", value_name = "JOINT")]
    filter: Vec<String>,

    /// Point-to-joint correspondence
    #[arg(long, value_enum)]
    correspondence: Option<CorrespondenceArg>,

    /// Report path (default: config output_path or skelpose_report.json)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct RenderArgs {
    /// Rig hierarchy JSON
    #[arg(long)]
    rig: PathBuf,

    /// Output directory
    #[arg(long)]
    out_dir: PathBuf,

    /// Square image side in pixels
    #[arg(long, default_value_t = 1024)]
    resolution: u32,

    /// Fraction trimmed off both ends of every bone
    #[arg(long, default_value_t = 0.0)]
    inset: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    R,
    G,
    B,
}

impl From<ChannelArg> for ColorChannel {
    fn from(c: ChannelArg) -> Self {
        match c {
            ChannelArg::R => ColorChannel::R,
            ChannelArg::G => ColorChannel::G,
            ChannelArg::B => ColorChannel::B,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CorrespondenceArg {
    Positional,
    NearestRest,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Process(args) => run_process(args),
        Commands::Render(args) => run_render(args),
    };
    match outcome {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = skelpose::core::verbosity_level(verbose);

    #[cfg(feature = "tracing")]
    {
        let _ = level;
        let _ = tracing_log::LogTracer::init();
        skelpose::core::init_tracing(false);
    }

    #[cfg(not(feature = "tracing"))]
    {
        let _ = skelpose::core::init_with_level(level);
    }
}

fn path_string(path: Option<PathBuf>) -> Option<String> {
    path.map(|p| p.to_string_lossy().into_owned())
}

fn resolve_config(args: &ProcessArgs) -> CliResult<PoseConfig> {
    let mut cfg = match &args.config {
        Some(path) => PoseConfig::load_json(path)?,
        None => {
            let need = |p: &Option<PathBuf>, flag: &str| {
                path_string(p.clone()).ok_or_else(|| format!("missing --{flag} (or --config)"))
            };
            PoseConfig {
                front_rest: need(&args.front_rest, "front-rest")?,
                side_rest: need(&args.side_rest, "side-rest")?,
                front_target: need(&args.front_target, "front-target")?,
                side_target: need(&args.side_target, "side-target")?,
                rig_path: need(&args.rig, "rig")?,
                output_path: None,
                params: None,
                influence: None,
                threshold: None,
                channel: None,
                joint_filter: None,
            }
        }
    };

    if let Some(p) = path_string(args.rig.clone()) {
        cfg.rig_path = p;
    }
    if let Some(p) = path_string(args.front_rest.clone()) {
        cfg.front_rest = p;
    }
    if let Some(p) = path_string(args.side_rest.clone()) {
        cfg.side_rest = p;
    }
    if let Some(p) = path_string(args.front_target.clone()) {
        cfg.front_target = p;
    }
    if let Some(p) = path_string(args.side_target.clone()) {
        cfg.side_target = p;
    }
    if let Some(p) = path_string(args.output.clone()) {
        cfg.output_path = Some(p);
    }
    if args.influence.is_some() {
        cfg.influence = args.influence;
    }
    if args.threshold.is_some() {
        cfg.threshold = args.threshold;
    }
    if let Some(c) = args.channel {
        cfg.channel = Some(c.into());
    }
    if !args.filter.is_empty() {
        cfg.joint_filter = Some(args.filter.clone());
    }
    Ok(cfg)
}

fn run_process(args: ProcessArgs) -> CliResult<ExitCode> {
    let cfg = resolve_config(&args)?;
    let mut params = cfg.build_params();
    match args.correspondence {
        Some(CorrespondenceArg::Positional) => params.correspondence = CorrespondenceKind::Positional,
        Some(CorrespondenceArg::NearestRest) => {
            params.correspondence = params.correspondence.nearest_rest()
        }
        None => {}
    }

    let mut rig = cfg.load_rig()?;
    let mut report = PoseReport::new(&cfg, args.config.as_deref(), params.clone());

    let code = match process_image_files(cfg.image_paths(), &mut rig, &params) {
        Ok(result) => {
            let status = if result.success { "ok" } else { "failed" };
            println!("{status}: {}", result.diagnostics.summary());
            if let Some(err) = &result.error {
                eprintln!("error: {err}");
            }
            let code = if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
            report.set_result(result, &rig);
            code
        }
        Err(err) => {
            eprintln!("error: {err}");
            report.set_error(&err);
            ExitCode::FAILURE
        }
    };

    let out = cfg.output_path();
    report.write_json(&out)?;
    log::info!("report written to {}", out.display());
    log::debug!("rig `{}` has {} joints", rig.name(), rig.hierarchy().len());
    Ok(code)
}

fn run_render(args: RenderArgs) -> CliResult<ExitCode> {
    let rig = load_rig(&args.rig)?;
    let params = OverlayParams {
        resolution: args.resolution,
        inset: args.inset,
        ..OverlayParams::default()
    };
    for path in write_rest_views(rig.hierarchy(), &params, &args.out_dir)? {
        println!("{}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
