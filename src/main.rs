//! styleblend CLI - classic filters, neural style transfer, and style blending.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use styleblend::image::{open_source_with_limit, save_image, DEFAULT_MAX_FETCH_BYTES};
use styleblend::model::DEFAULT_MODEL_DIR;
use styleblend::{Config, Effect, ModelKey, Output, Pipeline, Request, StyleName, StyleSource};

/// Apply classic filters and neural styles to images.
#[derive(Parser, Debug)]
#[command(name = "styleblend")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the model artifacts and style reference images.
    #[arg(long, global = true, env = "STYLEBLEND_MODEL_DIR", default_value = DEFAULT_MODEL_DIR, value_name = "DIR")]
    model_dir: PathBuf,

    /// Side length content images are resized to before transfer.
    #[arg(long, global = true, default_value = "384", value_name = "INT")]
    content_size: u32,

    /// Feed content images to the transfer model at their native size.
    #[arg(long, global = true, conflicts_with = "content_size")]
    native_size: bool,

    /// Side length style images are resized to before prediction.
    #[arg(long, global = true, default_value = "256", value_name = "INT")]
    style_size: u32,

    /// Use the int8-quantized models.
    #[arg(long, global = true)]
    quantized: bool,

    /// Load models before processing instead of on first use.
    #[arg(long, global = true)]
    eager: bool,

    /// Output JPEG quality (1-100).
    #[arg(short, long, global = true, default_value = "95", value_name = "INT",
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Largest image body accepted from a URL, in bytes.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_FETCH_BYTES, value_name = "BYTES")]
    max_fetch_bytes: u64,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a classic filter.
    Filter {
        #[command(flatten)]
        io: Io,

        /// Filter name (see `styleblend list`).
        #[arg(short, long, value_name = "NAME")]
        effect: String,
    },

    /// Apply one neural style.
    Style {
        #[command(flatten)]
        io: Io,

        /// Bundled style name (see `styleblend list`).
        #[arg(short, long, value_name = "NAME", required_unless_present = "style_image")]
        style: Option<String>,

        /// Style image path or URL, instead of a bundled style.
        #[arg(long, value_name = "SOURCE", conflicts_with = "style")]
        style_image: Option<String>,
    },

    /// Blend two neural styles and apply the result.
    Blend {
        #[command(flatten)]
        io: Io,

        /// Style image path or URL; the ratio moves towards this style.
        #[arg(long, value_name = "SOURCE")]
        style: String,

        /// Style image the blend starts from. Defaults to the content image.
        #[arg(long, value_name = "SOURCE")]
        base_style: Option<String>,

        /// Blend ratio (0.0-1.0). 0.0 keeps the base style, 1.0 uses `--style` alone.
        #[arg(short, long, value_name = "FLOAT")]
        ratio: f32,
    },

    /// List the available filters, styles, and models.
    List,
}

#[derive(ClapArgs, Debug)]
struct Io {
    /// Content image path or URL.
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output image path.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("styleblend={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: Args) -> Result<()> {
    // Build configuration
    let mut config = Config {
        model_dir: args.model_dir,
        style_size: args.style_size,
        content_size: (!args.native_size).then_some(args.content_size),
        ..Config::default()
    };
    if args.quantized {
        config = config.quantized();
    }

    let pipeline = Pipeline::from_config(config).context("Failed to initialize pipeline")?;
    if args.eager && matches!(args.command, Command::Style { .. } | Command::Blend { .. }) {
        pipeline.preload().context("Failed to load models")?;
    }

    let limit = args.max_fetch_bytes;
    let open_source = |source: &str| open_source_with_limit(source, limit);

    let (io, output) = match args.command {
        Command::List => {
            list();
            return Ok(());
        }
        Command::Filter { io, effect } => {
            let content = open_source(&io.input)?;
            (io, pipeline.filter(content, &effect))
        }
        Command::Style {
            io,
            style,
            style_image,
        } => {
            let content = open_source(&io.input)?;
            let style = match (style, style_image) {
                (_, Some(source)) => StyleSource::Image(open_source(&source)?),
                (Some(name), None) => StyleSource::Named(name.parse()?),
                (None, None) => anyhow::bail!("either --style or --style-image is required"),
            };
            (io, pipeline.run(Request::Style { content, style }))
        }
        Command::Blend {
            io,
            style,
            base_style,
            ratio,
        } => {
            let content = open_source(&io.input)?;
            let first = match base_style {
                Some(source) => open_source(&source)?,
                None => content.clone(),
            };
            let second = open_source(&style)?;
            (io, pipeline.blend(content, first, second, ratio))
        }
    };

    let Output { image, trace } = output.context("Failed to process image")?;
    tracing::debug!("Stages: {trace:?}");

    save_image(&image, &io.output, args.quality).context("Failed to save output")?;

    println!("Successfully processed {} -> {}", io.input, io.output.display());

    Ok(())
}

fn list() {
    println!("Effects:");
    for effect in Effect::ALL {
        println!("  {effect}");
    }
    println!("Styles:");
    for style in StyleName::ALL {
        println!("  {style}");
    }
    println!("Models:");
    for key in ModelKey::ALL {
        println!("  {key} ({})", key.role());
    }
}
