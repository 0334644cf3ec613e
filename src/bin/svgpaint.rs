use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use svg_paint::logging::{LoggingConfig, init_logging};
use svg_paint::{
    Configurable, EffectProfile, Session, SessionConfig, SessionState, UploadFile,
};

/// Recolor an SVG, apply effects and export a standalone copy
#[derive(Parser, Debug)]
#[command(name = "svgpaint", version, about)]
struct Args {
    /// SVG file to load
    input: PathBuf,

    /// Session configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Effect profile to apply before the command-line switches (JSON)
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Repaint a palette color, e.g. --recolor '#ff0000=#00aa00'
    #[arg(long, value_name = "FROM=TO", value_parser = parse_recolor)]
    recolor: Vec<(String, String)>,

    /// Enable the shine highlight
    #[arg(long)]
    shine: bool,

    /// Enable the drop shadow
    #[arg(long)]
    shadow: bool,

    /// Enable the metallic texture
    #[arg(long)]
    metallic: bool,

    #[arg(long, value_name = "N")]
    saturation: Option<f32>,

    #[arg(long, value_name = "N")]
    brightness: Option<f32>,

    #[arg(long, value_name = "N")]
    contrast: Option<f32>,

    /// Print the palette as JSON and exit
    #[arg(long)]
    list_colors: bool,

    /// Check that the exported file renders standalone
    #[arg(long)]
    verify: bool,

    /// Output file (defaults to the configured file name next to the input)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log filter, overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn parse_recolor(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(from, to)| (from.trim().to_string(), to.trim().to_string()))
        .filter(|(from, to)| !from.is_empty() && !to.is_empty())
        .ok_or_else(|| format!("expected FROM=TO, got '{value}'"))
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter),
        None => LoggingConfig::default(),
    });

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };

    let name = args.input.display().to_string();
    let contents = fs::read_to_string(&args.input)?;
    let mut session = Session::new(config);
    let state = session.load(UploadFile::new(name, svg_paint::SVG_MIME, contents))?;

    if args.list_colors {
        println!("{}", serde_json::to_string_pretty(session.swatches())?);
        return Ok(());
    }

    if state != SessionState::Ready {
        log::warn!("{} has no paint colors; exporting unchanged", args.input.display());
    }

    if let Some(path) = &args.profile {
        let profile = EffectProfile::from_json(&fs::read_to_string(path)?)?;
        session.apply_profile(&profile);
    }

    for (from, to) in &args.recolor {
        let count = session.recolor(from, to)?;
        log::info!("{from} -> {to}: {count} regions");
    }

    if args.shine {
        session.set_shine(true);
    }
    if args.shadow {
        session.set_shadow(true);
    }
    if args.metallic {
        session.set_metallic(true);
    }
    if let Some(value) = args.saturation {
        session.set_saturation(value);
    }
    if let Some(value) = args.brightness {
        session.set_brightness(value);
    }
    if let Some(value) = args.contrast {
        session.set_contrast(value);
    }

    let Some(artifact) = session.export()? else {
        return Err(format!("{} has nothing to export", args.input.display()).into());
    };
    if args.verify {
        artifact.validate()?;
    }

    let path = match args.output {
        Some(path) => {
            fs::write(&path, &artifact.contents)?;
            path
        }
        None => {
            let dir = args
                .input
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default();
            artifact.write_to(dir)?
        }
    };
    println!("{}", path.display());

    Ok(())
}
