/// torsionviz Terminal - Interactive shaft torsion visualizer
///
/// Renders a circular shaft under torque as a colored character raster.
/// Controls:
///   - Mouse drag / Arrow Keys: Orbit the camera
///   - Mouse wheel: Zoom
///   - F/S/T: Front, side and top views
///   - +/-: Increase or decrease the torque
///   - O/D/X/G/M: Toggle original, deformed, stress, grid and labels
///   - R: Reset to the untwisted shaft
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use torsionviz_core::{ParamInputs, VisualizerConfig};
use torsionviz_terminal::TerminalApp;
use tracing_subscriber::EnvFilter;

/// Raw parameter values are parsed leniently: the longest numeric prefix is
/// used and anything unparseable, zero or missing falls back to the default.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "torsionviz-terminal",
    author,
    version,
    about = "Interactive shaft torsion visualizer for the terminal"
)]
struct Cli {
    /// Shaft length in metres
    #[arg(long, short = 'l')]
    length: Option<String>,

    /// Outer diameter in metres
    #[arg(long, short = 'D')]
    outer_diameter: Option<String>,

    /// Inner diameter in metres (0 for a solid shaft)
    #[arg(long, short = 'd')]
    inner_diameter: Option<String>,

    /// Number of segments along the shaft
    #[arg(long, short = 'n')]
    segments: Option<String>,

    /// Young's modulus in GPa
    #[arg(long)]
    elastic_modulus: Option<String>,

    /// Shear modulus in GPa
    #[arg(long, short = 'G')]
    shear_modulus: Option<String>,

    #[arg(long)]
    poisson_ratio: Option<String>,

    /// Applied torque in N·m
    #[arg(long, short = 'T')]
    torque: Option<String>,

    /// Multiplier applied to the computed twist before drawing
    #[arg(long, short = 's')]
    deformation_scale: Option<String>,

    /// TOML file with camera, interaction, color and display settings
    #[arg(long, short = 'c', env = "TORSIONVIZ_CONFIG")]
    config: Option<PathBuf>,

    /// Write logs to this file (the terminal belongs to the visualizer)
    #[arg(long, env = "TORSIONVIZ_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn param_inputs(&self) -> ParamInputs {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        ParamInputs {
            length: text(&self.length),
            outer_diameter: text(&self.outer_diameter),
            inner_diameter: text(&self.inner_diameter),
            segments: text(&self.segments),
            elastic_modulus: text(&self.elastic_modulus),
            shear_modulus: text(&self.shear_modulus),
            poisson_ratio: text(&self.poisson_ratio),
            torque: text(&self.torque),
            deformation_scale: text(&self.deformation_scale),
        }
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "torsionviz_core=info,torsionviz_terminal=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => VisualizerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VisualizerConfig::default(),
    };

    let (params, deformation_scale) = cli.param_inputs().resolve();
    tracing::info!(?params, deformation_scale, "resolved parameters");

    let mut app = TerminalApp::new(&config, params, deformation_scale)?;
    app.run()?;

    Ok(())
}
