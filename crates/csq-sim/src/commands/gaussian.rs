use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use csq_coupling::{b_grid, spread_curve_with, synthesize_with, Geometry, Normalization};
use csq_exp::{
    Config, PhysicsConfig, RunClock, SimulationKind, SystemRecord, GAUSSIAN_SPREAD_DOCUMENT,
};
use serde::Serialize;
use tracing::info;

/// Command-line spelling of [`Normalization`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NormalizationArg {
    /// Sum over `j = 1..=N`.
    OneBased,
    /// Sum over `j = 0..N`.
    ZeroBased,
}

impl From<NormalizationArg> for Normalization {
    fn from(value: NormalizationArg) -> Self {
        match value {
            NormalizationArg::OneBased => Normalization::OneBased,
            NormalizationArg::ZeroBased => Normalization::ZeroBased,
        }
    }
}

#[derive(Args, Debug)]
pub struct CoeffsArgs {
    /// Number of bath sites N.
    #[arg(long)]
    pub bath_count: usize,
    /// Gaussian width B.
    #[arg(long)]
    pub spread: f64,
    /// Scale x1.
    #[arg(long)]
    pub scale: f64,
    /// Normalisation index range.
    #[arg(long, value_enum, default_value_t = NormalizationArg::OneBased)]
    pub normalization: NormalizationArg,
    /// Optional configuration fragment to write.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Serialize)]
struct PhysicsFragment {
    interactioncoefficients: Vec<f64>,
    geometry: Geometry,
}

#[derive(Serialize)]
struct ConfigFragment {
    physics: PhysicsFragment,
}

pub fn coeffs(args: &CoeffsArgs) -> Result<(), Box<dyn Error>> {
    let coefficients =
        synthesize_with(args.bath_count, args.spread, args.scale, args.normalization.into())?;
    println!("{coefficients:?}");
    if let Some(out) = &args.out {
        let fragment = ConfigFragment {
            physics: PhysicsFragment {
                interactioncoefficients: coefficients,
                geometry: Geometry::Gauss,
            },
        };
        csq_exp::serde::write_yaml(out, &fragment)?;
        info!(path = %out.display(), "configuration fragment written");
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct SpreadArgs {
    /// Number of bath sites N.
    #[arg(long)]
    pub bath_count: usize,
    /// Scale x1.
    #[arg(long)]
    pub scale: f64,
    /// First width of the sweep.
    #[arg(long, default_value_t = 0.0)]
    pub from: f64,
    /// Exclusive end of the sweep.
    #[arg(long, default_value_t = 1.5)]
    pub to: f64,
    /// Width step.
    #[arg(long, default_value_t = 1e-3)]
    pub step: f64,
    /// Normalisation index range.
    #[arg(long, value_enum, default_value_t = NormalizationArg::OneBased)]
    pub normalization: NormalizationArg,
    /// Directory receiving the result document.
    #[arg(long)]
    pub out: PathBuf,
    /// Document name, `.yaml` appended when missing.
    #[arg(long, default_value = GAUSSIAN_SPREAD_DOCUMENT)]
    pub filename: String,
    /// Figures directory recorded in the metadata.
    #[arg(long)]
    pub figures_dir: Option<PathBuf>,
}

pub fn spread(args: &SpreadArgs) -> Result<(), Box<dyn Error>> {
    let clock = RunClock::start();
    let normalization = Normalization::from(args.normalization);
    let grid = b_grid(args.from, args.to, args.step)?;
    let series = spread_curve_with(args.bath_count, args.scale, &grid, normalization)?;

    let physics = PhysicsConfig {
        bath_count: args.bath_count,
        geometry: Geometry::Gauss,
        gaussian_scale: args.scale,
        spread_range: vec![args.from, args.to],
        dt: args.step,
        normalization,
        ..PhysicsConfig::default()
    };
    let mut config = Config::default();
    if let Some(dir) = &args.figures_dir {
        config.files.figdir = dir.display().to_string();
    }
    let mut document = clock.finish(
        SimulationKind::SpreadOfCouplingsGaussian,
        &config,
        SystemRecord::from_physics(&physics),
        vec![series],
    );
    document.filename = args.filename.clone();
    let path = document.write(&args.out)?;
    println!("{}", path.display());
    Ok(())
}
