use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use csq_core::errors::{CsqError, ErrorInfo};
use csq_coupling::{Geometry, Normalization, Units};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::serde::read_yaml;

/// Simulation selected by the `simulation` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationKind {
    /// Spread of dipolar couplings across a tilt-angle sweep.
    SpreadOfCouplings,
    /// Spread of explicitly supplied couplings across a tilt-angle sweep.
    SpreadOfCouplingsSelectedCoeffs,
    /// Inverse spread across a tilt-angle sweep.
    DecayTime,
    /// Ranked dipolar couplings at a fixed tilt.
    Interactions,
    /// Site distances reproducing the supplied couplings.
    FindGeometryGivenInteractions,
    /// Eigenvalues against the magnetic field.
    Spectrum,
    /// Observables under the dipolar XX Hamiltonian.
    SpinEvolution,
    /// Observables under an XX Hamiltonian with supplied couplings.
    SpinEvolutionSelectedCoeffs,
    /// Spread of Gaussian coefficients across a width sweep.
    SpreadOfCouplingsGaussian,
}

/// Name under which Gaussian spread documents are written.
pub const GAUSSIAN_SPREAD_DOCUMENT: &str = "spread-gaussian";

impl SimulationKind {
    /// Kebab-case identifier used in configuration and result documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationKind::SpreadOfCouplings => "spread-of-couplings",
            SimulationKind::SpreadOfCouplingsSelectedCoeffs => "spread-of-couplings-selected-coeffs",
            SimulationKind::DecayTime => "decay-time",
            SimulationKind::Interactions => "interactions",
            SimulationKind::FindGeometryGivenInteractions => "find-geometry-given-interactions",
            SimulationKind::Spectrum => "spectrum",
            SimulationKind::SpinEvolution => "spin-evolution",
            SimulationKind::SpinEvolutionSelectedCoeffs => "spin-evolution-selected-coeffs",
            SimulationKind::SpreadOfCouplingsGaussian => "spread-of-couplings-gaussian",
        }
    }

    /// `simulationid` recorded in result documents. Gaussian spread curves
    /// share the dipolar spread id so plots route them alike.
    pub fn simulation_id(&self) -> &'static str {
        match self {
            SimulationKind::SpreadOfCouplingsGaussian => "spread-of-couplings",
            other => other.as_str(),
        }
    }

    /// Fixed document name for kinds whose consumers look it up by name.
    pub fn document_name(&self) -> Option<&'static str> {
        match self {
            SimulationKind::SpreadOfCouplingsGaussian => Some(GAUSSIAN_SPREAD_DOCUMENT),
            _ => None,
        }
    }

    /// Human readable title stored in the document metadata.
    pub fn label(&self) -> &'static str {
        match self {
            SimulationKind::SpreadOfCouplings => "Spread of couplings vs tilt angle",
            SimulationKind::SpreadOfCouplingsSelectedCoeffs => {
                "Spread of selected couplings vs tilt angle"
            }
            SimulationKind::DecayTime => "Decay time vs tilt angle",
            SimulationKind::Interactions => "Interaction strength",
            SimulationKind::FindGeometryGivenInteractions => "Geometry for given interactions",
            SimulationKind::Spectrum => "Spectrum vs magnetic field",
            SimulationKind::SpinEvolution | SimulationKind::SpinEvolutionSelectedCoeffs => {
                "Central spin expectation value time evolution"
            }
            SimulationKind::SpreadOfCouplingsGaussian => "Spread of gaussian couplings",
        }
    }

    /// Physics keys that must be present before the simulation can run.
    pub fn required_fields(&self) -> &'static [PhysicsField] {
        use PhysicsField as F;
        match self {
            SimulationKind::SpreadOfCouplings | SimulationKind::DecayTime => &[
                F::BathDipoleMoment,
                F::AtomDipoleMoment,
                F::BathCount,
                F::Spin,
                F::TiltAngleRange,
                F::ConstantDistance,
                F::Geometry,
                F::Dt,
            ],
            SimulationKind::SpreadOfCouplingsSelectedCoeffs => {
                &[F::Spin, F::InteractionCoefficients, F::TiltAngleRange, F::Dt]
            }
            SimulationKind::Interactions => &[
                F::BathDipoleMoment,
                F::AtomDipoleMoment,
                F::BathCount,
                F::ConstantDistance,
                F::Spin,
                F::Geometry,
            ],
            SimulationKind::FindGeometryGivenInteractions => {
                &[F::BathDipoleMoment, F::AtomDipoleMoment, F::InteractionCoefficients]
            }
            SimulationKind::Spectrum => &[F::Spin, F::BathCount, F::MagneticFieldRange],
            SimulationKind::SpinEvolution => &[
                F::BathDipoleMoment,
                F::AtomDipoleMoment,
                F::Spin,
                F::ConstantDistance,
                F::Geometry,
                F::TimeRange,
                F::Dt,
                F::InitialKet,
                F::Observables,
            ],
            SimulationKind::SpinEvolutionSelectedCoeffs => &[
                F::Spin,
                F::InteractionCoefficients,
                F::TimeRange,
                F::Dt,
                F::InitialKet,
                F::Observables,
            ],
            SimulationKind::SpreadOfCouplingsGaussian => {
                &[F::BathCount, F::GaussianScale, F::SpreadRange, F::Dt]
            }
        }
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DIPOLAR_BATH_FIELDS: [PhysicsField; 4] = [
    PhysicsField::BathDipoleMoment,
    PhysicsField::AtomDipoleMoment,
    PhysicsField::ConstantDistance,
    PhysicsField::Geometry,
];

/// Keys of the `physics` section that simulations may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum PhysicsField {
    BathDipoleMoment,
    AtomDipoleMoment,
    BathCount,
    Spin,
    TiltAngle,
    TiltAngleRange,
    ConstantDistance,
    Geometry,
    InteractionCoefficients,
    TimeRange,
    Dt,
    InitialKet,
    Observables,
    MagneticFieldRange,
    GaussianScale,
    SpreadRange,
}

impl PhysicsField {
    /// Configuration key of the field.
    pub fn key(&self) -> &'static str {
        match self {
            PhysicsField::BathDipoleMoment => "bathdipolemoment",
            PhysicsField::AtomDipoleMoment => "atomdipolemoment",
            PhysicsField::BathCount => "bathcount",
            PhysicsField::Spin => "spin",
            PhysicsField::TiltAngle => "tiltangle",
            PhysicsField::TiltAngleRange => "tiltanglerange",
            PhysicsField::ConstantDistance => "constantdistance",
            PhysicsField::Geometry => "geometry",
            PhysicsField::InteractionCoefficients => "interactioncoefficients",
            PhysicsField::TimeRange => "timerange",
            PhysicsField::Dt => "dt",
            PhysicsField::InitialKet => "initialket",
            PhysicsField::Observables => "observables",
            PhysicsField::MagneticFieldRange => "magneticfieldrange",
            PhysicsField::GaussianScale => "gaussianscale",
            PhysicsField::SpreadRange => "spreadrange",
        }
    }

    fn is_empty(&self, physics: &PhysicsConfig) -> bool {
        match self {
            PhysicsField::TiltAngleRange => physics.tilt_angle_range.is_empty(),
            PhysicsField::InteractionCoefficients => physics.interaction_coefficients.is_empty(),
            PhysicsField::InitialKet => physics.initial_ket.is_empty(),
            PhysicsField::Observables => physics.observables.is_empty(),
            PhysicsField::SpreadRange => physics.spread_range.is_empty(),
            _ => false,
        }
    }
}

/// Single-site operator tracked during spin evolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorKind {
    /// `S_z`.
    Sz,
    /// `S_+`.
    Sp,
    /// `S_-`.
    Sm,
    /// Identity.
    Id,
}

/// Observable entry of the `physics.observables` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservableConfig {
    /// Operator applied at `slot`.
    pub operator: OperatorKind,
    /// Site index, 0 being the central spin.
    #[serde(default)]
    pub slot: usize,
}

/// Physical parameters shared by every simulation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Dipole moment of every bath molecule.
    #[serde(rename = "bathdipolemoment")]
    pub bath_dipole_moment: f64,
    /// Dipole moment of the central atom.
    #[serde(rename = "atomdipolemoment")]
    pub atom_dipole_moment: f64,
    /// Number of bath sites.
    #[serde(rename = "bathcount")]
    pub bath_count: usize,
    /// Spin of every site.
    pub spin: f64,
    /// Lattice tilt in units of π.
    #[serde(rename = "tiltangle")]
    pub tilt_angle: f64,
    /// `[min, max)` tilt sweep in units of π.
    #[serde(rename = "tiltanglerange", skip_serializing_if = "Vec::is_empty")]
    pub tilt_angle_range: Vec<f64>,
    /// Distance of every lattice site from the central spin.
    #[serde(rename = "constantdistance")]
    pub constant_distance: f64,
    /// Lattice used to place the bath.
    pub geometry: Geometry,
    /// Explicit couplings `c0..=cN`; `c0` is the central site.
    #[serde(rename = "interactioncoefficients", skip_serializing_if = "Vec::is_empty")]
    pub interaction_coefficients: Vec<f64>,
    /// Field on every bath site.
    #[serde(rename = "bathmagneticfield")]
    pub bath_magnetic_field: f64,
    /// Field on the central spin.
    #[serde(rename = "centralmagneticfield")]
    pub central_magnetic_field: f64,
    /// Number of time samples.
    #[serde(rename = "timerange")]
    pub time_range: usize,
    /// Time step, or sweep step for the tilt and width sweeps.
    pub dt: f64,
    /// Initial product state, one of `u d p m` per site.
    #[serde(rename = "initialket", skip_serializing_if = "String::is_empty")]
    pub initial_ket: String,
    /// Observables recorded during spin evolution.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub observables: Vec<ObservableConfig>,
    /// Number of field values in the spectrum sweep.
    #[serde(rename = "magneticfieldrange")]
    pub magnetic_field_range: usize,
    /// Unit system of the dipolar prefactor.
    pub units: Units,
    /// Scale `x1` of the Gaussian coefficients.
    #[serde(rename = "gaussianscale")]
    pub gaussian_scale: f64,
    /// `[min, max)` width sweep of the Gaussian coefficients.
    #[serde(rename = "spreadrange", skip_serializing_if = "Vec::is_empty")]
    pub spread_range: Vec<f64>,
    /// Index range used to normalise the Gaussian kernel.
    pub normalization: Normalization,
}

impl PhysicsConfig {
    /// Returns `(min, max)` of a two-element range field.
    pub fn range(&self, field: PhysicsField) -> Result<(f64, f64), CsqError> {
        let values = match field {
            PhysicsField::TiltAngleRange => &self.tilt_angle_range,
            PhysicsField::SpreadRange => &self.spread_range,
            other => {
                return Err(CsqError::Config(
                    ErrorInfo::new("not-a-range", "field is not a range")
                        .with_context("field", other.key()),
                ))
            }
        };
        match values.as_slice() {
            [min, max] => Ok((*min, *max)),
            _ => Err(CsqError::Config(
                ErrorInfo::new("range-shape", "range must have exactly two entries (min, max)")
                    .with_context("field", field.key())
                    .with_context("length", values.len().to_string()),
            )),
        }
    }
}

/// Machine description copied into result metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResultsConfig {
    /// CPU description.
    pub cpu: String,
    /// Memory description.
    pub ram: String,
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory for figures rendered from the documents.
    pub figdir: String,
    /// Directory receiving result documents.
    pub outputsdir: String,
    /// Cached eigen solution (path with or without `.yaml`).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub diagonalizationdir: String,
    /// Machine description.
    pub results: ResultsConfig,
}

impl FilesConfig {
    /// Output directory, the working directory when unset.
    pub fn outputs_dir(&self) -> PathBuf {
        if self.outputsdir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.outputsdir)
        }
    }

    /// Path of the cached eigen solution, if configured.
    pub fn diagonalization_path(&self) -> Option<PathBuf> {
        if self.diagonalizationdir.is_empty() {
            return None;
        }
        let path = PathBuf::from(&self.diagonalizationdir);
        if path.extension().is_some_and(|ext| ext == "yaml") {
            return Some(path);
        }
        let mut name = path.into_os_string();
        name.push(".yaml");
        Some(PathBuf::from(name))
    }
}

/// Merged run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Simulation to run.
    pub simulation: Option<SimulationKind>,
    /// `debug` raises the log level.
    pub verbosity: String,
    /// Physical parameters.
    pub physics: PhysicsConfig,
    /// Output locations.
    pub files: FilesConfig,
    #[serde(skip)]
    physics_keys: BTreeSet<String>,
}

impl Config {
    /// Deserializes a merged configuration tree.
    pub fn from_value(value: Value) -> Result<Self, CsqError> {
        let value = lowercase_keys(value);
        let physics_keys = value
            .get("physics")
            .and_then(Value::as_mapping)
            .map(|physics| {
                physics
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .filter_map(|(k, _)| k.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default();
        let mut config: Config = serde_yaml::from_value(value).map_err(|err| {
            CsqError::Config(ErrorInfo::new("config-schema", err.to_string()))
        })?;
        config.physics_keys = physics_keys;
        Ok(config)
    }

    /// Parses a single YAML document.
    pub fn from_yaml_str(data: &str) -> Result<Self, CsqError> {
        let value: Value = serde_yaml::from_str(data).map_err(|err| {
            CsqError::Config(ErrorInfo::new("config-parse", err.to_string()))
        })?;
        Self::from_value(value)
    }

    /// Returns `true` when verbose logging was requested.
    pub fn is_debug(&self) -> bool {
        self.verbosity.eq_ignore_ascii_case("debug")
    }

    /// Returns `true` when `key` was given in the `physics` section.
    pub fn has_physics_key(&self, key: &str) -> bool {
        self.physics_keys.contains(key)
    }

    /// Simulation kind, which every run must name.
    pub fn simulation(&self) -> Result<SimulationKind, CsqError> {
        self.simulation.ok_or_else(|| {
            CsqError::Config(
                ErrorInfo::new("missing-field", "the simulation kind is required")
                    .with_context("field", "simulation")
                    .with_hint("set `simulation:` to one of the supported kinds"),
            )
        })
    }

    /// Checks the fields `kind` needs. A spectrum bath without explicit
    /// coefficients is placed dipolarly and needs the lattice fields too.
    pub fn validate(&self, kind: SimulationKind) -> Result<(), CsqError> {
        self.require(kind.required_fields())?;
        if kind == SimulationKind::Spectrum && !self.has_physics_key("interactioncoefficients") {
            self.require(&DIPOLAR_BATH_FIELDS)?;
        }
        Ok(())
    }

    /// Fails on the first field that is absent or empty.
    pub fn require(&self, fields: &[PhysicsField]) -> Result<(), CsqError> {
        for field in fields {
            if !self.has_physics_key(field.key()) || field.is_empty(&self.physics) {
                return Err(CsqError::Config(
                    ErrorInfo::new("missing-field", "required physics field is not provided")
                        .with_context("field", format!("physics.{}", field.key())),
                ));
            }
        }
        Ok(())
    }
}

/// Recursively merges `overlay` into `base`; mappings merge key by key and
/// every other value in `overlay` replaces the one in `base`.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::String(text) => Value::String(text.to_lowercase()),
                        other => other,
                    };
                    (key, lowercase_keys(value))
                })
                .collect::<Mapping>(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// Loads and deep-merges configuration files in order; later files win.
pub fn load_config<P: AsRef<Path>>(paths: &[P]) -> Result<Config, CsqError> {
    let mut merged = Value::Mapping(Mapping::new());
    for path in paths {
        let path = path.as_ref();
        debug!(path = %path.display(), "merging configuration");
        let layer: Value = read_yaml(path).map_err(|err| match err {
            CsqError::Serde(info) => CsqError::Config(info),
            other => other,
        })?;
        merge_values(&mut merged, lowercase_keys(layer));
    }
    Config::from_value(merged)
}
