use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, SecondsFormat};
use csq_core::errors::CsqError;
use csq_core::{RunMetadata, Xys};
use csq_coupling::{Bath, BathSite};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Config, PhysicsConfig, SimulationKind};
use crate::serde::{from_yaml_str, read_yaml, to_yaml_string, write_yaml};

/// Snapshot of the simulated system stored with every document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SystemRecord {
    /// The central spin, when the run placed one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centralspin: Option<BathSite>,
    /// Bath sites with their couplings, when the run built a bath.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bath: Option<Bath>,
    /// Physical parameters the run used.
    pub physicsconfig: PhysicsConfig,
}

impl SystemRecord {
    /// Record holding only the physical parameters.
    pub fn from_physics(physics: &PhysicsConfig) -> Self {
        Self {
            physicsconfig: physics.clone(),
            ..Self::default()
        }
    }

    /// Record of a central spin at the origin surrounded by `bath`.
    pub fn with_bath(physics: &PhysicsConfig, bath: Bath) -> Self {
        Self {
            centralspin: Some(BathSite::default()),
            bath: Some(bath),
            physicsconfig: physics.clone(),
        }
    }
}

/// Values section of a result document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Values {
    /// Simulated system.
    pub system: SystemRecord,
}

/// Persisted outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResultsDocument {
    /// File stem the document is written under.
    pub filename: String,
    /// Run metadata.
    pub metadata: RunMetadata,
    /// System snapshot.
    pub values: Values,
    /// Output series.
    pub xys: Vec<Xys>,
}

impl ResultsDocument {
    /// Serializes the document into YAML.
    pub fn to_yaml(&self) -> Result<String, CsqError> {
        to_yaml_string(self)
    }

    /// Parses a document from YAML.
    pub fn from_yaml(data: &str) -> Result<Self, CsqError> {
        from_yaml_str(data)
    }

    /// Path the document is written to under `outputs_dir`.
    pub fn path_in(&self, outputs_dir: &Path) -> PathBuf {
        let name = if self.filename.ends_with(".yaml") {
            self.filename.clone()
        } else {
            format!("{}.yaml", self.filename)
        };
        outputs_dir.join(name)
    }

    /// Writes `<outputs_dir>/<filename>.yaml` and returns the path.
    pub fn write(&self, outputs_dir: &Path) -> Result<PathBuf, CsqError> {
        let path = self.path_in(outputs_dir);
        write_yaml(&path, self)?;
        info!(path = %path.display(), "result document written");
        Ok(path)
    }

    /// Reads a document from disk.
    pub fn read(path: &Path) -> Result<Self, CsqError> {
        read_yaml(path)
    }
}

/// Start time of a run, used to stamp its document.
#[derive(Debug, Clone)]
pub struct RunClock {
    started: Instant,
    stamp: String,
}

impl RunClock {
    /// Starts the clock at the current local time.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }

    /// RFC 3339 start time.
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// Assembles the document for a finished run of `kind`.
    pub fn finish(
        &self,
        kind: SimulationKind,
        config: &Config,
        system: SystemRecord,
        xys: Vec<Xys>,
    ) -> ResultsDocument {
        let mut metadata = RunMetadata::new(kind.label(), kind.simulation_id());
        metadata.date = self.stamp.clone();
        metadata.figuresdir = config.files.figdir.clone();
        metadata.cpu = config.files.results.cpu.clone();
        metadata.ram = config.files.results.ram.clone();
        metadata.completiontime = format!("{:?}", self.started.elapsed());
        ResultsDocument {
            filename: kind
                .document_name()
                .map_or_else(|| self.stamp.clone(), str::to_owned),
            metadata,
            values: Values { system },
            xys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_documents_parse() {
        let doc = ResultsDocument::from_yaml(
            "filename: old\nvalues:\n  system:\n    physicsconfig:\n      bathcount: 3\n      geometry: ring\nxys:\n  - - {x: 0.5, y: 1.0}\n",
        )
        .unwrap();
        assert_eq!(doc.values.system.physicsconfig.bath_count, 3);
        assert_eq!(doc.xys[0][0].y, 1.0);
        assert!(doc.values.system.bath.is_none());
    }

    #[test]
    fn path_appends_extension_once() {
        let mut doc = ResultsDocument {
            filename: "run".into(),
            ..ResultsDocument::default()
        };
        assert_eq!(doc.path_in(Path::new("out")), PathBuf::from("out/run.yaml"));
        doc.filename = "run.yaml".into();
        assert_eq!(doc.path_in(Path::new("out")), PathBuf::from("out/run.yaml"));
    }

    #[test]
    fn clock_stamps_metadata() {
        let mut config = Config::default();
        config.files.results.cpu = "m2".into();
        let clock = RunClock::start();
        let doc = clock.finish(
            SimulationKind::DecayTime,
            &config,
            SystemRecord::default(),
            vec![],
        );
        assert_eq!(doc.metadata.simulationid, "decay-time");
        assert_eq!(doc.metadata.cpu, "m2");
        assert_eq!(doc.filename, clock.stamp());
        assert!(!doc.metadata.completiontime.is_empty());
    }

    #[test]
    fn gaussian_spread_documents_use_plot_names() {
        let doc = RunClock::start().finish(
            SimulationKind::SpreadOfCouplingsGaussian,
            &Config::default(),
            SystemRecord::default(),
            vec![],
        );
        assert_eq!(doc.metadata.simulationid, "spread-of-couplings");
        assert_eq!(doc.filename, "spread-gaussian");
    }
}
