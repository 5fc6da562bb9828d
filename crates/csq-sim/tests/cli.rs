use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn csq_sim(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_csq-sim"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn csq-sim");
    assert!(
        output.status.success(),
        "csq-sim {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8 stdout")
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn gaussian_spread_then_export() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("docs");
    let stdout = csq_sim(&[
        "gaussian-spread",
        "--bath-count",
        "11",
        "--scale",
        "2.0",
        "--to",
        "0.5",
        "--step",
        "0.1",
        "--out",
        &arg(&out),
        "--figures-dir",
        "figures/gaussian",
    ]);
    let document = stdout.trim().to_owned();
    assert_eq!(Path::new(&document), out.join("spread-gaussian.yaml"));
    let contents = fs::read_to_string(&document).unwrap();
    assert!(contents.contains("simulationid: spread-of-couplings\n"));
    assert!(contents.contains("filename: spread-gaussian\n"));

    let csv_path = dir.path().join("series.csv");
    csq_sim(&["export", "--input", &document, "--out", &arg(&csv_path)]);
    let csv = fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("series,index,x,y"));
    assert_eq!(lines.count(), 5);
}

#[test]
fn gaussian_spread_accepts_a_document_name() {
    let dir = tempdir().unwrap();
    let stdout = csq_sim(&[
        "gaussian-spread",
        "--bath-count",
        "5",
        "--scale",
        "1.0",
        "--to",
        "0.2",
        "--step",
        "0.1",
        "--filename",
        "spread-gaussian-n5",
        "--out",
        &arg(dir.path()),
    ]);
    assert_eq!(Path::new(stdout.trim()), dir.path().join("spread-gaussian-n5.yaml"));
}

#[test]
fn coefficient_fragment_layers_into_a_run() {
    let dir = tempdir().unwrap();
    let fragment = dir.path().join("coeffs.yaml");
    let stdout = csq_sim(&[
        "gaussian-coeffs",
        "--bath-count",
        "3",
        "--spread",
        "0.4",
        "--scale",
        "2.0",
        "--normalization",
        "zero-based",
        "--out",
        &arg(&fragment),
    ]);
    assert!(stdout.starts_with("[0.0,"));

    let base = dir.path().join("base.yaml");
    fs::write(
        &base,
        format!(
            "simulation: spin-evolution-selected-coeffs\nphysics:\n  spin: 0.5\n  timerange: 4\n  dt: 0.1\n  initialket: duuu\n  observables:\n    - {{operator: Sz, slot: 0}}\nfiles:\n  outputsdir: {}\n",
            dir.path().join("outputs").display()
        ),
    )
    .unwrap();
    let stdout = csq_sim(&["run", "-f", &arg(&base), "-f", &arg(&fragment)]);
    let document = fs::read_to_string(stdout.trim()).unwrap();
    assert!(document.contains("geometry: gauss"));
    assert!(document.contains("simulationid: spin-evolution-selected-coeffs"));
}

fn csq_sim_stderr(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_csq-sim"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn csq-sim");
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn debug_logging_covers_config_loading() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("spread.yaml");
    fs::write(
        &config,
        format!(
            "simulation: spread-of-couplings-gaussian\nphysics:\n  bathcount: 5\n  gaussianscale: 1.0\n  spreadrange: [0.0, 0.2]\n  dt: 0.1\nfiles:\n  outputsdir: {}\n",
            dir.path().display()
        ),
    )
    .unwrap();

    let verbose = csq_sim_stderr(&["-v", "run", "-f", &arg(&config)]);
    assert!(verbose.contains("merging configuration"));

    let quiet = csq_sim_stderr(&["run", "-f", &arg(&config)]);
    assert!(!quiet.contains("merging configuration"));
    assert!(!quiet.contains("merged configuration"));

    let debug_layer = dir.path().join("debug.yaml");
    fs::write(&debug_layer, "verbosity: debug\n").unwrap();
    let configured = csq_sim_stderr(&["run", "-f", &arg(&config), "-f", &arg(&debug_layer)]);
    assert!(configured.contains("merged configuration"));
}
