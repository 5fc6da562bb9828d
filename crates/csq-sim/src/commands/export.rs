use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use csq_exp::ResultsDocument;
use serde::Serialize;
use tracing::info;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Result document to flatten.
    #[arg(long)]
    pub input: PathBuf,
    /// CSV file to write.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Serialize)]
struct Row {
    series: usize,
    index: usize,
    x: f64,
    y: f64,
}

pub fn run(args: &ExportArgs) -> Result<(), Box<dyn Error>> {
    let document = ResultsDocument::read(&args.input)?;
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(&args.out)?;
    let mut rows = 0usize;
    for (series, xys) in document.xys.iter().enumerate() {
        for (index, point) in xys.iter().enumerate() {
            writer.serialize(Row {
                series,
                index,
                x: point.x,
                y: point.y,
            })?;
            rows += 1;
        }
    }
    writer.flush()?;
    info!(rows, path = %args.out.display(), "series exported");
    Ok(())
}
