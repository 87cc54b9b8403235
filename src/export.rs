use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::dashboard::DashboardView;

/// Write the chart specifications of `view` as pretty-printed JSON.
pub fn write_json(path: &Path, view: &DashboardView) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, view).context("serializing chart specifications")?;
    writer.flush().context("writing chart specifications")?;
    Ok(())
}
