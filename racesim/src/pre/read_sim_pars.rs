use crate::pre::sim_constants::SimConstants;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;

/// read_sim_constants reads the JSON file and decodes the JSON string into the simulation
/// constants struct. Missing sections and fields fall back to their defaults. The constants are
/// validated before they are returned.
pub fn read_sim_constants(filepath: &Path) -> anyhow::Result<SimConstants> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open simulation constants file {}!",
            filepath.display()
        ))?;

    let consts: SimConstants = serde_json::from_reader(&fh).context(format!(
        "Failed to parse simulation constants file {}!",
        filepath.display()
    ))?;

    consts.validate()?;
    Ok(consts)
}

/// read_sim_constants_or_default reads the constants from the given file if a path is set and
/// falls back to the built-in defaults otherwise.
pub fn read_sim_constants_or_default(filepath: Option<&Path>) -> anyhow::Result<SimConstants> {
    match filepath {
        Some(path) => read_sim_constants(path),
        None => Ok(SimConstants::default()),
    }
}
