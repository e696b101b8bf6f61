//! Project cargo configuration
//! 
//! Reads the `[target.<triple>] linker = "..."` declaration from a project's
//! `.cargo/config.toml`. Reading is best-effort: a missing file, a missing
//! section or an unparsable file all yield no linker.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::target::TargetTriple;

/// Config files cargo consults, in precedence order
const CONFIG_FILES: &[&str] = &["config.toml", "config"];

/// Locate the project's cargo config file, if any
pub fn find_config_file(project_dir: &Path) -> Option<PathBuf> {
    let cargo_dir = project_dir.join(".cargo");
    CONFIG_FILES
        .iter()
        .map(|name| cargo_dir.join(name))
        .find(|path| path.is_file())
}

/// Linker configured for `target` in the project's cargo config
pub fn configured_linker(project_dir: &Path, target: TargetTriple) -> Option<String> {
    let path = find_config_file(project_dir)?;

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read {:?}: {}", path, e);
            return None;
        }
    };

    let linker = linker_from_toml(&content, target);
    if linker.is_none() && content.contains("[target") {
        debug!("No linker for {} in {:?}", target, path);
    }
    linker
}

/// Extract `target.<triple>.linker` from config text
pub fn linker_from_toml(content: &str, target: TargetTriple) -> Option<String> {
    let value: toml::Value = match toml::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring malformed cargo config: {}", e);
            return None;
        }
    };

    value
        .get("target")?
        .get(target.as_str())?
        .get("linker")?
        .as_str()
        .map(str::trim)
        .filter(|linker| !linker.is_empty())
        .map(str::to_string)
}
