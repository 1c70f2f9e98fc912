use crate::Result;
use std::fs;
use std::path::Path;

/// Directory holding the demo applications
pub const DEMOS_DIR: &str = "demos";
/// Workspace member that is the build tool itself
const XTASK_CRATE: &str = "xtask";

/// Retrieves the library crates defined in the workspace's `Cargo.toml`.
///
/// The `workspace.members` section is parsed, glob patterns like `ntpc-net-*` are
/// expanded to the matching directories and the `xtask` member is left out.
///
/// # Errors
/// This function may return an error in the following scenarios:
/// - The `Cargo.toml` file is missing or cannot be read.
/// - The `workspace.members` field is missing or improperly formatted.
/// - Errors occur while expanding glob patterns in the `workspace.members` field.
pub fn get_workspace_crates() -> Result<Vec<String>> {
    let content = fs::read_to_string(Path::new(".").join("Cargo.toml"))?;
    let workspace: toml::Value = toml::from_str(&content)?;

    let members = workspace
        .get("workspace")
        .and_then(|ws| ws.get("members"))
        .and_then(|m| m.as_array())
        .ok_or_else(|| anyhow::anyhow!("Failed to parse workspace members from Cargo.toml"))?;

    let mut crates = Vec::new();
    for member in members.iter().filter_map(toml::Value::as_str) {
        if member.contains('*') {
            for entry in glob::glob(member)?.flatten() {
                if let Some(name) = entry.file_name().and_then(|n| n.to_str()) {
                    crates.push(name.to_string());
                }
            }
        } else {
            crates.push(member.to_string());
        }
    }

    crates.retain(|name| name != XTASK_CRATE);
    crates.sort();
    Ok(crates)
}

/// Discovers the demo applications.
///
/// Every subdirectory of `demos` with a `Cargo.toml` file is a standalone demo
/// project, outside of the workspace so its dependencies do not leak into the
/// library crates.
///
/// # Errors
///
/// Returns an error if the demos directory cannot be scanned
pub fn get_all_demos() -> Result<Vec<String>> {
    let demos_dir = Path::new(DEMOS_DIR);
    if !demos_dir.exists() {
        return Ok(vec![]);
    }

    let mut demos = Vec::new();
    for entry in fs::read_dir(demos_dir)? {
        let path = entry?.path();
        if path.join("Cargo.toml").exists()
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
        {
            demos.push(format!("{DEMOS_DIR}/{name}"));
        }
    }
    demos.sort();
    Ok(demos)
}
