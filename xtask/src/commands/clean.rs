use crate::Result;
use crate::utils;

/// Cleans all build artifacts of the workspace and the demos.
///
/// # Errors
///
/// Returns an error if:
/// - Failed to discover demos
/// - Cargo clean command execution fails for the workspace
/// - Critical cleanup operations fail (demo cleanup failures are ignored)
pub fn clean_all() -> Result<()> {
    utils::print_header("Cleaning all build artifacts...");

    utils::run_cargo_clean("Cargo.toml")?;

    for demo in utils::get_all_demos()? {
        let _ = utils::run_cargo_clean(&format!("{demo}/Cargo.toml"));
    }

    utils::print_success("✓ All build artifacts cleaned!");
    Ok(())
}
