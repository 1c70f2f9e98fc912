use crate::Result;
use crate::utils;

/// Runs `cargo check` over the workspace crates and the demos.
///
/// # Errors
///
/// Returns an error if any crate fails to check
pub fn check_all() -> Result<()> {
    utils::print_header("Checking workspace crates and all demos...");

    let crates = utils::get_workspace_crates()?;
    let demos = utils::get_all_demos()?;

    for path in crates.iter().chain(&demos) {
        utils::print_step("Checking", path);
        utils::run_cargo_check(path)?;
        utils::print_step_success(path);
    }

    utils::print_success("✓ All checks passed!");
    Ok(())
}
