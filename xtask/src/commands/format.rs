use crate::Result;
use crate::utils;

/// Checks code formatting of the workspace crates and all demos
///
/// # Errors
///
/// Returns an error if any crate is not formatted
pub fn check_formatting() -> Result<()> {
    utils::print_header("Checking code formatting for workspace crates and all demos...");

    for path in format_targets()? {
        utils::print_step("Checking format", &path);
        utils::run_cargo_fmt_check(&path)?;
        utils::print_step_success(&path);
    }

    utils::print_success("✓ All formatting checks passed!");
    Ok(())
}

/// Formats the workspace crates and all demos
///
/// # Errors
///
/// Returns an error if `cargo fmt` fails on any crate
pub fn fix_formatting() -> Result<()> {
    utils::print_header("Fixing code formatting for workspace crates and all demos...");

    for path in format_targets()? {
        utils::print_step("Fixing format", &path);
        utils::run_cargo_fmt_fix(&path)?;
        utils::print_step_success(&path);
    }

    utils::print_success("✓ All formatting issues fixed!");
    Ok(())
}

fn format_targets() -> Result<Vec<String>> {
    let mut targets = utils::get_workspace_crates()?;

    targets.push("xtask".to_string());
    targets.extend(utils::get_all_demos()?);
    Ok(targets)
}
