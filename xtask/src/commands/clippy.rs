use crate::Result;
use crate::utils;

/// Runs Clippy linting with strict rules on all code in the project.
///
/// Every workspace crate is linted twice, with all features and without default
/// features, demos are linted with their default features. Lints include
/// `clippy::all` and `clippy::pedantic`.
///
/// # Errors
///
/// Returns an error if:
/// - Cargo clippy command execution fails
/// - Clippy finds any linting violations
/// - Failed to discover crates or demos
pub fn run_clippy() -> Result<()> {
    utils::print_header("Running Clippy with strict linting on all code...");

    for name in utils::get_workspace_crates()? {
        clippy_run(&name, "all features", &["--all-targets", "--all-features"])?;
        clippy_run(&name, "no default features", &["--no-default-features"])?;
    }

    for demo in utils::get_all_demos()? {
        clippy_run(&demo, "default features", &[])?;
    }

    utils::print_success("✓ All Clippy checks passed!");
    Ok(())
}

fn clippy_run(path: &str, flavor: &str, args: &[&str]) -> Result<()> {
    let target = format!("{path} ({flavor})");

    utils::print_step("Clippy", &target);

    if let Err(err) = utils::run_cargo_clippy(path, args) {
        utils::print_step_error(&target);
        return Err(err);
    }

    utils::print_step_success(&target);
    Ok(())
}
