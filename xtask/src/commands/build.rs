use crate::Result;
use crate::utils;

/// Builds the workspace library crates with optional feature flags.
///
/// # Arguments
///
/// * `all_features` - If true, builds with all features enabled
/// * `no_default_features` - If true, builds with no default features
///
/// # Errors
///
/// Returns an error if:
/// - Both `all_features` and `no_default_features` are true (conflicting flags)
/// - Failed to discover the workspace crates
/// - Cargo build command execution fails for any crate
pub fn build_crates(all_features: bool, no_default_features: bool) -> Result<()> {
    if all_features && no_default_features {
        utils::print_error("✗ Cannot specify both --all-features and --no-default-features");
        anyhow::bail!("Conflicting feature flags");
    }

    let (suffix, args): (&str, &[&str]) = if all_features {
        (" (with all features)", &["--all-features"])
    } else if no_default_features {
        (" (with no default features)", &["--no-default-features"])
    } else {
        ("", &[])
    };

    utils::print_header(format!("Building workspace crates{suffix}..."));

    for name in utils::get_workspace_crates()? {
        utils::print_step("Building", &name);

        if let Err(err) = utils::run_cargo_build(&format!("{name}/Cargo.toml"), args) {
            utils::print_step_error(&name);
            return Err(err);
        }

        utils::print_step_success(&name);
    }

    utils::print_success("✓ Workspace crates built successfully!");
    Ok(())
}

/// Builds every demo application found in the `demos` directory.
///
/// # Errors
///
/// Returns an error if the demos cannot be discovered or any of them fails to build
pub fn build_demos() -> Result<()> {
    utils::print_header("Building demos...");

    let demos = utils::get_all_demos()?;

    if demos.is_empty() {
        utils::print_warning("⚠ No demos found");
        return Ok(());
    }

    for demo in demos {
        utils::print_step("Building", &demo);

        if let Err(err) = utils::run_cargo_build(&format!("{demo}/Cargo.toml"), &[]) {
            utils::print_step_error(&demo);
            return Err(err);
        }

        utils::print_step_success(&demo);
    }

    utils::print_success("✓ All demos built successfully!");
    Ok(())
}
