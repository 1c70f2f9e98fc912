use crate::{Context, Result};
use std::path::Path;
use std::process::Command;

fn run(mut command: Command, what: &str) -> Result<()> {
    let status = command
        .status()
        .with_context(|| format!("Failed to execute {what}"))?;

    if !status.success() {
        anyhow::bail!("{what} failed");
    }

    Ok(())
}

fn ensure_exists(path: &str) -> Result<()> {
    if !Path::new(path).exists() {
        anyhow::bail!("Path does not exist: {path}");
    }

    Ok(())
}

pub fn run_cargo_build(manifest_path: &str, args: &[&str]) -> Result<()> {
    let mut command = Command::new("cargo");
    command.args(["build", "--manifest-path", manifest_path]);
    command.args(args);

    run(command, &format!("cargo build for {manifest_path}"))
}

/// Runs the tests of a crate, `ignored` adds the tests marked with `#[ignore]`
pub fn run_cargo_test(manifest_path: &str, ignored: bool) -> Result<()> {
    let mut command = Command::new("cargo");
    command.args(["test", "--all-features", "--manifest-path", manifest_path]);

    if ignored {
        command.args(["--", "--include-ignored"]);
    }

    run(command, &format!("cargo test for {manifest_path}"))
}

pub fn run_cargo_check(path: &str) -> Result<()> {
    ensure_exists(path)?;

    let mut command = Command::new("cargo");
    command.args(["check", "--all-targets"]).current_dir(path);

    run(command, &format!("cargo check for {path}"))
}

pub fn run_cargo_clippy(path: &str, args: &[&str]) -> Result<()> {
    ensure_exists(path)?;

    let mut command = Command::new("cargo");
    command.args(["clippy"]).current_dir(path);
    command.args(args);
    command.args(["--", "-D", "clippy::all", "-D", "clippy::pedantic"]);

    run(command, &format!("cargo clippy for {path}"))
}

pub fn run_cargo_fmt_check(path: &str) -> Result<()> {
    ensure_exists(path)?;

    let mut command = Command::new("cargo");
    command.args(["fmt", "--check"]).current_dir(path);

    run(command, &format!("cargo fmt check for {path}"))
}

pub fn run_cargo_fmt_fix(path: &str) -> Result<()> {
    ensure_exists(path)?;

    let mut command = Command::new("cargo");
    command.args(["fmt"]).current_dir(path);

    run(command, &format!("cargo fmt for {path}"))
}

pub fn run_cargo_clean(manifest_path: &str) -> Result<()> {
    Command::new("cargo")
        .args(["clean", "--manifest-path", manifest_path])
        .output()
        .with_context(|| format!("Failed to clean {manifest_path}"))?;

    Ok(())
}
