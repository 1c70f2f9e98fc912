use crate::Colorize;

pub fn print_header(message: impl AsRef<str>) {
    println!("{}", message.as_ref().bright_blue().bold());
}

pub fn print_success(message: impl AsRef<str>) {
    println!("{}", message.as_ref().bright_green().bold());
}

pub fn print_warning(message: impl AsRef<str>) {
    println!("{}", message.as_ref().bright_yellow());
}

pub fn print_error(message: impl AsRef<str>) {
    eprintln!("{}", message.as_ref().bright_red().bold());
}

/// Prints `action target`, e.g. `Testing ntpc`
pub fn print_step(action: &str, target: &str) {
    println!("  {} {target}", action.bright_blue());
}

pub fn print_step_success(target: &str) {
    println!("  {} {target}", "✓".bright_green());
}

pub fn print_step_error(target: &str) {
    eprintln!("  {} {target}", "✗".bright_red());
}
