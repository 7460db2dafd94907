//! qop-cloud Demo Suite
//!
//! Console helpers shared by the demo binaries. The demos talk to the real
//! cloud platform and need `QOP_EMAIL` / `QOP_PASSWORD` set.

use console::style;

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style(format!("━━ {title} ")).cyan().bold());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
}

/// Print a labelled result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {value}", style(format!("{label}:")).dim());
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {message}", style("✓").green().bold());
}
