//! Terminal output helpers shared by the commands

/// Print a banner message
pub fn print_banner(message: &str) {
    println!("🚀 {}", message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print an informational message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}
