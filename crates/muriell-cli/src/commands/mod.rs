pub mod activity;
pub mod checkin;
pub mod config;
pub mod context;
pub mod habit;
pub mod stats;
pub mod task;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
