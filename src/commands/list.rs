//! List commands implementation

use crate::backends;

/// List all backends compiled into this binary
pub fn list_backends() {
    let available = backends::available_backends();

    println!("Available backends:");
    println!();
    for b in &available {
        if b.aliases.is_empty() {
            println!("  {:8} - {}", b.name, b.description);
        } else {
            println!(
                "  {:8} - {} (aliases: {})",
                b.name,
                b.description,
                b.aliases.join(", ")
            );
        }
    }
}
