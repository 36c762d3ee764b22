//! List command implementation

use crate::backends;

/// List all backends compiled into this binary
pub fn list_backends() {
    let backends = backends::available_backends();

    println!("Supported backends:");
    println!();
    for b in &backends {
        println!("  {:12} - {}", b.name, b.description);
        if !b.aliases.is_empty() {
            println!("  {:12}   aliases: {}", "", b.aliases.join(", "));
        }
    }
    if backends.is_empty() {
        println!("  (none, rebuild with the dummy or linux-gpio feature)");
    }
}
