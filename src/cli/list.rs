use anyhow::Result;

use dumpcalc::calc::registry;

/// Print the registered calculations
pub fn run() -> Result<()> {
    for calc in registry() {
        let aliases = calc.aliases();
        if aliases.is_empty() {
            println!("{:<10} {}", calc.name(), calc.summary());
        } else {
            println!(
                "{:<10} {} (also: {})",
                calc.name(),
                calc.summary(),
                aliases.join(", ")
            );
        }
    }
    Ok(())
}
