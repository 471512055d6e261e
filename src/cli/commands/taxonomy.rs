//! Print the classifier's data tables.

use console::style;

use crate::services::classifier::{FAILURE_MARKERS, STATUS_TAXONOMY};

pub fn cmd_taxonomy() -> anyhow::Result<()> {
    println!("{}", style("Status headings").bold());
    for (heading, status) in STATUS_TAXONOMY {
        println!("  {:<56} {}", heading, status);
    }

    println!();
    println!("{}", style("Failure markers").bold());
    for (marker, kind) in FAILURE_MARKERS {
        println!("  {:<56} {:?}", marker, kind);
    }
    Ok(())
}
