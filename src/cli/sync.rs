use anyhow::Result;

use crate::config::Config;
use crate::docs::{DocSynchronizer, SyncMode};

pub fn run(config: &Config, full: bool) -> Result<()> {
    let mode = if full {
        SyncMode::Full
    } else {
        SyncMode::ListOnly
    };
    let report = DocSynchronizer::new(config).run(mode)?;
    report.print();
    // Failed removals and generations are reported, never fatal
    if report.has_failures() {
        println!(
            "Finished with {} failure(s), see the messages above",
            report.failure_count()
        );
    }
    Ok(())
}
