use anyhow::Result;
use songlink_anisong::Config;
use songlink_core::triage;

use crate::prompt::StdinOperator;

pub fn run_triage(config: &Config) -> Result<()> {
    let db = super::open_database(config)?;

    let summary = triage::run_triage(&db, &mut StdinOperator)?;

    if !summary.outcomes.is_empty() {
        println!(
            "\n✓ Triage done: {} closed, {} still pending",
            summary.closed(),
            summary.still_pending()
        );
    }

    Ok(())
}
