use anyhow::Result;
use songlink_anisong::Config;

pub fn run_backfill(config: &Config) -> Result<()> {
    let db = super::open_database(config)?;

    let pending = db.list_ungrouped_animes()?.len();
    if pending == 0 {
        println!("Every anime row already has a song group");
        return Ok(());
    }

    println!("Backfilling {} anime rows...", pending);
    let summary = db.backfill_groups()?;

    println!("\n✓ Backfill complete");
    println!("  Rows assigned: {}", summary.assigned);
    println!("  Via existing track links: {}", summary.from_existing_link);
    println!("  New track links: {}", summary.links_created);

    Ok(())
}
