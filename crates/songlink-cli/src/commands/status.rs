use anyhow::Result;
use songlink_anisong::Config;

pub fn show_status(config: &Config) -> Result<()> {
    let db = super::open_database(config)?;
    let counts = db.counts()?;

    println!("\n📊 Songlink Status\n");
    println!("  Database: {}", config.database_path.display());
    println!("  Artists: {}", counts.artists);
    println!("  Song groups: {}", counts.song_groups);
    println!("  Linked tracks: {}", counts.group_links);
    println!("  Anime rows: {}", counts.animes);
    println!("  Ungrouped anime rows: {}", counts.ungrouped_animes);
    println!("  Pending reports: {}", counts.pending_reports);

    if counts.ungrouped_animes > 0 {
        println!("\n  Run `songlink backfill` to group these rows");
    }
    if counts.pending_reports > 0 {
        println!("  Run `songlink triage` to review reports");
    }

    Ok(())
}
