use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use songlink_anisong::Config;

mod commands;
mod prompt;

#[derive(Debug, Parser)]
#[command(name = "songlink", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/songlink/songlink.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Bind a Spotify track to its AnisongDB song
    ///
    /// Confirms the track, searches AnisongDB for the exact song name, and
    /// lets you pick the matching entry. Every catalog entry for that song
    /// and artist list is stored, and the track and those rows are attached
    /// to the song's group in one transaction.
    Bind {
        /// Spotify track id (the base62 id, not the URL)
        track_id: String,
    },
    /// Remove a track's link and the anime rows of its group
    Unlink {
        /// Spotify track id
        track_id: String,
    },
    /// Walk pending user reports, oldest first
    ///
    /// For each report choose (s)kip, (w)ipe the song link, (r)emove the
    /// report, or (a)nilist relabel. A report is only closed when its
    /// action succeeds.
    Triage,
    /// Point every row of a catalog song at another AniList entry
    Relabel {
        /// AnisongDB song id (annSongId)
        ann_song_id: i64,
    },
    /// Manage artists
    #[command(subcommand)]
    Artist(ArtistCommands),
    /// Assign a song group to every anime row that has none
    Backfill,
    /// Show store statistics
    Status,
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, clap::Subcommand)]
enum ArtistCommands {
    /// Store a catalog artist and link it to a Spotify artist
    Add {
        /// Exact artist name as AnisongDB lists it
        name: String,
        /// Spotify artist id
        spotify_id: String,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Create the config file with defaults
    Init,
    /// Print an example config file
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Config(command) = &cli.command {
        return match command {
            ConfigCommands::Show => commands::config::show_config(cli.db),
            ConfigCommands::Path => commands::config::show_path(),
            ConfigCommands::Init => commands::config::init_config(),
            ConfigCommands::Example => commands::config::show_example(),
        };
    }

    let config = Config::load_with_db_path(cli.db)?;

    match cli.command {
        Commands::Bind { track_id } => commands::run_bind(&config, track_id).await?,
        Commands::Unlink { track_id } => commands::run_unlink(&config, track_id)?,
        Commands::Triage => commands::run_triage(&config)?,
        Commands::Relabel { ann_song_id } => commands::run_relabel(&config, ann_song_id)?,
        Commands::Artist(ArtistCommands::Add { name, spotify_id }) => {
            commands::run_artist_add(&config, &name, &spotify_id).await?;
        }
        Commands::Backfill => commands::run_backfill(&config)?,
        Commands::Status => commands::show_status(&config)?,
        Commands::Config(_) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_db_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["songlink", "status", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_artist_add_args() {
        let cli = Cli::try_parse_from(["songlink", "artist", "add", "Aoi Koga", "2uTf3MjHEyidMXyrIh5QzR"])
            .unwrap();
        match cli.command {
            Commands::Artist(ArtistCommands::Add { name, spotify_id }) => {
                assert_eq!(name, "Aoi Koga");
                assert_eq!(spotify_id, "2uTf3MjHEyidMXyrIh5QzR");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_relabel_requires_numeric_id() {
        assert!(Cli::try_parse_from(["songlink", "relabel", "abc"]).is_err());
    }
}
