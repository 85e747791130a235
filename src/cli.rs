use clap::{Parser, Subcommand};
use futures::future::join_all;
use log::info;
use tunelist::clients::{
    ArtworkClient, CatalogClient, TrackRecord, catalog::DEFAULT_ENTITY, http_client_from_env,
};
use tunelist::format::{format_minutes_seconds, format_minutes_seconds_millis};
use tunelist::screen::{
    ARTWORK_ERROR_PLACEHOLDER, ArtworkState, ConfigBuilder, DEFAULT_QUERY, ListState, Row,
    TrackScreen,
};

#[derive(Parser)]
#[command(name = "tunelist")]
#[command(version, about = "Search a music catalog and list the matching tracks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog and print the results
    Search {
        /// Search term
        #[arg(default_value = DEFAULT_QUERY)]
        term: String,
        /// Result entity to search for
        #[arg(long, default_value = DEFAULT_ENTITY)]
        entity: String,
        /// Catalog base URL, overrides TUNELIST_CATALOG_URL
        #[arg(long)]
        base_url: Option<String>,
        /// Skip artwork downloads
        #[arg(long)]
        no_artwork: bool,
        /// Print lengths with milliseconds
        #[arg(long)]
        precise: bool,
    },
}

struct SearchOptions {
    term: String,
    entity: String,
    base_url: Option<String>,
    no_artwork: bool,
    precise: bool,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            term,
            entity,
            base_url,
            no_artwork,
            precise,
        } => {
            search_tracks(SearchOptions {
                term,
                entity,
                base_url,
                no_artwork,
                precise,
            })
            .await
        }
    }
}

async fn search_tracks(opts: SearchOptions) -> Result<(), Box<dyn std::error::Error>> {
    info!("Building config ...");
    let catalog = match &opts.base_url {
        Some(base_url) => CatalogClient::new(http_client_from_env()?, base_url)?,
        None => CatalogClient::try_default()?,
    }
    .with_entity(opts.entity);
    let config = ConfigBuilder::new()
        .catalog(catalog)
        .artwork(ArtworkClient::try_default()?)
        .query(opts.term.as_str())
        .build()?;
    let screen = TrackScreen::new(config);

    let Some(list) = screen.on_appear().join().await else {
        return Ok(());
    };
    match list.state {
        ListState::Failed(kind) => {
            return Err(format!("could not load tracks ({kind:?} failure)").into());
        }
        ListState::Empty => {
            println!("No results for {:?}", opts.term);
            return Ok(());
        }
        ListState::Loaded => {}
    }

    if opts.no_artwork {
        for track in &list.tracks {
            print_track(track, None, opts.precise);
        }
        return Ok(());
    }

    let mut rows = screen.rows(&list.tracks).await;
    join_all(rows.iter_mut().map(|row| row.resolve())).await;
    for (track, row) in list.tracks.iter().zip(&rows) {
        print_track(track, Some(row), opts.precise);
    }
    info!("Cached {} artwork images", screen.cache().len().await);
    Ok(())
}

fn print_track(track: &TrackRecord, row: Option<&Row>, precise: bool) {
    let length = if precise {
        format_minutes_seconds_millis(track.track_time_millis)
    } else {
        format_minutes_seconds(track.track_time_millis)
    };
    println!("{}", track.track_name);
    println!("    {}", track.collection_name);
    println!("    length (minutes): {length}");
    if let Some(row) = row {
        match row.artwork() {
            ArtworkState::Ready(artwork) => {
                println!("    artwork: {}x{}", artwork.width(), artwork.height());
            }
            ArtworkState::Failed(_) => println!("    {ARTWORK_ERROR_PLACEHOLDER}"),
            ArtworkState::Loading | ArtworkState::Cancelled => {}
        }
    }
}
