use std::{fs, io, path::PathBuf};

use bytes::Bytes;
use clap::{ArgAction, Parser};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use flickr_search::{
    Client, FavouriteStore, FileStore, Photo, Searcher, Size,
    config::{self, Config},
    favourites, flickr,
};

#[derive(Debug, Error)]
enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Config(#[from] config::Error),

    #[error("{0}")]
    Favourites(#[from] favourites::Error),

    #[error("{}: {}", .0.alert().title, .0.alert().message)]
    Flickr(#[from] flickr::Error),

    #[error("Search was interrupted before it completed")]
    Interrupted,
}

type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Parser)]
#[command(name = "flickr-search", about = "Search Flickr and download photos")]
struct Cli {
    /// Text to search for
    term: Option<String>,

    /// Use large images instead of thumbnails
    #[arg(long)]
    large: bool,

    /// Save the images of every result to the configured folder
    #[arg(short, long)]
    download: bool,

    /// Mark a photo ID as favourite
    #[arg(long, value_name = "ID")]
    favourite: Vec<String>,

    /// Clear the favourite mark of a photo ID
    #[arg(long, value_name = "ID")]
    unfavourite: Vec<String>,

    /// List favourite photo IDs
    #[arg(long)]
    favourites: bool,

    /// Configuration folder holding .env and config.json
    #[arg(short, long, value_name = "DIR")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(verbosity: u8) {
    let level = log_level(verbosity);

    let filter = EnvFilter::from_default_env();
    let filter = match format!("flickr_search={level}").parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

async fn download_photos(client: &Client, photos: &[Photo], size: Size, config: &Config) -> Result<()> {
    let mut tasks = JoinSet::<flickr::Result<(Photo, Bytes)>>::new();
    for photo in photos {
        let client = client.clone();
        let photo = photo.clone();

        tasks.spawn(async move {
            let data = client.load_image_bytes(&photo, size).await?;

            Ok((photo, data))
        });
    }

    fs::create_dir_all(&config.folder)?;

    let photos = tasks.join_all().await;
    for photo in photos {
        let (photo, data) = photo?;

        let path = config
            .folder
            .join(format!("{}_{}.jpg", photo.id(), size.code()));

        fs::write(&path, &data)?;
        info!(path = %path.display(), "saved photo");
    }

    Ok(())
}

async fn search(cli: &Cli, term: &str, config: &Config, store: &FileStore) -> Result<()> {
    let size = if cli.large { Size::Large } else { config.size };

    let (mut searcher, mut deliveries) = Searcher::new(Client::new_from_env()?);
    searcher.search(term);

    let delivery = deliveries.recv().await.ok_or(Error::Interrupted)?;
    let result = delivery.outcome?;

    for photo in result.photos() {
        let mark = if photo.is_favourite(store) { "*" } else { " " };
        println!(
            "{mark} {:<12} {:<40} {}",
            photo.id(),
            photo.title(),
            searcher.client().endpoints().image_url(photo, size)
        );
    }

    if cli.download {
        download_photos(searcher.client(), result.photos(), size, config).await?;
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let folder = match &cli.config {
        Some(folder) => folder.clone(),
        None => config::default_config_folder().ok_or(config::Error::NoConfigFolder)?,
    };

    let config = config::configure(&folder)?;
    let store = FileStore::open(&config.favourites)?;

    for id in &cli.favourite {
        store.set(id, true)?;
    }

    for id in &cli.unfavourite {
        store.set(id, false)?;
    }

    if cli.favourites {
        for id in store.favourites() {
            println!("{id}");
        }
    }

    if let Some(term) = &cli.term {
        search(&cli, term, &config, &store).await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
