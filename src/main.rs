use std::path::PathBuf;

use log::info;

use movierack::config_persistence::{default_config_path, load_config_file, persist_config_file};
use movierack::movie_list_manager::MovieListManager;
use movierack::{Collaborators, EntryKind};

fn kind_label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Video => "video",
        EntryKind::Audio => "audio",
        EntryKind::Playlist => "playlist",
        EntryKind::DiscStructure => "disc",
        EntryKind::Directory => "dir",
        EntryKind::Up => "up",
        EntryKind::Trash => "trash",
        EntryKind::LatestRecordings => "latest",
        EntryKind::Bookmark => "bookmark",
        EntryKind::VlcRoot | EntryKind::VlcServer | EntryKind::VlcDirectory => "network",
        EntryKind::UnknownVirtual => "unknown",
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Info);
    clog.init();

    let config_path = default_config_path();
    let mut config = load_config_file(&config_path);
    if !config_path.exists() {
        info!(
            "Config file not found. Creating default config. path={}",
            config_path.display()
        );
        persist_config_file(&config, &config_path);
    }

    // An explicit directory argument overrides the configured home path.
    if let Some(path) = std::env::args().nth(1) {
        config.paths.home_path = path;
    }

    let home = PathBuf::from(&config.paths.home_path);
    let mut manager = MovieListManager::new(config, Collaborators::default())?;
    if !manager.reload(&home) {
        return Err(format!("cannot load {}", home.display()).into());
    }

    let date_format = manager.config().display.date_format.clone();
    println!("{}", home.display());
    for index in 0..manager.len() {
        let progress = manager.progress_at(index, 0, false).unwrap_or(0);
        let entry = manager.entry_at(index).expect("index is in range");
        let date = entry
            .recorded_at
            .map(|date| date.format(&date_format).to_string())
            .unwrap_or_default();
        println!(
            "{:>8}  {:>10}  {:>4}%  {}",
            kind_label(entry.kind),
            date,
            progress,
            entry.title
        );
    }
    info!("{} entries", manager.len());
    Ok(())
}
