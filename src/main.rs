use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;

use podkeep::{
    fetch, fetch_all, fetch_latest, play, play_latest, play_random, store, synchronize,
    synchronize_all, ChapterRef, Config, ConfigError, PlayTarget, Podcast,
};

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

/// A simple podcast client that runs on the command line
#[derive(Parser, Debug)]
#[command(name = "podkeep")]
#[command(about = "A simple podcast client that runs on the command line")]
#[command(version)]
struct Cli {
    /// Configuration file to use instead of the default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synchronize the chapter cache for one podcast, or for all of them
    Sync {
        /// Podcast identifier from the configuration file
        podcast: Option<String>,
    },

    /// List configured feeds, or the chapters of one podcast
    List {
        /// Podcast identifier from the configuration file
        podcast: Option<String>,
    },

    /// Fetch a remote chapter (the newest one when no index is given)
    Fetch {
        /// Podcast identifier from the configuration file
        podcast: Option<String>,

        /// 1-based chapter index as shown by `list`, or a chapter URL
        chapter: Option<ChapterRef>,

        /// Apply to every configured podcast
        #[arg(long)]
        all: bool,
    },

    /// Play a fetched chapter (the latest one when no index is given)
    Play {
        /// Podcast identifier from the configuration file
        podcast: String,

        /// 1-based chapter index as shown by `list`, or a filename in
        /// the podcast's media directory
        chapter: Option<PlayTarget>,
    },

    /// Play a random fetched chapter
    PlayRandom {
        /// Podcast identifier from the configuration file
        podcast: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e @ ConfigError::TemplateCreated { .. }) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_USAGE);
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Sync { podcast } => cmd_sync(config, podcast.as_deref()),
        Commands::List { podcast } => cmd_list(config, podcast.as_deref()),
        Commands::Fetch {
            podcast,
            chapter,
            all,
        } => cmd_fetch(config, podcast.as_deref(), chapter, all),
        Commands::Play { podcast, chapter } => cmd_play(config, &podcast, chapter),
        Commands::PlayRandom { podcast } => cmd_play_random(config, &podcast),
    }
}

fn cmd_sync(config: &Config, podcast_id: Option<&str>) -> Result<()> {
    let Some(id) = podcast_id else {
        let report = synchronize_all(config);
        for (id, count) in &report.synced {
            println!("Synchronized feed {} - {} chapters available", id.cyan(), count);
        }
        for (id, e) in &report.failed {
            eprintln!(
                "{} failed to synchronize \"{}\": {}",
                "error:".red().bold(),
                id,
                report_chain(e)
            );
        }
        if !report.failed.is_empty() {
            bail!(
                "{} of {} feeds failed to synchronize",
                report.failed.len(),
                config.feeds().len()
            );
        }
        return Ok(());
    };

    println!("Synchronizing feed {}", id.cyan());
    let podcast = Podcast::open(config, id)?;
    let count =
        synchronize(&podcast).with_context(|| format!("failed to synchronize \"{}\"", id))?;
    println!("  {} chapters available", count);
    Ok(())
}

fn cmd_list(config: &Config, podcast_id: Option<&str>) -> Result<()> {
    let Some(id) = podcast_id else {
        println!("{}", "Podcast feeds available:".bold());
        println!();
        for (id, url) in config.feeds() {
            println!("    {} - {}", id.cyan(), url.dimmed());
        }
        println!();
        return Ok(());
    };

    let podcast = Podcast::open(config, id)?;

    println!(
        "{} {}:",
        "Fetched files available for".bold(),
        id.cyan()
    );
    println!();
    let fetched = store::fetched_chapters(&podcast)?;
    for (count, path) in fetched.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        println!("    {}: {}", count + 1, name);
    }
    if fetched.is_empty() {
        println!("    **** No fetched files.");
    }
    println!();

    println!(
        "{} {} (as listed by the feed, newest first):",
        "Remote files available for".bold(),
        id.cyan()
    );
    println!();
    let remote = store::remote_chapters(&podcast)?;
    for (count, chapter) in remote.iter().enumerate() {
        let name = chapter
            .url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or(chapter.url.as_str());
        match &chapter.published {
            Some(published) => println!(
                "    {}: {} ({})",
                count + 1,
                name,
                format_published(published).dimmed()
            ),
            None => println!("    {}: {}", count + 1, name),
        }
    }
    if remote.is_empty() {
        println!("    **** No remote files. Try running `podkeep sync` first.");
    }
    println!();
    Ok(())
}

fn cmd_fetch(
    config: &Config,
    podcast_id: Option<&str>,
    chapter: Option<ChapterRef>,
    all: bool,
) -> Result<()> {
    if all {
        let report = fetch_all(config, chapter.as_ref());
        for (id, path) in &report.fetched {
            println!("{} {} - {}", "saved".green(), id.cyan(), path.display());
        }
        for (id, e) in &report.failed {
            eprintln!(
                "{} failed to fetch for \"{}\": {}",
                "error:".red().bold(),
                id,
                report_chain(e)
            );
        }
        if !report.failed.is_empty() {
            bail!(
                "{} of {} podcasts failed to fetch",
                report.failed.len(),
                config.feeds().len()
            );
        }
        return Ok(());
    }

    let Some(id) = podcast_id else {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "a PODCAST argument is required unless --all is given",
            )
            .exit()
    };

    match &chapter {
        Some(ChapterRef::Index(index)) => println!("Fetching chapter {} for {}", index, id.cyan()),
        Some(ChapterRef::Url(url)) => println!("Fetching {} for {}", url, id.cyan()),
        None => println!("Fetching the latest chapter available for {}", id.cyan()),
    }
    let podcast = Podcast::open(config, id)?;
    let path = match &chapter {
        Some(chapter) => fetch(config, &podcast, chapter),
        None => fetch_latest(config, &podcast),
    }
    .with_context(|| format!("failed to fetch for \"{}\"", id))?;
    println!("  {} {}", "saved".green(), path.display());
    Ok(())
}

fn cmd_play(config: &Config, podcast_id: &str, chapter: Option<PlayTarget>) -> Result<()> {
    let podcast = Podcast::open(config, podcast_id)?;
    match &chapter {
        Some(target) => {
            match target {
                PlayTarget::Index(index) => {
                    println!("Playing chapter {} for {}", index, podcast_id.cyan())
                }
                PlayTarget::File(name) => println!("Playing {} for {}", name, podcast_id.cyan()),
            }
            play(config, &podcast, target)?;
        }
        None => {
            println!(
                "Playing the latest chapter fetched for {}",
                podcast_id.cyan()
            );
            play_latest(config, &podcast)?;
        }
    }
    Ok(())
}

fn cmd_play_random(config: &Config, podcast_id: &str) -> Result<()> {
    let podcast = Podcast::open(config, podcast_id)?;
    println!("Playing a random chapter fetched for {}", podcast_id.cyan());
    play_random(config, &podcast)?;
    Ok(())
}

/// Render an error together with its source chain, colon-separated,
/// matching how `{:#}` prints an `anyhow::Error`.
fn report_chain(e: &podkeep::Error) -> String {
    let mut rendered = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Render a feed publish timestamp as a plain date when it parses,
/// falling back to the raw string.
fn format_published(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc2822(raw)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
