use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use spdlog::{error, warn};

use newsdesk::logger::{configure_logger, logs_to_console};

use crate::commands::run;
use crate::config::open_config;

mod commands;
mod config;
mod config_data;

const CFG_FILE_NAME: &str = "newsdesk.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site root directory, takes the place of paths.site_root
    #[arg(short, long)]
    site_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the posts in the index
    List,
    /// Reports index entries without a page and pages without an entry
    Status,
    /// Prints one post record
    Show { slug: String },
    /// Prints the path of the page of a post
    Open { slug: String },
    /// Creates a post dated today and writes its page
    New(PostArgs),
    /// Replaces fields of a post and rewrites its page
    Edit {
        slug: String,
        #[command(flatten)]
        post: PostArgs,
    },
    /// Removes a post from the index and deletes its page
    Delete {
        slug: String,
        /// Do not update the listing page
        #[arg(long)]
        skip_listing: bool,
    },
    /// Renders a post to the preview file
    Preview { slug: String },
    /// Rebuilds the index from the pages on disk
    Reconcile {
        /// Only add pages missing from the index
        #[arg(short, long)]
        incremental: bool,
    },
    /// Normalizes titles, dates, slugs and excerpts of the index
    Normalize,
    /// Rewrites every post page and the listing from the index
    Regenerate,
    /// Rewrites the news grid of the listing page
    Listing {
        /// Generate the listing page when it does not exist
        #[arg(long)]
        create: bool,
    },
    /// Repoints old blog links of the listing page to the news directory
    FixLinks,
    /// Copies the index, pages and assets to the publish directory
    Deploy {
        /// Publish directory, takes the place of deploy.publish_dir
        #[arg(long)]
        to: Option<PathBuf>,
    },
    /// Manages index backups
    #[command(subcommand)]
    Backups(BackupCommand),
    /// Prints the slug of a title
    Slug { title: String },
    /// Writes a sample configuration file
    InitConfig {
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum BackupCommand {
    /// Lists backups, newest first
    List,
    /// Replaces the index with a backup
    Restore { name: String },
    /// Deletes a backup
    Delete { name: String },
}

#[derive(Args, Debug)]
struct PostArgs {
    /// Title of the post
    #[arg(short, long)]
    title: Option<String>,

    /// Date, YYYY-MM-DD or DD/MM/YYYY
    #[arg(short, long)]
    date: Option<String>,

    /// Name of the author
    #[arg(short, long)]
    author: Option<String>,

    /// Image file name or path, or a youtube_<id>/vimeo_<id> marker
    #[arg(long)]
    image: Option<String>,

    /// Summary shown on the listing page
    #[arg(long)]
    excerpt: Option<String>,

    /// HTML content
    #[arg(long, conflicts_with = "content_file")]
    content: Option<String>,

    /// File holding the HTML content
    #[arg(long)]
    content_file: Option<PathBuf>,

    /// PDF attachment
    #[arg(long)]
    pdf: Option<String>,

    /// YouTube or Vimeo URL
    #[arg(long)]
    video: Option<String>,

    /// Do not update the listing page
    #[arg(long)]
    skip_listing: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match open_config(cli.config.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:#}", err);
            eprintln!("Please run newsdesk --help");
            return ExitCode::FAILURE;
        }
    };

    let log = config.as_ref().and_then(|c| c.log.as_ref());
    if let Err(err) = configure_logger(log) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    match run(cli, config.as_ref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            if !logs_to_console(log) {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}
