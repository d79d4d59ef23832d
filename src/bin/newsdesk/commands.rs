use std::collections::HashSet;
use std::fs;

use anyhow::{Context, Result};
use spdlog::info;

use newsdesk::config::Config;
use newsdesk::newsroom::{Newsroom, PostFields};
use newsdesk::post::slug_for_title;

use crate::config::{generate_cfg, open_newsroom};
use crate::{BackupCommand, Cli, Command, PostArgs};

impl PostArgs {
    fn into_fields(self) -> Result<PostFields> {
        let content = match self.content_file {
            Some(path) => Some(fs::read_to_string(&path).with_context(|| format!("Could not read {}", path.display()))?),
            None => self.content,
        };
        Ok(PostFields {
            title: self.title,
            date: self.date,
            author: self.author,
            image: self.image,
            excerpt: self.excerpt,
            content,
            pdf: self.pdf,
            video: self.video,
        })
    }
}

pub(crate) fn run(cli: Cli, config: Option<&Config>) -> Result<()> {
    let room = || open_newsroom(config, cli.site_root.as_deref());

    match cli.command {
        Command::Slug { title } => println!("{}", slug_for_title(&title, &HashSet::new())),
        Command::InitConfig { path } => {
            let path = generate_cfg(path)?;
            println!("Sample configuration written to {}", path.display());
        }
        Command::List => list(&room()?)?,
        Command::Status => status(&room()?)?,
        Command::Show { slug } => println!("{}", room()?.get(&slug)?),
        Command::Open { slug } => println!("{}", room()?.post_file(&slug)?.display()),
        Command::New(args) => {
            let with_listing = !args.skip_listing;
            let post = room()?.create(args.into_fields()?, with_listing)?;
            println!("Created {}", post.file_name());
        }
        Command::Edit { slug, post } => {
            let with_listing = !post.skip_listing;
            let post = room()?.update(&slug, post.into_fields()?, with_listing)?;
            println!("Updated {}", post.file_name());
        }
        Command::Delete { slug, skip_listing } => {
            room()?.delete(&slug, !skip_listing)?;
            println!("Deleted {}", slug);
        }
        Command::Preview { slug } => println!("{}", room()?.preview(&slug)?.display()),
        Command::Reconcile { incremental: true } => {
            let added = room()?.sync_missing()?;
            println!("{} posts added to the index", added);
        }
        Command::Reconcile { incremental: false } => {
            let count = room()?.rebuild_index()?;
            println!("Index rebuilt with {} posts", count);
        }
        Command::Normalize => {
            let count = room()?.normalize_index()?;
            println!("{} posts normalized", count);
        }
        Command::Regenerate => {
            let count = room()?.regenerate_all()?;
            println!("{} pages regenerated", count);
        }
        Command::Listing { create } => {
            let path = room()?.update_listing(create)?;
            println!("Listing updated: {}", path.display());
        }
        Command::FixLinks => {
            let count = room()?.fix_links()?;
            println!("{} links fixed", count);
        }
        Command::Deploy { to } => {
            let report = room()?.deploy(to.as_deref())?;
            println!("Deployed {} pages, {} assets (index: {}, listing: {})",
                     report.pages, report.assets, report.index, report.listing);
            for missing in report.missing_assets.iter() {
                println!("MISSING {}", missing.display());
            }
        }
        Command::Backups(cmd) => backups(&room()?, cmd)?,
    }

    Ok(())
}

fn list(room: &Newsroom) -> Result<()> {
    let posts = room.posts()?;
    for post in posts.iter() {
        println!("{:<10}  {:<40}  {}", post.date, post.slug, post.title);
    }
    info!("{} posts in {}", posts.len(), room.layout.index_file.display());
    Ok(())
}

fn status(room: &Newsroom) -> Result<()> {
    let report = room.status()?;
    for (slug, present) in report.entries.iter() {
        let flag = if *present { "OK" } else { "MISSING" };
        println!("{:<8} {}", flag, slug);
    }
    for slug in report.orphans.iter() {
        println!("{:<8} {}", "ORPHAN", slug);
    }
    if report.is_clean() {
        println!("Index and pages are in sync");
    }
    Ok(())
}

fn backups(room: &Newsroom, cmd: BackupCommand) -> Result<()> {
    match cmd {
        BackupCommand::List => {
            for path in room.backups()? {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    println!("{}", name);
                }
            }
        }
        BackupCommand::Restore { name } => {
            room.restore_backup(&name)?;
            println!("Index restored from {}", name);
        }
        BackupCommand::Delete { name } => {
            room.delete_backup(&name)?;
            println!("Backup {} deleted", name);
        }
    }
    Ok(())
}
