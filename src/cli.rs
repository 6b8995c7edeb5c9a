use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::blog::config::load_config;
use crate::blog::paths::resolve_paths;
use crate::commands::blog_publish::PublishOptions;
use crate::commands::blog_render::RenderOptions;
use crate::commands::blog_show::ShowOptions;
use crate::commands::{
    CommandReport, EntrySelector, blog_init, blog_list, blog_publish, blog_render, blog_show,
    blog_status,
};

/// Personal log archive: numbered Markdown entries plus one JSON index.
#[derive(Parser, Debug)]
#[command(name = "gitblogger", version)]
struct Cli {
    /// Path to the index file (overrides GITBLOGGER_INDEX and the config file)
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Print the command report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty index if none exists
    Init,
    /// List titles newest first
    List,
    /// Show one entry's metadata and content
    Show {
        #[command(flatten)]
        select: SelectArgs,
        /// Render the content to HTML instead of printing Markdown
        #[arg(long)]
        html: bool,
    },
    /// Render one entry to HTML
    Render {
        #[command(flatten)]
        select: SelectArgs,
        /// Write the HTML to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Add a new entry to the archive
    Publish {
        #[arg(long)]
        title: String,
        /// Topic tag; repeat for several
        #[arg(long = "topic")]
        topics: Vec<String>,
        /// Markdown body to store as the entry's content.md
        #[arg(long)]
        content_file: Option<PathBuf>,
        /// Only record metadata; content.md is written by someone else
        #[arg(long, conflicts_with = "content_file")]
        metadata_only: bool,
    },
    /// Check the index and every entry's content file
    Status,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SelectArgs {
    /// Row in the newest-first listing (0 = newest)
    #[arg(long, allow_negative_numbers = true)]
    row: Option<i64>,
    /// Creation-order position (the content directory name)
    #[arg(long, allow_negative_numbers = true)]
    position: Option<i64>,
}

impl SelectArgs {
    fn selector(&self) -> EntrySelector {
        match (self.row, self.position) {
            (Some(row), _) => EntrySelector::Row(row),
            (None, Some(position)) => EntrySelector::Position(position),
            (None, None) => EntrySelector::Row(0),
        }
    }
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{} ok={}", report.command, report.ok);
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    if let Some(body) = &report.body {
        println!();
        print!("{body}");
    }
    Ok(())
}

/// Returns whether the command finished without issues.
pub fn run() -> Result<bool> {
    let cli = Cli::parse();
    let cfg = load_config()?;
    let paths = resolve_paths(cli.index.as_deref(), &cfg);

    let report = match &cli.command {
        Command::Init => blog_init::run(&paths)?,
        Command::List => blog_list::run(&paths)?,
        Command::Show { select, html } => blog_show::run(
            &paths,
            &ShowOptions {
                selector: select.selector(),
                html: *html,
            },
        )?,
        Command::Render { select, out } => blog_render::run(
            &paths,
            &RenderOptions {
                selector: select.selector(),
                out: out.clone(),
                html_title: cfg.render.html_title.clone(),
            },
        )?,
        Command::Publish {
            title,
            topics,
            content_file,
            metadata_only,
        } => blog_publish::run(
            &paths,
            &PublishOptions {
                title: title.clone(),
                topics: topics.clone(),
                content_file: content_file.clone(),
                metadata_only: *metadata_only,
            },
        )?,
        Command::Status => blog_status::run(&paths)?,
    };

    print_report(&report, cli.json)?;
    Ok(report.ok)
}
