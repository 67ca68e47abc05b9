//! markwise - Main Entry Point
//!
//! Command line front end for the rendering core: render previews, print
//! outlines and statistics, search documents and export highlight styles.

use clap::{Parser, Subcommand};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

use markwise::config::{load_config, Settings};
use markwise::editor::search_documents;
use markwise::error::{Error, Result};
use markwise::markdown::get_highlighter;
use markwise::{extract_toc, get_document_stats, DocumentOutline, MarkdownRenderer};

/// Application name constant.
const APP_NAME: &str = "markwise";

#[derive(Parser)]
#[command(name = "markwise")]
#[command(about = "Render Markdown previews, outlines and statistics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a Markdown file to HTML
    Render {
        /// Markdown file to render
        file: PathBuf,
        /// Do not number headings
        #[arg(long)]
        no_number: bool,
        /// Do not syntax highlight code blocks
        #[arg(long)]
        no_highlight: bool,
        /// Write HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the table of contents
    Toc {
        file: PathBuf,
        /// Do not number headings
        #[arg(long)]
        no_number: bool,
        /// Print source line numbers next to each entry
        #[arg(long)]
        lines: bool,
        /// Print JSON instead of an indented list
        #[arg(long)]
        json: bool,
    },
    /// Print word count, character count and reading time
    Stats {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Case-insensitive search across files
    Search {
        query: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the stylesheet for highlighted code blocks
    Css {
        /// syntect theme name (defaults to the configured code theme)
        #[arg(long)]
        theme: Option<String>,
        /// Prefer a dark fallback theme
        #[arg(long)]
        dark: bool,
        /// List available themes instead
        #[arg(long)]
        list: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = load_config();

    if let Err(e) = run(cli.command, &settings) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Render {
            file,
            no_number,
            no_highlight,
            output,
        } => {
            let content = read_document(&file)?;
            let mut options = settings.render_options();
            options.auto_number_headings &= !no_number;

            let mut renderer = MarkdownRenderer::new();
            if no_highlight || !settings.highlight_code {
                renderer = renderer.without_highlighting();
            }
            let html = renderer.render(&content, &options);

            match output {
                Some(path) => {
                    fs::write(&path, html)?;
                    info!("{}: wrote {}", APP_NAME, path.display());
                }
                None => print!("{}", html),
            }
        }
        Command::Toc {
            file,
            no_number,
            lines,
            json,
        } => {
            let content = read_document(&file)?;
            let mut options = settings.render_options();
            options.auto_number_headings &= !no_number;

            if lines {
                let outline = DocumentOutline::from_content(&content, &options);
                if json {
                    println!("{}", serde_json::to_string_pretty(&outline.items)?);
                } else {
                    for item in &outline.items {
                        println!("{:>5}  {}{}", item.line, indent(item.level), item.title);
                    }
                }
            } else {
                let toc = extract_toc(&content, &options);
                if json {
                    println!("{}", serde_json::to_string_pretty(&toc)?);
                } else {
                    for item in &toc {
                        println!("{}{}  #{}", indent(item.level), item.title, item.anchor);
                    }
                }
            }
        }
        Command::Stats { file, json } => {
            let stats = get_document_stats(&read_document(&file)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", stats.format_compact());
            }
        }
        Command::Search { query, files } => {
            let mut documents = Vec::with_capacity(files.len());
            for path in &files {
                documents.push((path.display().to_string(), read_document(path)?));
            }
            let results = search_documents(
                documents
                    .iter()
                    .map(|(name, content)| (name.as_str(), content.as_str())),
                &query,
            );
            for document in &results {
                for hit in &document.matches {
                    println!(
                        "{}:{}:{}: {}",
                        document.name,
                        hit.line,
                        hit.match_start + 1,
                        hit.content
                    );
                }
            }
        }
        Command::Css { theme, dark, list } => {
            let highlighter = get_highlighter();
            if list {
                for name in highlighter.available_themes() {
                    println!("{}", name);
                }
                return Ok(());
            }
            let name = theme.or_else(|| settings.code_theme.clone()).unwrap_or_default();
            let dark = dark || settings.theme.is_dark();
            print!("{}", highlighter.css_for_theme(&name, dark)?);
        }
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn indent(level: u8) -> String {
    "  ".repeat(usize::from(level.saturating_sub(1)))
}
