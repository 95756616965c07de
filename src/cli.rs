//! Command-line interface definitions for Article Press.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. The config path can also come from the environment.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Article Press application.
///
/// # Examples
///
/// ```sh
/// # Print one article as HTML
/// article_press extract https://www.wsj.com/articles/some-story --index 3
///
/// # Print one article to PDF
/// article_press pdf https://hongkongfp.com/2021/02/01/story/ -o story.pdf
///
/// # Process a queue file
/// article_press batch --queue urls.txt --output-dir ./out --done done.txt
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, env = "ARTICLE_PRESS_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract one article and write it as self-contained HTML
    Extract {
        url: String,

        /// Sequence index prefixed to the title
        #[arg(short, long)]
        index: Option<String>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Extract one article and print it to PDF
    Pdf {
        url: String,

        /// Sequence index prefixed to the title
        #[arg(short, long)]
        index: Option<String>,

        /// Output PDF file
        #[arg(short, long)]
        output: String,
    },

    /// Print the plain-text paragraphs of one article
    Summary { url: String },

    /// Process every URL of a queue file
    Batch {
        /// Text file with one URL per line
        #[arg(short, long)]
        queue: String,

        /// Directory receiving the category folders and the manifest
        #[arg(short = 'd', long)]
        output_dir: String,

        /// File processed URLs are appended to
        #[arg(long)]
        done: Option<String>,

        /// Write HTML only
        #[arg(long)]
        no_pdf: bool,
    },
}
