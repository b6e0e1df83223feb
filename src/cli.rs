use crate::source::CollisionPolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Where the book's sources live, e.g. a git repository url
    pub url: String,
    /// Extension of the chapter files to extract (e.g. md, textile)
    #[clap(short = 't', long = "type")]
    pub document_type: Option<String>,
    /// Directory the `book/` layout lives in [default: the current directory]
    #[clap(short, long)]
    pub location: Option<PathBuf>,
    /// What to do when two chapters share a file name
    #[clap(long, value_enum)]
    pub on_collision: Option<CollisionPolicy>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BookArgs {
    /// Name of the book, used for the output file names
    #[clap(short, long)]
    pub name: Option<String>,
    /// Root of the book (the directory containing `layout/` and `output/`)
    #[clap(short, long)]
    pub book_location: Option<PathBuf>,
    /// Highlight stylesheet to use for code blocks
    #[clap(short, long)]
    pub code_style: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generates a chapbook.toml config file
    Config,
    /// Creates an empty book layout
    New {
        /// Directory to create the `book/` layout in [default: the current directory]
        #[clap(short, long)]
        location: Option<PathBuf>,
    },
    /// Moves the chapters of a remote book into an existing layout
    Fetch(FetchArgs),
    /// Creates a book layout and fetches a remote book into it
    Get(FetchArgs),
    /// Generates the HTML version of the book if it doesn't exist yet
    Html(BookArgs),
    /// Renders the book to PDF, generating the HTML first if needed
    Render(BookArgs),
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Log more detail (-v for debug, -vv for trace)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Commands,
}
