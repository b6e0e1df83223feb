use anyhow::{Context, Result};
use cli::{BookArgs, Cli, Commands, FetchArgs};
use config::Configuration;
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::RenderPipeline;
use project::BookProject;
use sinks::LayoutGenerator;
use source::{BookSource, BookSourceBuilder, GitRetriever, SourceFetcher};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod config_wizard;
mod error;
mod layout;
mod pipeline;
mod project;
mod sinks;
mod source;

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let work_dir =
        std::env::current_dir().with_context(|| "Failed to determine the current directory")?;

    match &cli.command {
        Commands::Config => config_wizard::run(&work_dir),
        Commands::New { location } => {
            let config = Configuration::load(&work_dir)?;
            let destination = location.clone().unwrap_or_else(|| work_dir.clone());
            let book_root = destination.join(&config.book.location);
            config
                .generator()
                .scaffold(&book_root)
                .with_context(|| format!("Failed to create a book in {}", book_root.display()))?;
            println!("Created {}", book_root.display());
            Ok(())
        }
        Commands::Fetch(args) => fetch(&work_dir, args, false),
        Commands::Get(args) => fetch(&work_dir, args, true),
        Commands::Html(args) => {
            let config = Configuration::load(&work_dir)?;
            let project = resolve_project(&config, &work_dir, args)?;
            let pipeline = RenderPipeline::new(config.generator(), config.renderer(&project));

            let progress = spinner("Generating HTML...");
            let generated = pipeline.ensure_html(&project);
            progress.finish_and_clear();

            if generated.with_context(|| "Failed to generate HTML")? {
                println!("  HTML: {}", project.html_path().display());
            } else {
                println!("  HTML: {} (already exists)", project.html_path().display());
            }
            Ok(())
        }
        Commands::Render(args) => {
            let config = Configuration::load(&work_dir)?;
            let project = resolve_project(&config, &work_dir, args)?;
            let mut pipeline = RenderPipeline::new(config.generator(), config.renderer(&project));

            let progress = spinner(&format!("Rendering {}...", project.name));
            let rendered = pipeline.render(&project);
            progress.finish_and_clear();
            let pdf = rendered.with_context(|| "Failed to render PDF")?;

            let size = std::fs::metadata(&pdf)
                .map(|m| {
                    byte_unit::Byte::from_u64(m.len())
                        .get_appropriate_unit(byte_unit::UnitType::Binary)
                        .to_string()
                })
                .unwrap_or_default();
            println!("  HTML: {}", project.html_path().display());
            println!("  PDF:  {} {size}", pdf.display());
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chapbook={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn spinner(message: &str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("can parse progress style"),
    );
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn resolve_project(config: &Configuration, work_dir: &Path, args: &BookArgs) -> Result<BookProject> {
    let mut project = config.project(work_dir)?;
    if let Some(location) = &args.book_location {
        project.location = work_dir.join(location);
    }
    if let Some(name) = &args.name {
        project.name = name.clone();
    }
    if let Some(code_style) = &args.code_style {
        project.code_style = code_style.clone();
    }
    Ok(project)
}

fn resolve_source(config: &Configuration, work_dir: &Path, args: &FetchArgs) -> Result<BookSource> {
    let destination = match &args.location {
        Some(location) => work_dir.join(location),
        None => work_dir.to_path_buf(),
    };
    BookSourceBuilder::default()
        .url(args.url.clone())
        .document_type(
            args.document_type
                .clone()
                .unwrap_or_else(|| config.fetch.document_type.clone()),
        )
        .destination_root(destination)
        .book_dir(config.book.location.clone())
        .build()
        .with_context(|| format!("Invalid book source {}", args.url))
}

fn fetch(work_dir: &Path, args: &FetchArgs, scaffold: bool) -> Result<()> {
    let config = Configuration::load(work_dir)?;
    let source = resolve_source(&config, work_dir, args)?;
    let fetcher = SourceFetcher::new(work_dir, GitRetriever)
        .on_collision(args.on_collision.unwrap_or(config.fetch.on_collision))
        .exclude(config.exclude_globs()?);

    let progress = spinner(&format!("Fetching {}...", source.url));
    let fetched = if scaffold {
        fetcher.fetch_and_return(&source, &config.generator())
    } else {
        fetcher.fetch(&source)
    };
    progress.finish_and_clear();

    let moved = fetched.with_context(|| format!("Failed to fetch {}", source.url))?;
    println!(
        "  {} chapter file(s) in {}",
        moved,
        source.chapters_dir().display()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn fetch_args(url: &str) -> FetchArgs {
        FetchArgs {
            url: url.to_string(),
            document_type: None,
            location: None,
            on_collision: None,
        }
    }

    #[test]
    fn fetch_and_render_share_the_configured_book_location() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        std::fs::write(
            dir.path().join(config::CONFIG_FILE),
            "[book]\nlocation = \"novel\"\n",
        )
        .expect("can write config");
        let config = Configuration::load(dir.path()).expect("can load config");

        let source = resolve_source(&config, dir.path(), &fetch_args("https://example.test/book.git"))
            .expect("can resolve source");
        let project = config.project(dir.path()).expect("can resolve project");

        assert_eq!(source.chapters_dir(), dir.path().join("novel/layout/chapters"));
        assert_eq!(source.chapters_dir(), project.chapters_dir());
    }

    #[test]
    fn default_book_location_is_book() {
        let config = Configuration::default();
        let source = resolve_source(&config, Path::new("/work"), &fetch_args("/srv/sample.git"))
            .expect("can resolve source");
        assert_eq!(source.book_root(), Path::new("/work/book"));
    }
}
