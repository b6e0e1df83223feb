//! Interactive configuration wizard for creating `chapbook.toml`.
//!
//! Starts from whatever configuration already exists (or the defaults) so re-running the
//! wizard only asks the user to confirm what they already chose.

use crate::config::{Configuration, CONFIG_FILE};
use crate::layout::bundled_code_styles;
use crate::source::CollisionPolicy;
use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input, Select};
use std::path::{Path, PathBuf};

/// Run the interactive configuration wizard, writing `chapbook.toml` into `work_dir`.
pub fn run(work_dir: &Path) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut config = Configuration::load(work_dir)?;

    config.book.name = Input::with_theme(&theme)
        .with_prompt("Book name")
        .with_initial_text(config.book.name.clone())
        .allow_empty(false)
        .interact_text()
        .with_context(|| "Failed to obtain book name")?;

    let location: String = Input::with_theme(&theme)
        .with_prompt("Book location")
        .default(config.book.location.display().to_string())
        .interact_text()
        .with_context(|| "Failed to obtain book location")?;
    config.book.location = PathBuf::from(location);

    let mut styles: Vec<String> = bundled_code_styles()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    if !styles.contains(&config.book.code_style) {
        styles.push(config.book.code_style.clone());
    }
    let current = styles
        .iter()
        .position(|s| s == &config.book.code_style)
        .unwrap_or_default();
    let style = FuzzySelect::with_theme(&theme)
        .with_prompt("Code style")
        .items(&styles)
        .default(current)
        .interact()
        .with_context(|| "Failed to obtain code style")?;
    config.book.code_style = styles[style].clone();

    config.fetch.document_type = Input::with_theme(&theme)
        .with_prompt("Chapter file type")
        .default(config.fetch.document_type.clone())
        .interact_text()
        .with_context(|| "Failed to obtain chapter file type")?;

    let policies = CollisionPolicy::all();
    let current = policies
        .iter()
        .position(|p| p == &config.fetch.on_collision)
        .unwrap_or_default();
    let policy = Select::with_theme(&theme)
        .with_prompt("When two chapters share a name")
        .items(policies)
        .default(current)
        .interact()
        .with_context(|| "Failed to obtain collision policy")?;
    config.fetch.on_collision = policies[policy];

    if Confirm::with_theme(&theme)
        .with_prompt("Do you want to change the HTML generator or PDF renderer commands?")
        .default(false)
        .interact()?
    {
        config.generator.command = Input::with_theme(&theme)
            .with_prompt("HTML generator command")
            .default(config.generator().command)
            .interact_text()
            .with_context(|| "Failed to obtain generator command")?;
        config.renderer.command = Input::with_theme(&theme)
            .with_prompt("PDF renderer command")
            .default(match config.renderer.command.as_str() {
                "" => "prince".to_string(),
                command => command.to_string(),
            })
            .interact_text()
            .with_context(|| "Failed to obtain renderer command")?;
    }

    let path = config.save(work_dir)?;
    println!("Wrote {} ({})", CONFIG_FILE, path.display());
    Ok(())
}
