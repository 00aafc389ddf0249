//! Quire - inspect and exercise the navigation engine from the terminal.

#[cfg(not(target_arch = "wasm32"))]
mod cli;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use clap::{ColorChoice, Parser};
    use cli::{Cli, Commands};
    use quire::{SiteConfig, debug, logger};

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = if cli.config.exists() {
        SiteConfig::load(&cli.config)?
    } else if cli.config == Path::new("quire.toml") {
        debug!("config"; "no quire.toml, using defaults");
        SiteConfig::default()
    } else {
        anyhow::bail!("config file not found: {}", cli.config.display());
    };
    let config = Arc::new(config);

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => match cli.config.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };
    debug!("config"; "site root {}", root.display());

    match &cli.command {
        Commands::Resolve { paths, json } => cli::resolve::run_resolve(&config, paths, *json),
        Commands::Render { args } => cli::render::run_render(config.clone(), &root, args),
        Commands::Check { args } => cli::check::run_check(&config, &root, args),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
