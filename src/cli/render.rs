//! `quire render`: run one navigation against the in-memory shell.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;

use quire::fragment::{compose, toc::outline};
use quire::shell::{MemoryShell, ShellState};
use quire::{HistoryMode, Host, NavOutcome, Session, SiteConfig, load_route, log};

use super::args::RenderArgs;

pub fn run_render(config: Arc<SiteConfig>, root: &Path, args: &RenderArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let session = Session::new(config.clone());
    let shell = MemoryShell::new(root, &config).with_viewport(args.width);
    let outcome = runtime.block_on(load_route(&session, &shell, &args.path, HistoryMode::Replace));
    let state = shell.state();

    match &outcome {
        NavOutcome::Loaded(path) => log!("nav"; "loaded {}", path),
        NavOutcome::NotFound => log!("route"; "{} not found", args.path),
        NavOutcome::Failed(message) => log!("error"; "{}", message),
        // Only one navigation runs here.
        NavOutcome::Superseded => anyhow::bail!("navigation to {} was superseded", args.path),
    }

    if args.html {
        println!("{}", state.content);
        return Ok(());
    }

    print_summary(&session, &shell, &state);
    Ok(())
}

fn print_summary(session: &Session, shell: &MemoryShell, state: &ShellState) {
    println!("{} {}", "title".bold(), state.title);

    let subtitle = state
        .header_layout
        .first()
        .and_then(|layout| layout.variant)
        .and_then(|idx| state.header.subtitles.get(idx));
    match subtitle {
        Some(subtitle) => println!("{} {} / {}", "header".bold(), state.header.title, subtitle),
        None => println!("{} {}", "header".bold(), state.header.title),
    }
    if state.header_layout.first().is_some_and(|l| l.stacked) {
        println!("{}", "  (stacked)".dimmed());
    }

    if let Some(link) = state.active_nav.and_then(|i| shell.links().get(i)) {
        println!("{} {}", "nav".bold(), link.label);
    }
    if let Some(hash) = &state.scroll_target {
        println!("{} #{}", "scroll".bold(), hash);
    }

    // The mounted HTML is already enhanced; composing it again is stable
    // and recovers the TOC without touching the shell.
    if let Ok(page) = compose(&state.content, &mut session.id_registry(shell.shell_ids()))
        && !page.toc.is_empty()
    {
        println!("{}", "toc".bold());
        for line in outline(&page.toc).lines() {
            println!("  {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_render_loaded_page() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("_content");
        fs::create_dir_all(&content).unwrap();
        fs::write(
            content.join("projects.html"),
            "<nav data-toc></nav><div data-toc-intro><h2>Engines</h2></div>",
        )
        .unwrap();

        let config = Arc::new(SiteConfig::default());
        let args = RenderArgs {
            path: "/projects".into(),
            html: false,
            width: 1024.0,
        };
        run_render(config, dir.path(), &args).unwrap();
    }

    #[test]
    fn test_render_missing_route_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(SiteConfig::default());
        let args = RenderArgs {
            path: "/nowhere".into(),
            html: true,
            width: 1024.0,
        };
        run_render(config, dir.path(), &args).unwrap();
    }
}
