//! `quire resolve`: print what each path maps to.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use quire::{CanonicalPath, RouteDescriptor, RouteTable, SiteConfig, normalize};

/// One resolved path, as printed by `--json`.
#[derive(Debug, Serialize)]
struct Resolution<'a> {
    input: &'a str,
    path: CanonicalPath,
    route: Option<RouteDescriptor>,
}

fn resolve_all<'a>(table: &RouteTable, paths: &'a [String]) -> Vec<Resolution<'a>> {
    paths
        .iter()
        .map(|input| {
            let path = normalize(input);
            let route = table.resolve(&path);
            Resolution { input, path, route }
        })
        .collect()
}

pub fn run_resolve(config: &SiteConfig, paths: &[String], json: bool) -> Result<()> {
    let table = RouteTable::from_config(&config.routes);
    let resolved = resolve_all(&table, paths);

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    for r in &resolved {
        match &r.route {
            Some(route) => {
                let canonical = route.canonical_or(&r.path);
                print!("{} {} {}", r.path.cyan(), "→".dimmed(), route.fragment);
                if canonical != r.path {
                    print!(" {}", format!("(canonical {canonical})").dimmed());
                }
                if let Some(title) = &route.title {
                    print!(" {}", format!("\"{title}\"").dimmed());
                }
                println!();
            }
            None => println!("{} {} {}", r.path.cyan(), "→".dimmed(), "not found".red()),
        }
    }
    Ok(())
}
