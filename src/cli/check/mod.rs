//! Fragment check command.
//!
//! Scans fragment files in parallel and reports markup the engine would
//! silently work around or get wrong: duplicate ids, unpaired sidenotes,
//! gaps in subtitle variants, out-of-order headings, and route-table
//! fragments that do not exist.

mod report;
mod scan;

use std::path::{Path, PathBuf};

use anyhow::Result;
use jwalk::WalkDir;
use parking_lot::Mutex;
use rayon::prelude::*;

use quire::utils::{plural_count, plural_s};
use quire::{RouteTable, SiteConfig, log};

use super::args::CheckArgs;
use report::CheckReport;
use scan::{Finding, scan_fragment};

const IGNORED_FILES: &[&str] = &[".DS_Store"];

pub fn run_check(config: &SiteConfig, root: &Path, args: &CheckArgs) -> Result<()> {
    let report = Mutex::new(CheckReport::default());

    let files = if args.paths.is_empty() {
        let (files, missing) = collect_site_files(config, root);
        for (route, fragment) in missing {
            report.lock().add(
                &fragment,
                Finding {
                    severity: scan::Severity::Error,
                    target: route,
                    reason: "route fragment does not exist".into(),
                },
            );
        }
        files
    } else {
        collect_paths(&args.paths, root, &config.routes.content.suffix)?
    };

    if files.is_empty() && report.lock().error_count() == 0 {
        log!("check"; "no fragments found");
        return Ok(());
    }
    log!("check"; "checking {}", plural_count(files.len(), "fragment"));

    files.par_iter().for_each(|file| {
        let source = display_path(file, root);
        let findings = match std::fs::read_to_string(file) {
            Ok(html) => scan_fragment(&html),
            Err(err) => vec![Finding {
                severity: scan::Severity::Error,
                target: "<file>".into(),
                reason: err.to_string(),
            }],
        };
        if findings.is_empty() {
            return;
        }
        let mut report = report.lock();
        for finding in findings {
            report.add(&source, finding);
        }
    });

    let report = report.into_inner();
    report.print();
    eprintln!();
    log!("check"; "{}", report);

    let errors = report.error_count();
    if errors > 0 && !args.warn_only {
        anyhow::bail!("check failed: {} error{}", errors, plural_s(errors));
    }
    Ok(())
}

/// Every routed fragment plus the content directory.
///
/// Returns the files to scan and the `(route, fragment)` pairs whose file
/// is missing.
fn collect_site_files(config: &SiteConfig, root: &Path) -> (Vec<PathBuf>, Vec<(String, String)>) {
    let table = RouteTable::from_config(&config.routes);
    let mut files = Vec::new();
    let mut missing = Vec::new();

    for (route, fragment) in table.fragments() {
        let path = root.join(fragment);
        if path.is_file() {
            files.push(path);
        } else {
            missing.push((route.to_string(), fragment.to_string()));
        }
    }

    let content = &config.routes.content;
    if content.enable {
        let dir = root.join(&content.dir);
        if dir.is_dir() {
            files.extend(collect_fragments(&dir, &content.suffix));
        }
    }

    files.sort();
    files.dedup();
    (files, missing)
}

fn collect_paths(paths: &[PathBuf], root: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let resolved = if path.exists() { path.clone() } else { root.join(path) };
        if resolved.is_file() {
            files.push(resolved);
        } else if resolved.is_dir() {
            files.extend(collect_fragments(&resolved, suffix));
        } else {
            anyhow::bail!(
                "Path not found: {}\n  Tried:\n    - {}\n    - {}",
                path.display(),
                path.display(),
                root.join(path).display()
            );
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Files under `dir` ending in `suffix`.
fn collect_fragments(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name) && name.ends_with(suffix)
        })
        .map(|e| e.path())
        .collect()
}

fn display_path(file: &Path, root: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("_content");
        fs::create_dir_all(content.join("writing")).unwrap();
        fs::write(content.join("home.html"), "<p>home</p>").unwrap();
        fs::write(content.join("writing.html"), "<ul></ul>").unwrap();
        fs::write(content.join("writing").join("a.html"), "<h2>A</h2>").unwrap();
        fs::write(content.join("writing").join("notes.txt"), "not a fragment").unwrap();
        dir
    }

    #[test]
    fn test_collect_site_files_reports_missing_routes() {
        let dir = site();
        let (files, missing) = collect_site_files(&SiteConfig::default(), dir.path());

        let names: Vec<String> = files.iter().map(|f| display_path(f, dir.path())).collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|n| n.ends_with(".html")));
        assert_eq!(missing, [("/projects".to_string(), "_content/projects.html".to_string())]);
    }

    #[test]
    fn test_check_fails_on_errors() {
        let dir = site();
        let args = CheckArgs {
            paths: Vec::new(),
            warn_only: false,
        };
        // projects.html is missing
        assert!(run_check(&SiteConfig::default(), dir.path(), &args).is_err());

        fs::write(dir.path().join("_content/projects.html"), "<h2>P</h2>").unwrap();
        assert!(run_check(&SiteConfig::default(), dir.path(), &args).is_ok());
    }

    #[test]
    fn test_warn_only_and_explicit_paths() {
        let dir = site();
        let bad = dir.path().join("_content/writing/bad.html");
        fs::write(&bad, r#"<p id="x"></p><p id="x"></p>"#).unwrap();

        let strict = CheckArgs {
            paths: vec![PathBuf::from("_content/writing")],
            warn_only: false,
        };
        assert!(run_check(&SiteConfig::default(), dir.path(), &strict).is_err());

        let lenient = CheckArgs {
            warn_only: true,
            ..strict
        };
        assert!(run_check(&SiteConfig::default(), dir.path(), &lenient).is_ok());
    }
}
