//! `folio build`: load every post under the posts directory and write a JSON
//! bundle the web front end reads.
//!
//! Output layout:
//! - `index.json`: site title, navigation constants and post summaries,
//!   newest first.
//! - `posts/<id>.json`: one full post (blocks included) per source file.

use anyhow::{Context, Result};
use colored::Colorize;
use folio_parse::nav::NavConfig;
use folio_parse::{Post, PostSummary, Severity};
use notify::{EventKind, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::config::{LoadedConfig, load_config};

/// Top-level `index.json` document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteIndex<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    site_title: Option<&'a str>,
    navigation: &'a NavConfig,
    posts: Vec<PostSummary>,
}

/// What a build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub posts: usize,
    pub errors: usize,
    pub out_dir: PathBuf,
}

pub fn handle_build(config_path: &Path, out_override: Option<&Path>, quiet: bool) -> Result<BuildReport> {
    let loaded = load_config(config_path)?;
    let out_dir = out_override.map_or_else(|| loaded.out_dir(), Path::to_path_buf);
    build_site(&loaded, &out_dir, quiet)
}

fn build_site(loaded: &LoadedConfig, out_dir: &Path, quiet: bool) -> Result<BuildReport> {
    let posts_dir = loaded.posts_dir();
    if !posts_dir.is_dir() {
        anyhow::bail!("Posts directory '{}' does not exist", posts_dir.display());
    }

    let sources = collect_sources(&posts_dir);
    tracing::debug!(count = sources.len(), dir = %posts_dir.display(), "Found post sources");

    let posts_out = out_dir.join("posts");
    let (resolved_out, resolved_posts) = (resolve(&posts_out)?, resolve(&posts_dir)?);
    if resolved_out.starts_with(&resolved_posts) || resolved_posts.starts_with(&resolved_out) {
        anyhow::bail!(
            "Output '{}' overlaps the posts directory '{}'; choose another outDir",
            posts_out.display(),
            posts_dir.display()
        );
    }

    let index_path = out_dir.join("index.json");
    let previous_ids = previous_post_ids(&index_path);

    std::fs::create_dir_all(&posts_out)
        .with_context(|| format!("Failed to create '{}'", posts_out.display()))?;

    let mut seen = HashSet::new();
    let mut summaries = Vec::new();
    let mut errors = 0;

    for path in &sources {
        let Some(id) = post_id(path) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            tracing::warn!(id, path = %path.display(), "Duplicate post id; skipping");
            continue;
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let loaded_post = Post::load(&id, &raw);

        // Print load diagnostics to stderr
        for diag in &loaded_post.diagnostics {
            if diag.severity == Severity::Error {
                errors += 1;
            }
            let line_info = match diag.line {
                Some(line) => format!("{}:{}", path.display(), line),
                None => path.display().to_string(),
            };
            eprintln!("{}: {}", line_info, diag.message);
        }

        let post = loaded_post.post;
        let post_path = posts_out.join(format!("{id}.json"));
        let json = serde_json::to_string_pretty(&post)?;
        std::fs::write(&post_path, json)
            .with_context(|| format!("Failed to write '{}'", post_path.display()))?;

        if !quiet {
            println!("  {} {} \u{2192} {}", "post".dimmed(), id, post_path.display()); // →
        }
        summaries.push(post.summary());
    }

    sort_newest_first(&mut summaries);

    let index = SiteIndex {
        site_title: loaded.config.site_title.as_deref(),
        navigation: &loaded.config.navigation,
        posts: summaries,
    };
    std::fs::write(&index_path, serde_json::to_string_pretty(&index)?)
        .with_context(|| format!("Failed to write '{}'", index_path.display()))?;

    // Only files a previous build listed are ours to remove.
    for stale in previous_ids.iter().filter(|id| !seen.contains(*id)) {
        let stale_path = posts_out.join(format!("{stale}.json"));
        if stale_path.is_file() {
            std::fs::remove_file(&stale_path)
                .with_context(|| format!("Failed to remove '{}'", stale_path.display()))?;
            tracing::debug!(id = %stale, "Removed output of deleted post");
        }
    }

    let report = BuildReport {
        posts: index.posts.len(),
        errors,
        out_dir: out_dir.to_path_buf(),
    };
    tracing::info!(posts = report.posts, errors, "Build finished");

    if !quiet {
        println!(
            "{} {} posts \u{2192} {}",
            "Built".green().bold(),
            report.posts,
            report.out_dir.display(),
        );
    }

    Ok(report)
}

/// Post ids listed by the `index.json` of an earlier build.
///
/// Ids that could name anything other than a file directly inside `posts/`
/// are ignored.
fn previous_post_ids(index_path: &Path) -> Vec<String> {
    #[derive(Deserialize)]
    struct Entry {
        id: String,
    }
    #[derive(Deserialize)]
    struct PreviousIndex {
        #[serde(default)]
        posts: Vec<Entry>,
    }

    let Ok(raw) = std::fs::read_to_string(index_path) else {
        return Vec::new();
    };
    match serde_json::from_str::<PreviousIndex>(&raw) {
        Ok(index) => index
            .posts
            .into_iter()
            .map(|entry| entry.id)
            .filter(|id| Path::new(id).file_name().is_some_and(|name| name == id.as_str()))
            .collect(),
        Err(e) => {
            tracing::warn!(path = %index_path.display(), "Ignoring unreadable previous index: {e}");
            Vec::new()
        }
    }
}

/// Absolute, symlink-free form of `path`, which need not exist yet.
fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Cannot resolve path '{}'", path.display()))?;

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing
        .canonicalize()
        .unwrap_or_else(|_| existing.to_path_buf());
    for name in missing.iter().rev() {
        if name == ".." {
            resolved.pop();
        } else {
            resolved.push(name);
        }
    }
    Ok(resolved)
}

/// Markdown files under `dir`, in a stable order.
fn collect_sources(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_markdown(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// Post ids are file stems, so `guides/scroll-spy.md` is `scroll-spy`.
fn post_id(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().to_string())
}

/// Newest date first; undated posts last; ties broken by id.
fn sort_newest_first(posts: &mut [PostSummary]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

/// Watch the posts directory for changes and rebuild on each save.
///
/// Debounces rapid events (e.g. editors that write in stages) with a 200ms window.
/// Ctrl+C exits cleanly.
pub fn watch_and_rebuild(config_path: &Path, out_override: Option<&Path>, quiet: bool) -> Result<()> {
    let loaded = load_config(config_path)?;
    let posts_dir = std::fs::canonicalize(loaded.posts_dir())
        .with_context(|| format!("Cannot resolve path '{}'", loaded.posts_dir().display()))?;

    println!(
        "{} {} for changes (Ctrl+C to stop)",
        "Watching".cyan().bold(),
        posts_dir.display()
    );

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&posts_dir, RecursiveMode::Recursive)?;

    let mut last_rebuild = Instant::now();
    let debounce = Duration::from_millis(200);

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                let relevant = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );
                let touches_post = event.paths.iter().any(|p| is_markdown(p));

                if relevant && touches_post && last_rebuild.elapsed() > debounce {
                    // Small delay to let the editor finish writing
                    std::thread::sleep(Duration::from_millis(50));

                    match handle_build(config_path, out_override, quiet) {
                        Ok(_) => {
                            last_rebuild = Instant::now();
                        }
                        Err(e) => {
                            eprintln!("{} {:#}", "Build error:".red().bold(), e);
                        }
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Keep looping
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}
