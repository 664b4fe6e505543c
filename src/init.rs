use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE, FolioConfig};

/// Scaffold a new folio site at the given path.
///
/// Existing files are left untouched.
pub fn init_site(path: Option<&str>, quiet: bool) -> Result<()> {
    let target = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let site_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "my-blog".to_string());

    if !quiet {
        println!(
            "{} {} at {}",
            "Initializing".green().bold(),
            site_name,
            target.display()
        );
    }

    fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create '{}'", target.display()))?;

    let config = FolioConfig {
        site_title: Some(site_name.clone()),
        ..FolioConfig::default()
    };
    let config_json = serde_json::to_string_pretty(&config)? + "\n";
    write_new(&target.join(CONFIG_FILE), &config_json, quiet)?;

    let posts_dir = target.join(&config.posts_dir);
    fs::create_dir_all(&posts_dir)
        .with_context(|| format!("Failed to create '{}'", posts_dir.display()))?;
    write_new(&posts_dir.join("hello-world.md"), &generate_first_post(&site_name), quiet)?;

    if !quiet {
        println!();
        println!("{}", "Done! Next steps:".bold());
        println!("  1. Write posts in {}/", config.posts_dir);
        println!("  2. Run `folio build` to produce {}/index.json", config.out_dir);
    }

    Ok(())
}

fn write_new(path: &Path, content: &str, quiet: bool) -> Result<()> {
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().to_string(),
    );
    if path.exists() {
        if !quiet {
            println!("  {} {} (already exists)", "Skipped".yellow(), name);
        }
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Failed to write '{}'", path.display()))?;
    if !quiet {
        println!("  {} {}", "Created".green(), name);
    }
    Ok(())
}

fn generate_first_post(site_name: &str) -> String {
    format!(
        r#"---
title: Hello, World
category: Meta
tags: [intro]
---
# Welcome to {site_name}

This is your first post. Edit it, or add more files next to it.

## Writing posts

- Headings up to `###` show up in the table of contents
- Fenced code blocks take a language and a filename
- Tables, quotes and images work too

```rust main.rs
fn main() {{
    println!("Hello, world!");
}}
```

## Next steps

Run `folio validate posts/*.md` to check your front matter.
"#
    )
}
