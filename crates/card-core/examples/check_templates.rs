//! Lint every layout JSON file given on the command line (or under the
//! default template directories) and print its diagnostics.
//!
//! A sibling `<name>.data.json` is used as the data document when present.

use card_core::config::EngineConfig;
use card_core::lint::{LintSeverity, lint_layout};
use card_core::parser::{parse_data, parse_layout};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let paths: Vec<PathBuf> = if args.len() > 1 {
        args[1..].iter().map(PathBuf::from).collect()
    } else {
        let mut paths = Vec::new();
        for dir in ["templates", "crates/card-core/tests/fixtures"] {
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if is_layout_file(&path) {
                        paths.push(path);
                    }
                }
            }
        }
        paths.sort();
        paths
    };

    let config = EngineConfig::default();
    let mut warnings = 0;
    let mut failed = 0;

    for path in &paths {
        let input = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("SKIP {}: {}", path.display(), e);
                continue;
            }
        };

        let doc = match parse_layout(&input) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("ERROR {}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        let data_path = path.with_extension("data.json");
        let data = fs::read_to_string(&data_path)
            .ok()
            .and_then(|s| parse_data(&s).ok())
            .unwrap_or_default();

        let diags = lint_layout(&doc, &data, &config);
        if diags.is_empty() {
            println!("✓ {}", path.display());
            continue;
        }
        println!("{}", path.display());
        for d in &diags {
            let level = match d.severity {
                LintSeverity::Warning => {
                    warnings += 1;
                    "warning"
                }
                LintSeverity::Info => "info",
            };
            println!("  {level}[{}] {}", d.rule, d.message);
        }
    }

    println!("\nChecked: {}, Warnings: {}, Failed: {}", paths.len(), warnings, failed);
    if failed > 0 {
        std::process::exit(1);
    }
}

fn is_layout_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.ends_with(".json") && !name.ends_with(".data.json") && name.contains("layout")
}
