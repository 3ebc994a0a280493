//! Command-line loader.
//!
//! # Responsibility
//! - Load a component root with the built-in implementations and print what
//!   was loaded.
//! - Exit non-zero when any component failed to load or activate.
//!
//! Usage: `chameleon <component-root> [bundle-root] [log-dir]`
//!
//! The configuration is read from `<component-root>/configuration.json` when
//! present.

use chameleon_core::{init_logging, level_from_mask, Loader, CONFIGURATION_FILE};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(root) = args.first().map(PathBuf::from) else {
        eprintln!("usage: chameleon <component-root> [bundle-root] [log-dir]");
        return ExitCode::from(2);
    };

    match run(&root, args.get(1).map(PathBuf::from), args.get(2).map(PathBuf::from)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(message) => {
            eprintln!("chameleon: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    root: &Path,
    bundle_root: Option<PathBuf>,
    log_dir: Option<PathBuf>,
) -> Result<bool, Box<dyn Error>> {
    let mut loader = Loader::new().with_config_file(root.join(CONFIGURATION_FILE))?;

    if let Some(log_dir) = log_dir {
        let log_dir = std::path::absolute(&log_dir)?;
        init_logging(level_from_mask(loader.config().log_level), &log_dir)?;
    }

    if let Some(bundle_root) = bundle_root {
        loader = loader.with_bundle_root(bundle_root);
    }
    let registry = loader.resolve_all(root)?;
    info!(
        "event=cli_load module=cli status=ok components={} failures={}",
        registry.component_count(),
        registry.failures().len()
    );

    for component in registry.components() {
        println!("component {} {}", component.identifier(), component.version());
    }
    for namespace in registry.namespaces() {
        println!(
            "extension-point {} extensions={}",
            namespace,
            registry.query(namespace).len()
        );
    }
    for bundle in registry.bundles() {
        println!(
            "bundle {} components={}",
            bundle.identifier(),
            bundle.components().len()
        );
    }

    if !registry.failures().is_empty() {
        for failure in registry.failures() {
            eprintln!("failed: {failure}");
        }
        return Ok(false);
    }

    registry.invoke_all()?;
    Ok(true)
}
