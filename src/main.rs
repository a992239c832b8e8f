// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Toolchain Version Switcher (tcswitch) - Main Application
//!
//! Entry point for the tcswitch CLI. One invocation scans the installed
//! toolchains, resolves the requested version and activates the match,
//! publishing the selected version and install path.
//!
//! Exit codes:
//! - 0: toolchain selected (and activated unless `--dry-run`)
//! - 1: no installed toolchain matched, or another runtime error
//! - 2: invalid command line (reported by clap)
//! - 3: activation failed; the previous toolchain is still active

use std::error::Error;
use std::fs::OpenOptions;
use std::io::Write;
use std::process::exit;

use clap::Parser;

use tcswitch::{ActivationResult, Catalog, Layout, SelectError, current, logging, switch};

mod cli;

use cli::Cli;

/// Exit status for an activation failure
const EXIT_ACTIVATION_FAILED: i32 = 3;

/// Main application entry point
fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let layout =
        Layout::from_env().with_overrides(cli.search_path.as_deref(), cli.link.clone(), None);
    let catalog = Catalog::new(layout);

    let result = if cli.list {
        cmd_list(&catalog, cli.json)
    } else if cli.current {
        cmd_current(&catalog, cli.json)
    } else {
        cmd_switch(&cli.target_version, &catalog, cli.dry_run, cli.json)
    };

    if let Err(e) = result {
        eprintln!("tcswitch: {e}");
        let code = match e.downcast_ref::<SelectError>() {
            Some(SelectError::NoMatch { candidates, .. }) => {
                print_candidates(candidates);
                1
            }
            Some(SelectError::Activation(_)) => EXIT_ACTIVATION_FAILED,
            None => 1,
        };
        exit(code);
    }
}

// =============================================================================
// Command Implementation Functions
// =============================================================================

/// Resolve a version request and activate the match
///
/// Prints `version=` and `path=` lines (or a JSON object) and appends the
/// same lines to `$GITHUB_OUTPUT` when it is set.
fn cmd_switch(
    spec: &str,
    catalog: &Catalog,
    dry_run: bool,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let result = switch(spec, catalog, dry_run)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", output_lines(&result));
    }

    if let Some(output_file) = std::env::var_os("GITHUB_OUTPUT") {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&output_file)
            .map_err(|e| format!("Failed to open {}: {e}", output_file.to_string_lossy()))?;
        file.write_all(output_lines(&result).as_bytes())?;
    }

    Ok(())
}

/// List installed toolchains in scan order, marking the active one
fn cmd_list(catalog: &Catalog, json: bool) -> Result<(), Box<dyn Error>> {
    let installations = catalog.installations();

    if json {
        println!("{}", serde_json::to_string_pretty(installations)?);
        return Ok(());
    }

    if installations.is_empty() {
        return Err("No installed toolchains found".into());
    }

    let active = current(catalog.layout());
    for installation in installations {
        let marker = if active.as_deref() == Some(installation.install_path()) {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {} ({}) {}",
            installation.version(),
            installation.build_identifier(),
            installation.install_path().display()
        );
    }
    Ok(())
}

/// Show the toolchain the active link points at
fn cmd_current(catalog: &Catalog, json: bool) -> Result<(), Box<dyn Error>> {
    let layout = catalog.layout();
    let path = current(layout).ok_or_else(|| {
        format!(
            "No active toolchain link at {}",
            layout.link_path.display()
        )
    })?;

    let installation = catalog
        .installations()
        .iter()
        .find(|i| i.install_path() == path);

    match (installation, json) {
        (Some(installation), true) => {
            println!("{}", serde_json::to_string_pretty(installation)?);
        }
        (Some(installation), false) => print!(
            "{}",
            output_lines(&ActivationResult::from(installation))
        ),
        (None, true) => println!("{}", serde_json::json!({ "path": path })),
        (None, false) => println!("path={}", path.display()),
    }
    Ok(())
}

fn output_lines(result: &ActivationResult) -> String {
    format!(
        "version={}\npath={}\n",
        result.version,
        result.install_path.display()
    )
}

/// Print the full catalog so a failed request can be corrected
fn print_candidates(candidates: &[tcswitch::ToolchainInstallation]) {
    if candidates.is_empty() {
        eprintln!("No toolchains are installed");
        return;
    }

    eprintln!("Available toolchains:");
    for candidate in candidates {
        eprintln!(
            "  {} ({}) {}",
            candidate.version(),
            candidate.build_identifier(),
            candidate.install_path().display()
        );
    }
}
