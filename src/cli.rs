// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
// CLI argument definitions for tcswitch
//
// Separated from main.rs so that build.rs can include this file
// to generate the man page via clap_mangen.

use std::path::PathBuf;

use clap::Parser;

/// CLI argument parser - bools required for clap flag parsing
#[derive(Parser)]
#[command(
    name = "tcswitch",
    version,
    about = "Select and activate an installed toolchain version",
    disable_version_flag = true
)]
#[command(arg(clap::Arg::new("version").long("version").action(clap::ArgAction::Version).help("Print version")))]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Version to activate: "14", "14.3", "15.0.1", a build label, or empty for the latest
    #[arg(value_name = "VERSION", default_value = "")]
    pub target_version: String,

    /// List installed toolchains
    #[arg(short = 'l', long = "list", conflicts_with_all = ["current", "dry_run"])]
    pub list: bool,

    /// Show the currently active toolchain
    #[arg(short = 'c', long = "current", conflicts_with_all = ["list", "dry_run"])]
    pub current: bool,

    /// Resolve the version without activating it
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Print results as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Colon-separated directories to scan instead of the platform default
    #[arg(long = "search-path", value_name = "DIRS")]
    pub search_path: Option<String>,

    /// Active-toolchain link to update instead of the platform default
    #[arg(long = "link", value_name = "PATH")]
    pub link: Option<PathBuf>,

    /// Make the operation more talkative
    #[arg(short, long)]
    pub verbose: bool,
}
