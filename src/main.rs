use anyhow::Result;
use clap::Parser;
use kegup::commands::{
    self, ConfigOverrides, OutdatedOptions, UpgradeOptions, UpgradeOutcome, Verbosity,
};
use kegup::package::PackageName;
use std::path::PathBuf;
use std::process::ExitCode;

/// kegup - plan and hand off package upgrades
///
/// Reads an inventory snapshot of installed packages, works out which are
/// outdated, and hands the resulting upgrade plan to an installer.
///
/// Examples:
///   kegup upgrade              # Upgrade everything outdated
///   kegup upgrade --ask wget   # Show sizes and confirm before upgrading wget
///   kegup outdated             # List outdated packages
#[derive(Parser, Debug)]
#[command(author, version = env!("KEGUP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Inventory snapshot to plan against (also via KEGUP_INVENTORY)
    #[arg(
        long = "inventory",
        env = "KEGUP_INVENTORY",
        value_name = "PATH",
        global = true
    )]
    pub inventory: Option<PathBuf>,

    /// Bottle metadata API URL (also via KEGUP_API_URL)
    #[arg(long = "api-url", env = "KEGUP_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Print less output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print more output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print debugging information
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Upgrade outdated packages
    Upgrade(UpgradeArgs),

    /// List outdated packages
    Outdated(OutdatedArgs),
}

#[derive(clap::Args, Debug)]
pub struct UpgradeArgs {
    /// Packages to upgrade; all outdated packages when omitted
    #[arg(value_name = "PACKAGE")]
    pub names: Vec<PackageName>,

    /// Show what would be upgraded without upgrading anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show the plan with its sizes and ask before upgrading
    #[arg(long)]
    pub ask: bool,

    /// Compile from source even when a bottle is available
    #[arg(short = 's', long)]
    pub build_from_source: bool,

    /// Install from a bottle even when it would not normally be used
    #[arg(long)]
    pub force_bottle: bool,

    /// Upgrade head installs when the upstream revision changed
    #[arg(long = "fetch-HEAD")]
    pub fetch_head: bool,

    /// Install without checking for previously installed versions
    #[arg(short, long)]
    pub force: bool,

    /// Download and patch, then open a shell instead of building
    #[arg(short, long)]
    pub interactive: bool,

    /// Keep temporary build files
    #[arg(long)]
    pub keep_tmp: bool,

    /// Generate debug symbols when building from source
    #[arg(long)]
    pub debug_symbols: bool,

    /// Overwrite conflicting files when linking
    #[arg(long)]
    pub overwrite: bool,

    /// Only consider formulae
    #[arg(long, conflicts_with = "cask")]
    pub formula: bool,

    /// Only consider casks
    #[arg(long)]
    pub cask: bool,

    /// Directory for hand-off documents (stdout when omitted)
    #[arg(long, value_name = "DIR")]
    pub handoff: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct OutdatedArgs {
    /// Packages to check; all installed packages when omitted
    #[arg(value_name = "PACKAGE")]
    pub names: Vec<PackageName>,

    /// Treat head installs as outdated when the upstream revision changed
    #[arg(long = "fetch-HEAD")]
    pub fetch_head: bool,

    /// Only list formulae
    #[arg(long, conflicts_with = "cask")]
    pub formula: bool,

    /// Only list casks
    #[arg(long)]
    pub cask: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose, self.debug)
    }

    fn log_filter(&self) -> &'static str {
        match self.verbosity() {
            Verbosity::Debug => "debug",
            Verbosity::Verbose => "info",
            _ => "warn",
        }
    }
}

impl UpgradeArgs {
    fn into_options(self, verbosity: Verbosity) -> UpgradeOptions {
        UpgradeOptions {
            names: self.names,
            dry_run: self.dry_run,
            ask: self.ask,
            build_from_source: self.build_from_source,
            force_bottle: self.force_bottle,
            fetch_head: self.fetch_head,
            force: self.force,
            interactive: self.interactive,
            keep_tmp: self.keep_tmp,
            debug_symbols: self.debug_symbols,
            overwrite: self.overwrite,
            formula: self.formula,
            cask: self.cask,
            verbosity,
            handoff: self.handoff,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when a per-package failure should set a non-zero exit code.
async fn run(cli: Cli) -> Result<bool> {
    let runtime = kegup::runtime::RealRuntime;
    let verbosity = cli.verbosity();
    let overrides = ConfigOverrides {
        inventory_path: cli.inventory,
        api_url: cli.api_url,
    };

    match cli.command {
        Commands::Upgrade(args) => {
            let options = args.into_options(verbosity);
            // Flag combinations are checked before any file is read
            options.validate()?;
            let config = commands::Config::load(&runtime, overrides)?;
            let report = commands::upgrade(&runtime, &config, options).await?;
            if report.outcome == UpgradeOutcome::Aborted {
                log::info!("Nothing was upgraded");
            }
            Ok(!report.failed)
        }
        Commands::Outdated(args) => {
            let config = commands::Config::load(&runtime, overrides)?;
            let options = OutdatedOptions {
                names: args.names,
                fetch_head: args.fetch_head,
                formula: args.formula,
                cask: args.cask,
                verbosity,
            };
            let failed = commands::outdated(&runtime, &config, options)?;
            Ok(!failed)
        }
    }
}
