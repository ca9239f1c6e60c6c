use anyhow::Result;
use clap::{Parser, Subcommand};
use one_gadget::commands::{
    check_update_command, import_build_command, init_home_command, list_builds_command,
    open_context, resolve_command, ResolveArgs,
};
use one_gadget::resolve_home;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "one_gadget=info,gadget_core=info";

/// One-gadget offset lookup for known C runtime builds.
///
/// This CLI is a thin wrapper around `gadget-core` (exposed in code as `gadget_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "one-gadget",
    version,
    about = "Find one-gadget offsets in known C runtime builds",
    long_about = None
)]
struct Cli {
    /// Resolver home directory (config, cache, build files).
    /// Defaults to `~/.one_gadget`.
    #[arg(long, global = true, env = "ONE_GADGET_HOME")]
    home: Option<String>,

    /// Base URL of a remote gadget lookup service; overrides `remote_url` in config.
    #[arg(long, global = true, env = "ONE_GADGET_REMOTE_URL")]
    remote_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve gadgets for a library file or a build id.
    ///
    /// A TARGET of exactly 40 lowercase hex characters is treated as a build
    /// id; anything else is a file path.
    Resolve {
        /// Build id or path to the library file.
        target: Option<String>,

        /// Look up by build id. Takes precedence over a file.
        #[arg(long)]
        build_id: Option<String>,

        /// Path to the library file.
        #[arg(long)]
        file: Option<String>,

        /// Skip the build-id fast path for files.
        #[arg(long, default_value_t = false)]
        force_file: bool,

        /// Refinement level; 0 keeps only the least-constrained gadgets.
        #[arg(long, short = 'l', default_value_t = 0, allow_negative_numbers = true)]
        level: i32,

        /// Print offsets only, as space-separated decimal numbers.
        #[arg(long, default_value_t = false, conflicts_with = "json")]
        raw: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Import a JSON/YAML build file into the gadget cache.
    ImportBuild {
        /// Path to the build file.
        #[arg(long)]
        path: String,
    },

    /// List all builds in the gadget cache.
    ListBuilds {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Create the home directory, default config, and gadget cache.
    InitHome,

    /// Check whether a newer release is available.
    CheckUpdate {
        /// Turn update checks off for this home.
        #[arg(long, default_value_t = false)]
        disable: bool,
    },
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    let home = resolve_home(cli.home.as_deref())?;
    debug!(home = %home.display(), "using resolver home");

    match cli.command {
        Command::InitHome => {
            init_home_command(&home)?;
        }
        Command::Resolve { target, build_id, file, force_file, level, raw, json } => {
            let ctx = open_context(&home, cli.remote_url)?;
            let args = ResolveArgs { target, build_id, file, force_file, level, raw, json };
            resolve_command(&ctx, &args)?;
        }
        Command::ImportBuild { path } => {
            let ctx = open_context(&home, cli.remote_url)?;
            import_build_command(&ctx, &path)?;
        }
        Command::ListBuilds { json } => {
            let ctx = open_context(&home, cli.remote_url)?;
            list_builds_command(&ctx, json)?;
        }
        Command::CheckUpdate { disable } => {
            let ctx = open_context(&home, cli.remote_url)?;
            check_update_command(&ctx, disable)?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays machine-readable; `RUST_LOG` overrides the default.
fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    Ok(())
}
