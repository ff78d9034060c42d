use patchsmith::cli::commands::{CliArgs, Commands};
use patchsmith::cli::handlers::{handle_build, handle_patches};
use patchsmith::util::logging::{init_logging, LoggingConfig};
use patchsmith::VERSION;

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(&LoggingConfig::from_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("patchsmith v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Build(build_args) => handle_build(build_args, args.quiet).await,
        Commands::Patches(patches_args) => handle_patches(patches_args).await,
    };

    std::process::exit(exit_code);
}
