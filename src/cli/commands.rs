use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fetches base apps and support tools, then builds patched apps
#[derive(Parser, Debug)]
#[command(
    name = "patchsmith",
    about = "Fetch base apps and build patched variants",
    version,
    author,
    long_about = "patchsmith downloads the base app for each target together with the \
                  shared patching tools, selects which catalog patches to apply, and runs \
                  the external builder once per target. A failing target never stops the \
                  remaining ones."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output and progress bars"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Download artifacts and build every target",
        long_about = "Runs the full pipeline for each target in order: catalog lookup, \
                      support tool and base app downloads, patch selection, build.\n\n\
                      Examples:\n  \
                      patchsmith build\n  \
                      patchsmith build --target reddit --target twitter\n  \
                      patchsmith build --exclude youtube=custom-branding\n  \
                      patchsmith build --work-dir /tmp/apks --skip-runtime-check"
    )]
    Build(BuildArgs),

    #[command(
        about = "List catalog patches for a target",
        long_about = "Loads the patch catalog and prints the rules and pinned version for \
                      one target. Nothing is downloaded besides the catalog.\n\n\
                      Examples:\n  \
                      patchsmith patches youtube\n  \
                      patchsmith patches reddit --json"
    )]
    Patches(PatchesArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        short = 't',
        long = "target",
        value_name = "TARGET",
        help = "Target to build (repeatable; defaults to PATCHSMITH_TARGETS)"
    )]
    pub targets: Vec<String>,

    #[arg(
        short = 'w',
        long,
        value_name = "DIR",
        help = "Directory for downloads and build outputs"
    )]
    pub work_dir: Option<PathBuf>,

    #[arg(
        short = 'e',
        long = "exclude",
        value_name = "TARGET=RULE",
        help = "Exclude a rule from a target's build (repeatable)"
    )]
    pub exclusions: Vec<String>,

    #[arg(long, value_name = "PROGRAM", help = "Program used to run the builder jar")]
    pub runtime: Option<String>,

    #[arg(long, value_name = "URL", help = "Patch catalog document URL")]
    pub catalog_url: Option<String>,

    #[arg(long, help = "Do not check the runtime before starting")]
    pub skip_runtime_check: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PatchesArgs {
    #[arg(value_name = "TARGET", help = "Target to list rules for")]
    pub target: String,

    #[arg(long, value_name = "URL", help = "Patch catalog document URL")]
    pub catalog_url: Option<String>,

    #[arg(long, help = "Print rules as JSON")]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_build_args() {
        let args = CliArgs::parse_from(["patchsmith", "build"]);
        match args.command {
            Commands::Build(build_args) => {
                assert!(build_args.targets.is_empty());
                assert!(build_args.work_dir.is_none());
                assert!(build_args.exclusions.is_empty());
                assert!(build_args.runtime.is_none());
                assert!(!build_args.skip_runtime_check);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_with_options() {
        let args = CliArgs::parse_from([
            "patchsmith",
            "build",
            "--target",
            "reddit",
            "-t",
            "twitter",
            "--work-dir",
            "/tmp/apks",
            "--exclude",
            "reddit=hide-ads",
            "--runtime",
            "/opt/jdk/bin/java",
            "--skip-runtime-check",
        ]);

        match args.command {
            Commands::Build(build_args) => {
                assert_eq!(build_args.targets, vec!["reddit", "twitter"]);
                assert_eq!(build_args.work_dir, Some(PathBuf::from("/tmp/apks")));
                assert_eq!(build_args.exclusions, vec!["reddit=hide-ads"]);
                assert_eq!(build_args.runtime.as_deref(), Some("/opt/jdk/bin/java"));
                assert!(build_args.skip_runtime_check);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_patches_command() {
        let args = CliArgs::parse_from(["patchsmith", "patches", "youtube", "--json"]);
        match args.command {
            Commands::Patches(patches_args) => {
                assert_eq!(patches_args.target, "youtube");
                assert!(patches_args.json);
                assert!(patches_args.catalog_url.is_none());
            }
            _ => panic!("Expected Patches command"),
        }
    }

    #[test]
    fn test_patches_requires_target() {
        assert!(CliArgs::try_parse_from(["patchsmith", "patches"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["patchsmith", "-v", "build"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["patchsmith", "build", "-q"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["patchsmith", "-v", "-q", "build"]).is_err());
    }

    #[test]
    fn test_log_level_flag() {
        let args = CliArgs::parse_from(["patchsmith", "--log-level", "debug", "build"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }
}
