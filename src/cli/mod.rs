pub mod commands;
pub mod handlers;

pub use commands::{BuildArgs, CliArgs, Commands, PatchesArgs};
pub use handlers::{handle_build, handle_patches};
