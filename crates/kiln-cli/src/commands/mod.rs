//! Subcommand implementations. Each module exposes `execute(args)`.

pub mod build;
pub mod methods;
pub mod resolve;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use methods::execute as methods_execute;
pub use resolve::execute as resolve_execute;
