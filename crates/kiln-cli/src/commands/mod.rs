//! Command implementations.
//!
//! - [`build`] - run the pipeline and write the output directory
//! - [`check`] - validate configuration without building
//!
//! Each command exposes an `execute` function taking its parsed arguments.

pub mod build;
pub mod check;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
