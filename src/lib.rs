//! devshell - run your own shell inside a reproducible nix-shell environment
//!
//! This crate provides:
//! - Shell detection and init file discovery for bash, zsh, ksh and POSIX sh
//! - Environment curation for `nix-shell --pure`
//! - Session shellrc generation that keeps the user's customizations
//! - The launcher that ties it together

pub mod cli;
pub mod config;
pub mod paths;
pub mod shell;

pub use config::Config;
