#![forbid(unsafe_code)]

//! Phosphor shell: the menu, the bundled applications and the terminal
//! front end.
//!
//! - [`shell`] - process registry and the menu process
//! - [`catalog`] - the static menu table (built in or JSON)
//! - [`apps`] - dashboard, interactive log, holotape player, repository browser
//! - [`boot`] - wiring a kernel from options and a catalog
//! - [`terminal`] - crossterm session guard and rendering surface
//! - [`cli`] / [`logging`] - binary plumbing

pub mod apps;
pub mod boot;
pub mod catalog;
pub mod cli;
pub mod logging;
pub mod shell;
pub mod terminal;

pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use shell::{Registry, RegistryEntry, Shell};
