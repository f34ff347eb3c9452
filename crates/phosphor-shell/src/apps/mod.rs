#![forbid(unsafe_code)]

//! Bundled applications.
//!
//! Each one is an ordinary [`Process`](phosphor_runtime::Process); the menu
//! reaches them only through the kernel by name.

pub mod dashboard;
pub mod fiction;
pub mod media;
pub mod repos;

pub use dashboard::Dashboard;
pub use fiction::Fiction;
pub use media::{MediaPlayer, Track};
pub use repos::{RepoBrowser, Tab};

use phosphor_runtime::{Process, Viewport};

/// Every bundled application, in spawn order, laid out for `page`.
#[must_use]
pub fn builtin(page: Viewport) -> Vec<Box<dyn Process>> {
    vec![
        Box::new(Dashboard::new()),
        Box::new(Fiction::new()),
        Box::new(MediaPlayer::builtin()),
        Box::new(RepoBrowser::builtin(page)),
    ]
}
