#![forbid(unsafe_code)]

//! Rendering surfaces.
//!
//! A surface receives one full-replace [`Screen`] per refresh. There is no
//! incremental update path.

use std::io;

use crate::compositor::Screen;

/// Destination for composed frames.
pub trait Surface {
    fn present(&mut self, screen: &Screen) -> io::Result<()>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn present(&mut self, screen: &Screen) -> io::Result<()> {
        (**self).present(screen)
    }
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn present(&mut self, screen: &Screen) -> io::Result<()> {
        (**self).present(screen)
    }
}

/// Records every frame in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    frames: Vec<Screen>,
    keep: Option<usize>,
    presented: usize,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the most recent `frames` frames.
    #[must_use]
    pub fn bounded(frames: usize) -> Self {
        Self {
            keep: Some(frames.max(1)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn frames(&self) -> &[Screen] {
        &self.frames
    }

    #[must_use]
    pub fn last(&self) -> Option<&Screen> {
        self.frames.last()
    }

    /// Total frames presented, including any no longer retained.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.presented
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Surface for MemorySurface {
    fn present(&mut self, screen: &Screen) -> io::Result<()> {
        self.presented += 1;
        self.frames.push(screen.clone());
        if let Some(keep) = self.keep
            && self.frames.len() > keep
        {
            let excess = self.frames.len() - keep;
            self.frames.drain(..excess);
        }
        Ok(())
    }
}
