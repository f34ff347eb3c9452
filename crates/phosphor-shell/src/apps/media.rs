#![forbid(unsafe_code)]

//! Holotape player.

use std::time::Duration;

use phosphor_runtime::{Cmd, Content, Key, Process, TimerId, Viewport};
use phosphor_text::{Align, markup, pad};

const PROGRESS_TIMER: TimerId = 1;
const PROGRESS_STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub seconds: u32,
}

impl Track {
    #[must_use]
    pub fn new(title: &str, artist: &str, seconds: u32) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Playing {
    track: usize,
    elapsed: u32,
}

/// Playlist browser with a simulated playback clock.
#[derive(Debug, Clone)]
pub struct MediaPlayer {
    tracks: Vec<Track>,
    cursor: usize,
    playing: Option<Playing>,
}

impl MediaPlayer {
    pub const NAME: &'static str = "media";

    #[must_use]
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            cursor: 0,
            playing: None,
        }
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            Track::new("Night Shift Hum", "Vault Choir", 184),
            Track::new("Coolant Blues", "Pipe & Valve", 212),
            Track::new("Signal Lost", "The Relays", 9),
            Track::new("Overseer's Lament", "Sector Nine", 247),
        ])
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index and elapsed seconds of the playing track.
    #[must_use]
    pub fn now_playing(&self) -> Option<(usize, u32)> {
        self.playing.map(|p| (p.track, p.elapsed))
    }

    fn play(&mut self) -> Cmd {
        let Some(track) = self.tracks.get(self.cursor) else {
            return Cmd::none();
        };
        self.playing = Some(Playing {
            track: self.cursor,
            elapsed: 0,
        });
        Cmd::batch(vec![
            Cmd::announce(format!("NOW PLAYING: {} - {}", track.title, track.artist)),
            Cmd::every(PROGRESS_TIMER, PROGRESS_STEP),
        ])
    }

    fn stop(&mut self) -> Cmd {
        self.playing = None;
        Cmd::cancel(PROGRESS_TIMER)
    }

    fn progress_row(&self, width: usize) -> String {
        let Some(playing) = self.playing else {
            return pad("  STOPPED", width, Align::Left);
        };
        let total = self.tracks[playing.track].seconds.max(1);
        let clock = format!(
            " {} / {}",
            format_clock(playing.elapsed),
            format_clock(total)
        );
        let cells = width.saturating_sub(clock.len() + 4);
        let filled = (playing.elapsed.min(total) as usize * cells) / total as usize;
        let bar = format!("  [{}{}]", "=".repeat(filled), " ".repeat(cells - filled));
        pad(&format!("{bar}{clock}"), width, Align::Left)
    }
}

fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

impl Process for MediaPlayer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle_input(&mut self, key: Key) -> Cmd {
        match key {
            Key::Up | Key::Down => {
                let n = self.tracks.len() as isize;
                if n > 0 {
                    self.cursor =
                        (self.cursor as isize + key.vertical_delta()).rem_euclid(n) as usize;
                }
                Cmd::none()
            }
            Key::Accept => match self.playing {
                Some(p) if p.track == self.cursor => self.stop(),
                _ => self.play(),
            },
            Key::Right => self.stop(),
            Key::Left => Cmd::home(),
        }
    }

    fn close(&mut self) {
        // The kernel has already cancelled the progress timer.
        self.playing = None;
    }

    fn on_timer(&mut self, id: TimerId) -> Cmd {
        if id != PROGRESS_TIMER {
            return Cmd::none();
        }
        let Some(playing) = self.playing.as_mut() else {
            return Cmd::cancel(PROGRESS_TIMER);
        };
        playing.elapsed += 1;
        if playing.elapsed >= self.tracks[playing.track].seconds {
            let finished = self.tracks[playing.track].title.clone();
            self.playing = None;
            return Cmd::batch(vec![
                Cmd::cancel(PROGRESS_TIMER),
                Cmd::log(format!("track finished: {finished}")),
                Cmd::redraw(),
            ]);
        }
        Cmd::redraw()
    }

    fn render(&self, viewport: Viewport) -> Content {
        let mut content = Content::with_capacity(viewport.rows);
        content.push_padded("HOLOTAPE ARCHIVE", viewport, Align::Center);
        content.push_blank(viewport);
        for (i, track) in self.tracks.iter().enumerate() {
            let playing = self.playing.is_some_and(|p| p.track == i);
            let row = pad(
                &format!(
                    "{}{} {} - {}",
                    if i == self.cursor { "> " } else { "  " },
                    if playing { "*" } else { " " },
                    track.title,
                    track.artist
                ),
                viewport.width,
                Align::Left,
            );
            content.push(if i == self.cursor { markup::mark(&row) } else { row });
        }
        content.push_blank(viewport);
        content.push(self.progress_row(viewport.width));
        content.push_padded("[ACCEPT] PLAY/STOP  [LEFT] MENU", viewport, Align::Left);
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_text::visible_width;

    #[test]
    fn accept_plays_and_announces() {
        let mut m = MediaPlayer::builtin();
        m.handle_input(Key::Down);
        let cmd = m.handle_input(Key::Accept);
        assert_eq!(
            cmd,
            Cmd::Batch(vec![
                Cmd::announce("NOW PLAYING: Coolant Blues - Pipe & Valve"),
                Cmd::every(PROGRESS_TIMER, PROGRESS_STEP),
            ])
        );
        assert_eq!(m.now_playing(), Some((1, 0)));
    }

    #[test]
    fn accept_on_playing_track_stops() {
        let mut m = MediaPlayer::builtin();
        m.handle_input(Key::Accept);
        assert_eq!(m.handle_input(Key::Accept), Cmd::Cancel(PROGRESS_TIMER));
        assert_eq!(m.now_playing(), None);
    }

    #[test]
    fn track_finishes() {
        let mut m = MediaPlayer::builtin();
        m.handle_input(Key::Down);
        m.handle_input(Key::Down);
        m.handle_input(Key::Accept);
        for _ in 0..8 {
            assert_eq!(m.on_timer(PROGRESS_TIMER), Cmd::Redraw);
        }
        let done = m.on_timer(PROGRESS_TIMER);
        assert_eq!(done.type_name(), "Batch");
        assert_eq!(m.now_playing(), None);
    }

    #[test]
    fn close_stops_playback() {
        let mut m = MediaPlayer::builtin();
        m.handle_input(Key::Accept);
        m.close();
        assert_eq!(m.now_playing(), None);
    }

    #[test]
    fn cursor_wraps() {
        let mut m = MediaPlayer::builtin();
        m.handle_input(Key::Up);
        assert_eq!(m.cursor(), 3);
    }

    #[test]
    fn rows_have_exact_width() {
        let mut m = MediaPlayer::builtin();
        m.handle_input(Key::Accept);
        m.on_timer(PROGRESS_TIMER);
        for row in m.render(Viewport::new(44, 10)).rows() {
            assert_eq!(visible_width(row), 44, "{row:?}");
        }
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(184), "3:04");
    }
}
