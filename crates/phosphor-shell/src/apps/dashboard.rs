#![forbid(unsafe_code)]

//! Telemetry dashboard.
//!
//! Samples a few synthetic gauges on a periodic timer and draws them as
//! bars. The samples come from a small deterministic generator so frames are
//! reproducible in tests.

use std::time::Duration;

use phosphor_runtime::{Cmd, Content, Key, Process, TimerId, Viewport};
use phosphor_text::{Align, markup, pad};

const SAMPLE_TIMER: TimerId = 1;
const SAMPLE_PERIOD: Duration = Duration::from_secs(1);
/// Gauges above this level are drawn in the warning colour.
const WARN_LEVEL: u8 = 85;
const OK_COLOR: &str = "#33ff33";
const WARN_COLOR: &str = "#ffb000";

#[derive(Debug, Clone)]
struct Gauge {
    label: &'static str,
    value: u8,
}

/// Live gauges: reactor load, memory and uplink.
#[derive(Debug, Clone)]
pub struct Dashboard {
    gauges: Vec<Gauge>,
    samples: u64,
    seed: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub const NAME: &'static str = "dashboard";

    #[must_use]
    pub fn new() -> Self {
        Self {
            gauges: vec![
                Gauge { label: "REACTOR", value: 42 },
                Gauge { label: "MEMORY", value: 63 },
                Gauge { label: "UPLINK", value: 77 },
                Gauge { label: "COOLANT", value: 50 },
            ],
            samples: 0,
            seed: 0x5eed_cafe,
        }
    }

    #[must_use]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    #[must_use]
    pub fn values(&self) -> Vec<u8> {
        self.gauges.iter().map(|g| g.value).collect()
    }

    fn next_random(&mut self) -> u64 {
        // 64-bit LCG (Knuth MMIX constants).
        self.seed = self
            .seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.seed >> 33
    }

    fn sample(&mut self) {
        for i in 0..self.gauges.len() {
            let step = (self.next_random() % 11) as i16 - 5;
            let gauge = &mut self.gauges[i];
            gauge.value = (i16::from(gauge.value) + step).clamp(0, 100) as u8;
        }
        self.samples += 1;
    }

    fn bar(value: u8, cells: usize) -> String {
        let filled = usize::from(value) * cells / 100;
        let mut bar = "#".repeat(filled);
        bar.push_str(&".".repeat(cells - filled));
        bar
    }

    fn gauge_row(gauge: &Gauge, width: usize) -> String {
        // label 9 + "[" + bar + "] " + "100%"
        let cells = width.saturating_sub(9 + 2 + 1 + 4).max(1);
        let color = if gauge.value > WARN_LEVEL { WARN_COLOR } else { OK_COLOR };
        let bar = markup::color(color, &Self::bar(gauge.value, cells));
        let row = format!(
            "{}[{bar}] {}",
            pad(gauge.label, 9, Align::Left),
            pad(&format!("{}%", gauge.value), 4, Align::Right),
        );
        pad(&row, width, Align::Left)
    }
}

impl Process for Dashboard {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn open(&mut self) -> Cmd {
        Cmd::every(SAMPLE_TIMER, SAMPLE_PERIOD)
    }

    fn handle_input(&mut self, key: Key) -> Cmd {
        match key {
            Key::Left | Key::Accept => Cmd::home(),
            Key::Right => {
                self.sample();
                Cmd::none()
            }
            Key::Up | Key::Down => Cmd::none(),
        }
    }

    fn on_timer(&mut self, id: TimerId) -> Cmd {
        if id != SAMPLE_TIMER {
            return Cmd::none();
        }
        self.sample();
        let hot: Vec<&str> = self
            .gauges
            .iter()
            .filter(|g| g.value > WARN_LEVEL)
            .map(|g| g.label)
            .collect();
        if self.samples % 30 == 0 && !hot.is_empty() {
            return Cmd::batch(vec![
                Cmd::redraw(),
                Cmd::announce(format!("WARNING: {} HIGH", hot.join(", "))),
            ]);
        }
        Cmd::redraw()
    }

    fn render(&self, viewport: Viewport) -> Content {
        let mut content = Content::with_capacity(viewport.rows);
        content.push_padded("SYSTEM TELEMETRY", viewport, Align::Center);
        content.push_blank(viewport);
        for gauge in &self.gauges {
            content.push(Self::gauge_row(gauge, viewport.width));
        }
        content.push_blank(viewport);
        content.push_padded(&format!("SAMPLES {}", self.samples), viewport, Align::Left);
        content.push_padded("[ACCEPT] RETURN  [RIGHT] SAMPLE NOW", viewport, Align::Left);
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_text::{validate_markup, visible_width};

    #[test]
    fn open_arms_sampling() {
        let mut d = Dashboard::new();
        assert_eq!(d.open(), Cmd::every(SAMPLE_TIMER, SAMPLE_PERIOD));
    }

    #[test]
    fn timer_samples_and_redraws() {
        let mut d = Dashboard::new();
        assert_eq!(d.on_timer(SAMPLE_TIMER), Cmd::Redraw);
        assert_eq!(d.samples(), 1);
        assert_eq!(d.on_timer(99), Cmd::None);
        assert_eq!(d.samples(), 1);
    }

    #[test]
    fn values_stay_in_range() {
        let mut d = Dashboard::new();
        for _ in 0..500 {
            d.sample();
        }
        assert!(d.values().iter().all(|&v| v <= 100));
    }

    #[test]
    fn rows_have_exact_width() {
        let mut d = Dashboard::new();
        d.sample();
        let viewport = Viewport::new(48, 10);
        for row in d.render(viewport).rows() {
            assert_eq!(visible_width(row), 48, "{row:?}");
            assert!(validate_markup(row).is_ok());
        }
    }

    #[test]
    fn accept_goes_home() {
        let mut d = Dashboard::new();
        assert_eq!(d.handle_input(Key::Accept), Cmd::Home);
        assert_eq!(d.handle_input(Key::Left), Cmd::Home);
    }

    #[test]
    fn bar_fill() {
        assert_eq!(Dashboard::bar(50, 10), "#####.....");
        assert_eq!(Dashboard::bar(100, 4), "####");
        assert_eq!(Dashboard::bar(0, 3), "...");
    }
}
