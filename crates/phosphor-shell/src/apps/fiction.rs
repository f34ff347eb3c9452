#![forbid(unsafe_code)]

//! Interactive maintenance log.
//!
//! A tiny story graph: each node has a paragraph and a list of choices
//! leading to other nodes. A choice with no destination returns to the menu.
//! Reopening starts the story over.

use phosphor_runtime::{Cmd, Content, Key, Process, Viewport};
use phosphor_text::{Align, markup, pad, wrap_words};

#[derive(Debug, Clone)]
struct Choice {
    label: &'static str,
    /// `None` leaves the log.
    next: Option<usize>,
}

#[derive(Debug, Clone)]
struct Node {
    text: &'static str,
    choices: Vec<Choice>,
}

const fn go(label: &'static str, next: usize) -> Choice {
    Choice {
        label,
        next: Some(next),
    }
}

const fn leave(label: &'static str) -> Choice {
    Choice { label, next: None }
}

fn story() -> Vec<Node> {
    vec![
        Node {
            text: "MAINTENANCE TERMINAL 7. A warning light blinks beside the coolant \
                   valve. The shift log is open at the last entry.",
            choices: vec![go("READ THE LOG", 1), go("INSPECT THE VALVE", 2), leave("LOG OFF")],
        },
        Node {
            text: "The last entry reads: 'Valve sticks below 40 percent. Tap it twice \
                   and it frees up. Do not tell the overseer.'",
            choices: vec![go("INSPECT THE VALVE", 2), go("BACK", 0)],
        },
        Node {
            text: "The valve handle is cold and will not turn. A faint hiss comes \
                   from somewhere behind the panel.",
            choices: vec![go("TAP IT TWICE", 3), go("FORCE IT", 4), go("BACK", 0)],
        },
        Node {
            text: "Two sharp taps. The handle gives, coolant gurgles, and the warning \
                   light settles to a steady green.",
            choices: vec![leave("LOG OFF")],
        },
        Node {
            text: "The handle snaps clean off. The hiss grows louder. Somewhere an \
                   alarm begins to sound.",
            choices: vec![go("START OVER", 0), leave("LOG OFF")],
        },
    ]
}

/// Story-graph process.
#[derive(Debug, Clone)]
pub struct Fiction {
    nodes: Vec<Node>,
    node: usize,
    choice: usize,
    visited: usize,
}

impl Default for Fiction {
    fn default() -> Self {
        Self::new()
    }
}

impl Fiction {
    pub const NAME: &'static str = "fiction";

    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: story(),
            node: 0,
            choice: 0,
            visited: 1,
        }
    }

    #[must_use]
    pub fn node(&self) -> usize {
        self.node
    }

    #[must_use]
    pub fn choice(&self) -> usize {
        self.choice
    }

    fn current(&self) -> &Node {
        &self.nodes[self.node]
    }

    fn move_choice(&mut self, delta: isize) {
        let n = self.current().choices.len() as isize;
        if n > 0 {
            self.choice = (self.choice as isize + delta).rem_euclid(n) as usize;
        }
    }

    fn take_choice(&mut self) -> Cmd {
        let Some(choice) = self.current().choices.get(self.choice) else {
            return Cmd::none();
        };
        match choice.next {
            Some(next) if next < self.nodes.len() => {
                self.node = next;
                self.choice = 0;
                self.visited += 1;
                Cmd::none()
            }
            Some(next) => Cmd::log(format!("story node {next} does not exist")),
            None => Cmd::home(),
        }
    }
}

impl Process for Fiction {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn open(&mut self) -> Cmd {
        self.node = 0;
        self.choice = 0;
        self.visited = 1;
        Cmd::none()
    }

    fn handle_input(&mut self, key: Key) -> Cmd {
        match key {
            Key::Up | Key::Down => {
                self.move_choice(key.vertical_delta());
                Cmd::none()
            }
            Key::Accept => self.take_choice(),
            Key::Left => Cmd::home(),
            Key::Right => Cmd::none(),
        }
    }

    fn render(&self, viewport: Viewport) -> Content {
        let node = self.current();
        let mut content = Content::with_capacity(viewport.rows);
        let text_rows = viewport.rows.saturating_sub(node.choices.len() + 1);
        for line in wrap_words(node.text, viewport.width).into_iter().take(text_rows) {
            content.push_padded(&line, viewport, Align::Left);
        }
        content.push_blank(viewport);
        for (i, choice) in node.choices.iter().enumerate() {
            let row = pad(&format!("  {}. {}", i + 1, choice.label), viewport.width, Align::Left);
            if i == self.choice {
                content.push(markup::mark(&row));
            } else {
                content.push(row);
            }
        }
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_text::{strip_markup, visible_width};

    #[test]
    fn every_edge_points_inside_the_graph() {
        let nodes = story();
        for node in &nodes {
            assert!(!node.choices.is_empty());
            for choice in &node.choices {
                if let Some(next) = choice.next {
                    assert!(next < nodes.len());
                }
            }
        }
    }

    #[test]
    fn choices_wrap() {
        let mut f = Fiction::new();
        f.handle_input(Key::Up);
        assert_eq!(f.choice(), 2);
        f.handle_input(Key::Down);
        assert_eq!(f.choice(), 0);
    }

    #[test]
    fn walk_to_good_ending_and_leave() {
        let mut f = Fiction::new();
        f.handle_input(Key::Down);
        assert_eq!(f.handle_input(Key::Accept), Cmd::None);
        assert_eq!(f.node(), 2);
        assert_eq!(f.handle_input(Key::Accept), Cmd::None);
        assert_eq!(f.node(), 3);
        assert_eq!(f.handle_input(Key::Accept), Cmd::Home);
    }

    #[test]
    fn reopen_restarts() {
        let mut f = Fiction::new();
        f.handle_input(Key::Accept);
        assert_eq!(f.node(), 1);
        f.close();
        f.open();
        assert_eq!(f.node(), 0);
        assert_eq!(f.choice(), 0);
    }

    #[test]
    fn render_fits_viewport() {
        let f = Fiction::new();
        let viewport = Viewport::new(32, 8);
        let content = f.render(viewport);
        assert!(content.len() <= 8);
        for row in content.rows() {
            assert_eq!(visible_width(row), 32, "{row:?}");
        }
        let last = strip_markup(content.rows().last().unwrap()).to_string();
        assert!(last.contains("LOG OFF"));
    }
}
