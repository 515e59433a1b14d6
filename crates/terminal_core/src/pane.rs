//! Bounded output pane with sticky auto-scroll and wheel containment.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use terminal_contract::OutputLine;

/// Default distance from the bottom, in viewport units, that still counts as "at the bottom".
pub const DEFAULT_STICK_THRESHOLD: f64 = 24.0;

/// Scroll geometry of the element hosting the pane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current scroll offset from the top.
    pub scroll_top: f64,
    /// Total content height.
    pub scroll_height: f64,
    /// Visible height.
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Returns whether the viewport is within `threshold` of the bottom.
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.scroll_height - self.scroll_top - self.client_height < threshold
    }

    /// Returns whether content overflows the viewport.
    pub fn can_scroll(&self) -> bool {
        self.scroll_height > self.client_height + 1.0
    }

    /// Returns whether a wheel movement of `delta_y` should be consumed by the pane.
    ///
    /// Negative deltas scroll up. The pane keeps the event only while it still has room in the
    /// requested direction; otherwise the event belongs to the outer page.
    pub fn contains_wheel(&self, delta_y: f64) -> bool {
        if !self.can_scroll() {
            return false;
        }
        let at_top = self.scroll_top <= 0.0;
        let at_bottom = self.scroll_top + self.client_height >= self.scroll_height - 1.0;
        if delta_y < 0.0 {
            !at_top
        } else {
            !at_bottom
        }
    }
}

/// Host element the pane scrolls.
///
/// `line_count` is the pane's current length, for viewports that derive geometry from it.
pub trait PaneViewport {
    /// Samples the current scroll geometry.
    fn metrics(&self, line_count: usize) -> ScrollMetrics;

    /// Scrolls to the bottom of the content.
    fn scroll_to_bottom(&self, line_count: usize);

    /// Scrolls by `delta_y` units.
    fn scroll_by(&self, delta_y: f64, line_count: usize);
}

/// Result of routing a wheel event through the pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// The pane scrolled; the caller must stop propagation and prevent the default action.
    Consumed,
    /// The event should reach outer scroll containers.
    Propagate,
}

/// One stored line with a stable identity for keyed rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneEntry {
    /// Monotonic line id.
    pub id: u64,
    /// Line payload.
    pub line: OutputLine,
}

/// Change listener invoked after every mutation.
pub type PaneListener = Rc<dyn Fn()>;

struct PaneState {
    entries: RefCell<VecDeque<PaneEntry>>,
    next_id: Cell<u64>,
    cap: usize,
    stick_threshold: Cell<f64>,
    viewport: RefCell<Option<Rc<dyn PaneViewport>>>,
    listeners: RefCell<Vec<PaneListener>>,
}

/// Shared output pane handle.
#[derive(Clone)]
pub struct OutputPane {
    state: Rc<PaneState>,
}

impl OutputPane {
    /// Creates a pane keeping at most `cap` lines.
    pub fn new(cap: usize) -> Self {
        Self {
            state: Rc::new(PaneState {
                entries: RefCell::new(VecDeque::new()),
                next_id: Cell::new(0),
                cap: cap.max(1),
                stick_threshold: Cell::new(DEFAULT_STICK_THRESHOLD),
                viewport: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Sets the near-bottom threshold.
    pub fn set_stick_threshold(&self, threshold: f64) {
        self.state.stick_threshold.set(threshold);
    }

    /// Attaches the host viewport. Without one, the pane never scrolls.
    pub fn attach_viewport(&self, viewport: Rc<dyn PaneViewport>) {
        *self.state.viewport.borrow_mut() = Some(viewport);
    }

    /// Registers a change listener.
    pub fn subscribe(&self, listener: PaneListener) {
        self.state.listeners.borrow_mut().push(listener);
    }

    /// Appends a line, evicting the oldest lines past the cap.
    ///
    /// Follows the new bottom only when the viewport was near the bottom before the append.
    pub fn print(&self, line: OutputLine) {
        let viewport = self.state.viewport.borrow().clone();
        let stick = viewport.as_ref().is_some_and(|viewport| {
            viewport
                .metrics(self.len())
                .is_near_bottom(self.state.stick_threshold.get())
        });

        {
            let mut entries = self.state.entries.borrow_mut();
            let id = self.state.next_id.get();
            self.state.next_id.set(id.wrapping_add(1));
            entries.push_back(PaneEntry { id, line });
            while entries.len() > self.state.cap {
                entries.pop_front();
            }
        }
        self.notify();

        if let (true, Some(viewport)) = (stick, viewport) {
            viewport.scroll_to_bottom(self.len());
        }
    }

    /// Removes every line.
    pub fn clear(&self) {
        self.state.entries.borrow_mut().clear();
        self.notify();
    }

    /// Routes a wheel movement; applies it to the viewport when consumed.
    pub fn wheel(&self, delta_y: f64) -> WheelOutcome {
        let Some(viewport) = self.state.viewport.borrow().clone() else {
            return WheelOutcome::Propagate;
        };
        let count = self.len();
        if viewport.metrics(count).contains_wheel(delta_y) {
            viewport.scroll_by(delta_y, count);
            WheelOutcome::Consumed
        } else {
            WheelOutcome::Propagate
        }
    }

    /// Returns a snapshot of stored entries, oldest first.
    pub fn entries(&self) -> Vec<PaneEntry> {
        self.state.entries.borrow().iter().cloned().collect()
    }

    /// Returns stored lines, oldest first.
    pub fn lines(&self) -> Vec<OutputLine> {
        self.state
            .entries
            .borrow()
            .iter()
            .map(|entry| entry.line.clone())
            .collect()
    }

    /// Returns the visible text of stored lines, oldest first.
    pub fn texts(&self) -> Vec<String> {
        self.state
            .entries
            .borrow()
            .iter()
            .map(|entry| entry.line.text())
            .collect()
    }

    /// Returns the number of stored lines.
    pub fn len(&self) -> usize {
        self.state.entries.borrow().len()
    }

    /// Returns whether the pane is empty.
    pub fn is_empty(&self) -> bool {
        self.state.entries.borrow().is_empty()
    }

    /// Returns the line cap.
    pub fn cap(&self) -> usize {
        self.state.cap
    }

    fn notify(&self) {
        let listeners = self.state.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }
}

/// Viewport modelling fixed-height rows, for headless hosts and tests.
#[derive(Debug)]
pub struct GridViewport {
    line_height: f64,
    client_height: f64,
    scroll_top: Cell<f64>,
}

impl GridViewport {
    /// Creates a viewport scrolled to the top.
    pub fn new(line_height: f64, client_height: f64) -> Self {
        Self {
            line_height,
            client_height,
            scroll_top: Cell::new(0.0),
        }
    }

    /// Returns the current scroll offset.
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top.get()
    }

    /// Sets the scroll offset directly, as a user drag would.
    pub fn set_scroll_top(&self, scroll_top: f64) {
        self.scroll_top.set(scroll_top.max(0.0));
    }

    fn max_scroll(&self, line_count: usize) -> f64 {
        (line_count as f64 * self.line_height - self.client_height).max(0.0)
    }
}

impl PaneViewport for GridViewport {
    fn metrics(&self, line_count: usize) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.scroll_top.get(),
            scroll_height: line_count as f64 * self.line_height,
            client_height: self.client_height,
        }
    }

    fn scroll_to_bottom(&self, line_count: usize) {
        self.scroll_top.set(self.max_scroll(line_count));
    }

    fn scroll_by(&self, delta_y: f64, line_count: usize) {
        let next = (self.scroll_top.get() + delta_y).clamp(0.0, self.max_scroll(line_count));
        self.scroll_top.set(next);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use terminal_contract::LineStyle;

    use super::*;

    fn line(text: String) -> OutputLine {
        OutputLine::new(text, LineStyle::Plain)
    }

    #[test]
    fn evicts_oldest_first_and_keeps_newest_in_order() {
        let pane = OutputPane::new(5);
        for i in 0..12 {
            pane.print(line(format!("l{i}")));
        }
        assert_eq!(pane.len(), 5);
        assert_eq!(pane.texts(), vec!["l7", "l8", "l9", "l10", "l11"]);
        let ids = pane.entries().iter().map(|e| e.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn follows_output_only_when_near_bottom() {
        let pane = OutputPane::new(100);
        let viewport = Rc::new(GridViewport::new(20.0, 100.0));
        pane.attach_viewport(viewport.clone());

        for i in 0..10 {
            pane.print(line(format!("l{i}")));
        }
        assert_eq!(viewport.scroll_top(), 100.0);

        viewport.set_scroll_top(20.0);
        pane.print(line("late".to_string()));
        assert_eq!(viewport.scroll_top(), 20.0);

        // 11 rows = 220 high; 220 - 100 - 100 = 20 < 24 counts as the bottom.
        viewport.set_scroll_top(100.0);
        pane.print(line("next".to_string()));
        assert_eq!(viewport.scroll_top(), 140.0);
    }

    #[test]
    fn wheel_is_contained_only_while_pane_can_move() {
        let pane = OutputPane::new(100);
        let viewport = Rc::new(GridViewport::new(20.0, 100.0));
        pane.attach_viewport(viewport.clone());

        pane.print(line("short".to_string()));
        assert_eq!(pane.wheel(10.0), WheelOutcome::Propagate);

        for i in 0..9 {
            pane.print(line(format!("l{i}")));
        }
        assert_eq!(viewport.scroll_top(), 100.0);
        assert_eq!(pane.wheel(30.0), WheelOutcome::Propagate);
        assert_eq!(pane.wheel(-30.0), WheelOutcome::Consumed);
        assert_eq!(viewport.scroll_top(), 70.0);
        viewport.set_scroll_top(0.0);
        assert_eq!(pane.wheel(-5.0), WheelOutcome::Propagate);
        assert_eq!(pane.wheel(5.0), WheelOutcome::Consumed);
    }

    #[test]
    fn clear_empties_and_notifies() {
        let pane = OutputPane::new(3);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        pane.subscribe(Rc::new(move || counter.set(counter.get() + 1)));

        pane.print(line("a".to_string()));
        pane.clear();
        assert!(pane.is_empty());
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn metrics_detect_overflow() {
        let metrics = ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 101.0,
            client_height: 100.0,
        };
        assert!(!metrics.can_scroll());
        assert!(metrics.is_near_bottom(DEFAULT_STICK_THRESHOLD));
    }
}
