//! Follow-the-bottom behaviour for the transcript viewport.
//!
//! Positions are abstract units (rows in the terminal shell). The controller
//! never moves the viewport itself; it hands out [`ScrollDirective`]s that
//! the renderer applies once the new layout is known.

use askdocs_core::ChatConfig;
use std::time::{Duration, Instant};

pub const DEFAULT_TOLERANCE: u32 = 1;
pub const DEFAULT_MEASURE_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowState {
    /// Viewport tracks the newest content
    #[default]
    Pinned,
    /// User scrolled away; content changes leave the viewport alone
    Free,
}

/// Origin of a viewport measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureSource {
    /// Scroll input from the user
    User,
    /// Re-layout after content or size changes
    Layout,
}

/// Snapshot of the scrollable area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Distance of the top of the viewport from the top of the content
    pub offset: u32,
    pub viewport_height: u32,
    pub content_height: u32,
}

impl Viewport {
    pub fn new(offset: u32, viewport_height: u32, content_height: u32) -> Self {
        Self { offset, viewport_height, content_height }
    }

    pub fn max_offset(&self) -> u32 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn distance_from_bottom(&self) -> u32 {
        self.max_offset().saturating_sub(self.offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub viewport: Viewport,
    pub source: MeasureSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirective {
    ScrollToBottom,
}

/// Coalesces measurements to at most one evaluation per interval
///
/// The first measurement after a quiet period is evaluated immediately; later
/// ones in the same interval replace each other and the last is evaluated
/// when the interval ends. A user measurement in the interval keeps its
/// source even when a layout pass replaces its viewport.
#[derive(Debug, Clone)]
pub struct MeasureThrottle {
    interval: Duration,
    last_run: Option<Instant>,
    pending: Option<Measurement>,
}

impl MeasureThrottle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_run: None, pending: None }
    }

    /// Offer a measurement; returns it when it may be evaluated right away
    pub fn offer(&mut self, measurement: Measurement, now: Instant) -> Option<Measurement> {
        let ready = match self.last_run {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if ready {
            self.last_run = Some(now);
            self.pending = None;
            Some(measurement)
        } else {
            let source = match self.pending {
                Some(pending) if pending.source == MeasureSource::User => MeasureSource::User,
                _ => measurement.source,
            };
            self.pending = Some(Measurement { viewport: measurement.viewport, source });
            None
        }
    }

    /// Release the trailing measurement once its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<Measurement> {
        let deadline = self.next_deadline()?;
        if now < deadline {
            return None;
        }
        self.last_run = Some(now);
        self.pending.take()
    }

    /// When the trailing measurement becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pending, self.last_run) {
            (Some(_), Some(last)) => Some(last + self.interval),
            _ => None,
        }
    }

    /// Measurement waiting for the trailing edge
    pub fn pending(&self) -> Option<Measurement> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.last_run = None;
        self.pending = None;
    }
}

/// Decides whether the transcript follows new content
#[derive(Debug, Clone)]
pub struct ScrollFollow {
    state: FollowState,
    tolerance: u32,
    throttle: MeasureThrottle,
    scroll_requested: bool,
    last_viewport: Option<Viewport>,
}

impl Default for ScrollFollow {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE, DEFAULT_MEASURE_INTERVAL)
    }
}

impl ScrollFollow {
    pub fn new(tolerance: u32, interval: Duration) -> Self {
        Self {
            state: FollowState::Pinned,
            tolerance,
            throttle: MeasureThrottle::new(interval),
            scroll_requested: false,
            last_viewport: None,
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.scroll_tolerance, config.measure_interval())
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    pub fn is_pinned(&self) -> bool {
        self.state == FollowState::Pinned
    }

    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    /// Whether the jump-to-bottom affordance should be offered
    pub fn can_jump(&self) -> bool {
        self.state == FollowState::Free
    }

    /// Last evaluated viewport
    pub fn last_viewport(&self) -> Option<Viewport> {
        self.last_viewport
    }

    /// Record a viewport measurement, subject to the throttle
    ///
    /// A layout pass that reports the viewport already pending or already
    /// evaluated is dropped, so redraws alone never schedule a deadline.
    pub fn measure(&mut self, viewport: Viewport, source: MeasureSource, now: Instant) {
        let known = self.throttle.pending().map(|m| m.viewport).or(self.last_viewport);
        if source == MeasureSource::Layout && known == Some(viewport) {
            return;
        }
        if let Some(measurement) = self.throttle.offer(Measurement { viewport, source }, now) {
            self.evaluate(measurement);
        }
    }

    /// Evaluate a trailing measurement whose deadline has passed
    pub fn tick(&mut self, now: Instant) {
        if let Some(measurement) = self.throttle.poll(now) {
            self.evaluate(measurement);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.throttle.next_deadline()
    }

    fn evaluate(&mut self, measurement: Measurement) {
        let Measurement { viewport, source } = measurement;
        self.last_viewport = Some(viewport);

        let near_bottom = viewport.distance_from_bottom() <= self.tolerance;
        let next = match (near_bottom, source) {
            (true, _) => FollowState::Pinned,
            (false, MeasureSource::User) => FollowState::Free,
            (false, MeasureSource::Layout) => self.state,
        };

        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, distance = viewport.distance_from_bottom(), "follow state");
            self.state = next;
        }
    }

    /// Content height changed (message appended, list toggled, resize)
    pub fn content_changed(&mut self) {
        if self.is_pinned() {
            self.scroll_requested = true;
        }
    }

    /// The user just sent a message; always follow the answer
    pub fn user_message_sent(&mut self) {
        self.state = FollowState::Pinned;
        self.scroll_requested = true;
    }

    pub fn jump_to_bottom(&mut self) {
        self.state = FollowState::Pinned;
        self.scroll_requested = true;
    }

    /// Directive to apply after layout, if any
    pub fn take_directive(&mut self) -> Option<ScrollDirective> {
        let requested = std::mem::take(&mut self.scroll_requested);
        (requested && self.is_pinned()).then_some(ScrollDirective::ScrollToBottom)
    }

    pub fn reset(&mut self) {
        self.state = FollowState::Pinned;
        self.scroll_requested = true;
        self.last_viewport = None;
        self.throttle.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal stand-in for the transcript area
    struct Pane {
        follow: ScrollFollow,
        viewport: Viewport,
        clock: Instant,
    }

    impl Pane {
        fn new(tolerance: u32) -> Self {
            Self {
                follow: ScrollFollow::new(tolerance, Duration::from_millis(50)),
                viewport: Viewport::new(0, 20, 0),
                clock: Instant::now(),
            }
        }

        fn advance(&mut self, millis: u64) {
            self.clock += Duration::from_millis(millis);
        }

        fn append(&mut self, rows: u32) {
            self.viewport.content_height += rows;
            self.follow.content_changed();
            self.layout();
        }

        fn layout(&mut self) {
            if self.follow.take_directive() == Some(ScrollDirective::ScrollToBottom) {
                self.viewport.offset = self.viewport.max_offset();
            }
            self.follow.measure(self.viewport, MeasureSource::Layout, self.clock);
            self.advance(5);
        }

        fn user_scroll_to(&mut self, offset: u32) {
            self.viewport.offset = offset.min(self.viewport.max_offset());
            self.follow.measure(self.viewport, MeasureSource::User, self.clock);
        }
    }

    #[test]
    fn test_starts_pinned() {
        let follow = ScrollFollow::default();
        assert!(follow.is_pinned());
        assert!(!follow.can_jump());
        assert_eq!(follow.tolerance(), 1);
    }

    #[test]
    fn test_hundred_appends_stay_at_bottom() {
        let mut pane = Pane::new(1);
        for _ in 0..100 {
            pane.append(3);
        }
        assert!(pane.follow.is_pinned());
        assert!(pane.viewport.distance_from_bottom() <= 1);
        assert_eq!(pane.viewport.offset, pane.viewport.max_offset());
    }

    #[test]
    fn test_user_scroll_up_unpins_and_appends_do_not_move() {
        let mut pane = Pane::new(1);
        for _ in 0..20 {
            pane.append(3);
        }
        pane.advance(100);
        pane.user_scroll_to(0);
        assert_eq!(pane.follow.state(), FollowState::Free);

        for _ in 0..10 {
            pane.append(3);
        }
        assert_eq!(pane.viewport.offset, 0);
        assert!(pane.follow.can_jump());
    }

    #[test]
    fn test_jump_to_bottom_restores_pinned() {
        let mut pane = Pane::new(1);
        for _ in 0..20 {
            pane.append(3);
        }
        pane.advance(100);
        pane.user_scroll_to(0);
        pane.append(3);

        pane.follow.jump_to_bottom();
        pane.layout();
        assert!(pane.follow.is_pinned());
        assert_eq!(pane.viewport.distance_from_bottom(), 0);
    }

    #[test]
    fn test_sending_repins() {
        let mut pane = Pane::new(1);
        for _ in 0..20 {
            pane.append(3);
        }
        pane.advance(100);
        pane.user_scroll_to(0);

        pane.follow.user_message_sent();
        pane.append(3);
        assert!(pane.follow.is_pinned());
        assert_eq!(pane.viewport.distance_from_bottom(), 0);
    }

    #[test]
    fn test_scrolling_back_within_tolerance_repins() {
        let mut pane = Pane::new(20);
        pane.viewport.content_height = 200;
        pane.user_scroll_to(0);
        assert!(!pane.follow.is_pinned());

        pane.advance(100);
        pane.user_scroll_to(165);
        assert!(pane.follow.is_pinned(), "15 units from bottom is within tolerance");
    }

    #[test]
    fn test_layout_measurement_never_unpins() {
        let mut follow = ScrollFollow::new(1, Duration::from_millis(50));
        follow.measure(Viewport::new(0, 10, 100), MeasureSource::Layout, Instant::now());
        assert!(follow.is_pinned());
    }

    #[test]
    fn test_throttle_trailing_edge() {
        let start = Instant::now();
        let mut follow = ScrollFollow::new(1, Duration::from_millis(50));
        let far = Viewport::new(0, 10, 100);
        let bottom = Viewport::new(90, 10, 100);

        follow.measure(bottom, MeasureSource::User, start);
        follow.measure(far, MeasureSource::User, start + Duration::from_millis(10));
        follow.measure(far, MeasureSource::User, start + Duration::from_millis(20));
        assert!(follow.is_pinned(), "burst is coalesced");
        assert_eq!(follow.next_deadline(), Some(start + Duration::from_millis(50)));

        follow.tick(start + Duration::from_millis(30));
        assert!(follow.is_pinned());

        follow.tick(start + Duration::from_millis(50));
        assert_eq!(follow.state(), FollowState::Free, "last event of the burst is evaluated");
        assert_eq!(follow.next_deadline(), None);
    }

    #[test]
    fn test_throttle_passes_after_quiet_period() {
        let start = Instant::now();
        let mut throttle = MeasureThrottle::new(Duration::from_millis(50));
        let m = Measurement { viewport: Viewport::default(), source: MeasureSource::Layout };
        assert!(throttle.offer(m, start).is_some());
        assert!(throttle.offer(m, start + Duration::from_millis(49)).is_none());
        assert!(throttle.offer(m, start + Duration::from_millis(120)).is_some());
        assert!(throttle.next_deadline().is_none());
    }

    #[test]
    fn test_layout_pass_keeps_pending_user_intent() {
        let start = Instant::now();
        let mut follow = ScrollFollow::new(1, Duration::from_millis(50));
        let far = Viewport::new(0, 10, 100);

        follow.measure(Viewport::new(90, 10, 100), MeasureSource::Layout, start);
        follow.measure(far, MeasureSource::User, start + Duration::from_millis(10));
        follow.measure(far, MeasureSource::Layout, start + Duration::from_millis(12));
        follow.tick(start + Duration::from_millis(50));
        assert_eq!(follow.state(), FollowState::Free);
    }

    #[test]
    fn test_unchanged_layout_does_not_reschedule() {
        let start = Instant::now();
        let mut follow = ScrollFollow::new(1, Duration::from_millis(50));
        let wide = Viewport::new(10, 20, 30);
        let narrow = Viewport::new(20, 20, 40);

        follow.measure(wide, MeasureSource::Layout, start);
        follow.measure(narrow, MeasureSource::Layout, start + Duration::from_millis(10));
        follow.measure(narrow, MeasureSource::Layout, start + Duration::from_millis(20));
        assert_eq!(follow.next_deadline(), Some(start + Duration::from_millis(50)));

        follow.tick(start + Duration::from_millis(50));
        assert_eq!(follow.last_viewport(), Some(narrow));
        follow.measure(narrow, MeasureSource::Layout, start + Duration::from_millis(55));
        assert_eq!(follow.next_deadline(), None);
    }

    #[test]
    fn test_unchanged_user_measurement_still_counts() {
        let start = Instant::now();
        let mut follow = ScrollFollow::new(1, Duration::from_millis(50));
        let far = Viewport::new(0, 10, 100);
        follow.measure(far, MeasureSource::Layout, start);
        follow.measure(far, MeasureSource::User, start + Duration::from_millis(60));
        assert_eq!(follow.state(), FollowState::Free);
    }

    #[test]
    fn test_content_change_while_free_has_no_directive() {
        let mut follow = ScrollFollow::new(1, Duration::from_millis(50));
        follow.measure(Viewport::new(0, 10, 100), MeasureSource::User, Instant::now());
        follow.content_changed();
        assert_eq!(follow.take_directive(), None);
    }

    #[test]
    fn test_reset_pins_and_requests_scroll() {
        let mut follow = ScrollFollow::new(1, Duration::from_millis(50));
        follow.measure(Viewport::new(0, 10, 100), MeasureSource::User, Instant::now());
        follow.reset();
        assert!(follow.is_pinned());
        assert_eq!(follow.take_directive(), Some(ScrollDirective::ScrollToBottom));
        assert_eq!(follow.take_directive(), None);
    }
}
