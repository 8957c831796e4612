use std::collections::HashSet;

use winit::event::{ElementState, TouchPhase};
use winit::keyboard::KeyCode;

/// Samples older than this (relative to the newest sample) are pruned, so a
/// flick's velocity reflects the final swipe motion rather than the whole
/// gesture.
const FLICK_WINDOW_MS: f64 = 80.0;
/// Releases spanning less than this are discarded as taps/jitter.
const MIN_FLICK_SECS: f32 = 0.01;

/// Continuous keyboard intent, each axis in {-1, 0, 1}. Up/W is negative y;
/// the ball controller maps y straight onto world Z.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputAxes {
    pub x: f32,
    pub y: f32,
}

/// One-shot gesture release, screen-space velocity in px/s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flick {
    pub screen_vx: f32,
    pub screen_vy: f32,
}

#[derive(Clone, Copy, Debug)]
struct TouchSample {
    x: f32,
    y: f32,
    at_ms: f64,
}

/// Unifies held-key axes and touch-gesture velocity extraction into a single
/// per-frame read. The aggregator is the sole interpreter of raw device
/// input: winit key codes on one side, touch points with timestamps on the
/// other.
pub struct InputAggregator {
    keys_down: HashSet<KeyCode>,
    touch_buffer: Vec<TouchSample>,
    pending_flick: Option<Flick>,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            touch_buffer: Vec::new(),
            pending_flick: None,
        }
    }

    /// Track a raw key transition.
    pub fn handle_key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.keys_down.insert(code);
            }
            ElementState::Released => {
                self.keys_down.remove(&code);
            }
        }
    }

    /// Instantaneous axis snapshot from currently-held keys. Opposing keys
    /// cancel out; there is no smoothing.
    pub fn axes(&self) -> InputAxes {
        let mut axes = InputAxes::default();
        if self.is_down(KeyCode::ArrowLeft) || self.is_down(KeyCode::KeyA) {
            axes.x -= 1.0;
        }
        if self.is_down(KeyCode::ArrowRight) || self.is_down(KeyCode::KeyD) {
            axes.x += 1.0;
        }
        if self.is_down(KeyCode::ArrowUp) || self.is_down(KeyCode::KeyW) {
            axes.y -= 1.0;
        }
        if self.is_down(KeyCode::ArrowDown) || self.is_down(KeyCode::KeyS) {
            axes.y += 1.0;
        }
        axes
    }

    /// Feed one raw touch point. `at_ms` is the host clock in milliseconds;
    /// only differences between samples matter.
    pub fn handle_touch(&mut self, phase: TouchPhase, x: f32, y: f32, at_ms: f64) {
        match phase {
            TouchPhase::Started => {
                self.touch_buffer.clear();
                self.touch_buffer.push(TouchSample { x, y, at_ms });
            }
            TouchPhase::Moved => {
                self.touch_buffer.push(TouchSample { x, y, at_ms });
                let cutoff = at_ms - FLICK_WINDOW_MS;
                self.touch_buffer.retain(|sample| sample.at_ms >= cutoff);
            }
            TouchPhase::Ended | TouchPhase::Cancelled => self.finish_gesture(),
        }
    }

    /// Take the pending flick, if the last gesture produced one. Call at most
    /// once per frame; returns `None` when no gesture was released.
    pub fn consume_flick(&mut self) -> Option<Flick> {
        self.pending_flick.take()
    }

    fn is_down(&self, code: KeyCode) -> bool {
        self.keys_down.contains(&code)
    }

    fn finish_gesture(&mut self) {
        let samples = std::mem::take(&mut self.touch_buffer);
        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            return;
        };
        if samples.len() < 2 {
            return;
        }
        let elapsed = ((last.at_ms - first.at_ms) / 1000.0) as f32;
        if elapsed < MIN_FLICK_SECS {
            // Tap or jitter: too little motion to estimate a velocity.
            return;
        }
        self.pending_flick = Some(Flick {
            screen_vx: (last.x - first.x) / elapsed,
            screen_vy: (last.y - first.y) / elapsed,
        });
    }
}

impl Default for InputAggregator {
    fn default() -> Self {
        Self::new()
    }
}
