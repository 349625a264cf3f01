//! Snapshot rasterizer plumbing: a trailing-edge debounce for capture
//! scheduling and a monotonic sequence guard so a stale capture never
//! overwrites a newer published snapshot.

use std::cell::{Cell, RefCell};

use gloo_timers::callback::Timeout;
use web_sys::HtmlCanvasElement;

use crate::util::clog;

/// Trailing-edge debounce window for viewport-driven captures.
pub const CAPTURE_DEBOUNCE_MS: u32 = 400;
/// Settle delay after mount before the first capture, to let tiles load.
pub const MAP_SETTLE_MS: u32 = 1200;

/// Fixed raster size handed to the report exporter.
pub const CAPTURE_WIDTH: u32 = 1000;
pub const CAPTURE_HEIGHT: u32 = 700;

/// Monotonic capture sequencing: `issue` at capture start, `try_publish`
/// with the issued number before emitting the result. The latest issued
/// capture always wins.
#[derive(Default)]
pub struct CaptureSeq {
    issued: Cell<u64>,
    published: Cell<u64>,
}

impl CaptureSeq {
    pub fn issue(&self) -> u64 {
        let n = self.issued.get() + 1;
        self.issued.set(n);
        n
    }

    /// True when this capture may publish: nothing newer was issued in the
    /// meantime and nothing newer has already published.
    pub fn try_publish(&self, seq: u64) -> bool {
        if seq == self.issued.get() && seq > self.published.get() {
            self.published.set(seq);
            true
        } else {
            false
        }
    }
}

/// Trailing-edge debounce: scheduling again replaces (and cancels) the
/// pending invocation, so the latest request always wins.
pub struct Debounce {
    delay_ms: u32,
    pending: RefCell<Option<Timeout>>,
}

impl Debounce {
    pub fn new(delay_ms: u32) -> Self {
        Self { delay_ms, pending: RefCell::new(None) }
    }

    pub fn schedule(&self, f: impl FnOnce() + 'static) {
        let timeout = Timeout::new(self.delay_ms, f);
        if let Some(old) = self.pending.replace(Some(timeout)) {
            old.cancel();
        }
    }
}

/// Encode the canvas as a PNG data-URL; `None` on failure (logged, the
/// previous snapshot then simply stays in effect).
pub fn encode_png(canvas: &HtmlCanvasElement) -> Option<String> {
    match canvas.to_data_url_with_type("image/png") {
        Ok(url) => Some(url),
        Err(err) => {
            clog(&format!("sketch capture failed: {err:?}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CaptureSeq;

    #[test]
    fn sole_capture_publishes() {
        let seq = CaptureSeq::default();
        let a = seq.issue();
        assert!(seq.try_publish(a));
    }

    #[test]
    fn stale_capture_never_overwrites_a_newer_one() {
        let seq = CaptureSeq::default();
        let old = seq.issue();
        let new = seq.issue();
        assert!(!seq.try_publish(old));
        assert!(seq.try_publish(new));
    }

    #[test]
    fn publishing_twice_for_the_same_capture_is_rejected() {
        let seq = CaptureSeq::default();
        let a = seq.issue();
        assert!(seq.try_publish(a));
        assert!(!seq.try_publish(a));
    }
}
