//! Capture log: images taken during a live session.

use academy_core::clock::Clock;
use academy_core::platform::Frame;
use academy_core::record::CapturedImage;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Append-only list of captured images, each tagged with the step active
/// at capture time. Disabled when the session has no camera.
#[derive(Debug, Clone, Default)]
pub struct CaptureLog {
    enabled: bool,
    images: Vec<CapturedImage>,
}

impl CaptureLog {
    /// A log that accepts captures.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            images: Vec::new(),
        }
    }

    /// A log that refuses every capture.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether captures are accepted.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Encodes `frame` and appends it. Returns `true` when the image was
    /// stored, which the UI acknowledges with a flash.
    pub fn capture(
        &mut self,
        frame: &Frame,
        step_index: usize,
        step_title: &str,
        clock: &dyn Clock,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        self.images.push(CapturedImage {
            step_index,
            step_title: step_title.to_owned(),
            image_data: encode_data_url(frame),
            timestamp: clock.now(),
        });
        true
    }

    /// Captured images in capture order.
    #[must_use]
    pub fn images(&self) -> &[CapturedImage] {
        &self.images
    }

    /// Number of captured images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Encodes a frame as a `data:` URL.
#[must_use]
pub fn encode_data_url(frame: &Frame) -> String {
    format!(
        "data:{};base64,{}",
        frame.mime_type,
        STANDARD.encode(&frame.bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_test_support::ManualClock;

    fn frame() -> Frame {
        Frame {
            mime_type: "image/png".to_owned(),
            bytes: b"png".to_vec(),
        }
    }

    #[test]
    fn test_capture_appends_tagged_image() {
        // Arrange
        let clock = ManualClock::at_default_start();
        let mut log = CaptureLog::enabled();

        // Act
        let first = log.capture(&frame(), 0, "Consultation", &clock);
        clock.advance_millis(1_000);
        let second = log.capture(&frame(), 2, "Cut", &clock);

        // Assert
        assert!(first && second);
        assert_eq!(log.len(), 2);
        assert_eq!(log.images()[0].step_title, "Consultation");
        assert_eq!(log.images()[1].step_index, 2);
        assert_eq!(log.images()[0].image_data, "data:image/png;base64,cG5n");
        assert!(log.images()[1].timestamp > log.images()[0].timestamp);
    }

    #[test]
    fn test_disabled_log_refuses_captures() {
        let clock = ManualClock::at_default_start();
        let mut log = CaptureLog::disabled();

        assert!(!log.capture(&frame(), 0, "Consultation", &clock));
        assert!(log.is_empty());
        assert!(!log.is_enabled());
    }
}
