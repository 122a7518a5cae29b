// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The browser window as a [`Viewport`].

use inlay_core::backend::Viewport;
use kurbo::Vec2;
use web_sys::Window;

/// Reads the device-pixel ratio and scroll offset from a window on every
/// call.
pub struct WindowViewport {
    window: Window,
}

impl core::fmt::Debug for WindowViewport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowViewport")
            .field("device_pixel_ratio", &self.window.device_pixel_ratio())
            .finish_non_exhaustive()
    }
}

impl WindowViewport {
    /// Wraps a window.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    /// Returns the wrapped window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Viewport for WindowViewport {
    fn scale(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn scroll_offset(&self) -> Vec2 {
        Vec2::new(
            self.window.scroll_x().unwrap_or(0.0),
            self.window.scroll_y().unwrap_or(0.0),
        )
    }
}
