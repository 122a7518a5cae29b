// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<canvas>` placeholders as overlay elements.

use alloc::format;
use alloc::string::String;

use inlay_core::backend::{OverlayElement, Viewport as _};
use inlay_core::child::AuthoredSize;
use inlay_core::draw::PixelBuffer;
use inlay_core::scale::{PhysicalSize, Scale};
use kurbo::{Rect, Size};
use wasm_bindgen::{Clamped, JsCast as _};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::viewport::WindowViewport;

/// Attribute carrying the device-pixel ratio a canvas' backing store was
/// sized for. Absent at ratio 1.
pub const SCALE_ATTRIBUTE: &str = "data-inlay-scale";

/// Attribute recording the inline width written by a resize, so a later
/// discovery does not mistake it for an authored width.
pub const FORCED_WIDTH_ATTRIBUTE: &str = "data-inlay-forced-width";

/// Height counterpart of [`FORCED_WIDTH_ATTRIBUTE`].
pub const FORCED_HEIGHT_ATTRIBUTE: &str = "data-inlay-forced-height";

/// An overlay placeholder backed by a 2D canvas.
///
/// Bitmaps that must be stretched onto the surface are staged in a scratch
/// canvas owned by the element, created on first use.
pub struct CanvasElement {
    canvas: HtmlCanvasElement,
    scratch: Option<HtmlCanvasElement>,
}

impl core::fmt::Debug for CanvasElement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasElement")
            .field("id", &self.canvas.id())
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .finish_non_exhaustive()
    }
}

impl CanvasElement {
    /// Wraps a placeholder canvas.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            scratch: None,
        }
    }

    /// Returns the underlying canvas.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn context(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
        canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
    }

    fn force_axis(&self, property: &str, marker: &str, value: f64) {
        let value = css_px(value);
        let _ = self.canvas.style().set_property(property, &value);
        let _ = self.canvas.set_attribute(marker, &value);
    }

    fn is_authored(&self, property: &str, marker: &str) -> bool {
        let inline = self
            .canvas
            .style()
            .get_property_value(property)
            .unwrap_or_default();
        is_authored_axis(&inline, self.canvas.get_attribute(marker).as_deref())
    }

    fn scratch(&mut self, width: u32, height: u32) -> Option<&HtmlCanvasElement> {
        if self.scratch.is_none() {
            let doc = self.canvas.owner_document()?;
            self.scratch = Some(doc.create_element("canvas").ok()?.dyn_into().ok()?);
        }
        let scratch = self.scratch.as_ref()?;
        scratch.set_width(width);
        scratch.set_height(height);
        Some(scratch)
    }
}

impl OverlayElement for CanvasElement {
    type Snapshot = ImageData;

    fn display(&self) -> String {
        self.canvas
            .style()
            .get_property_value("display")
            .unwrap_or_default()
    }

    fn set_display(&mut self, value: &str) {
        let _ = self.canvas.style().set_property("display", value);
    }

    fn authored_size(&self) -> AuthoredSize {
        AuthoredSize {
            width: self.is_authored("width", FORCED_WIDTH_ATTRIBUTE),
            height: self.is_authored("height", FORCED_HEIGHT_ATTRIBUTE),
        }
    }

    fn backing_size(&self) -> PhysicalSize {
        PhysicalSize::new(self.canvas.width(), self.canvas.height())
    }

    fn set_backing_size(&mut self, size: PhysicalSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
    }

    fn snapshot(&self) -> Option<ImageData> {
        let size = self.backing_size();
        if size.is_empty() {
            return None;
        }
        // Fails for tainted canvases; the resize then starts blank.
        Self::context(&self.canvas)?
            .get_image_data(0.0, 0.0, f64::from(size.width), f64::from(size.height))
            .ok()
    }

    fn restore(&mut self, snapshot: &ImageData) {
        if let Some(ctx) = Self::context(&self.canvas) {
            let _ = ctx.put_image_data(snapshot, 0.0, 0.0);
        }
    }

    fn put_pixels(&mut self, dest: Rect, pixels: &PixelBuffer) {
        let Ok(image) = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(pixels.data()),
            pixels.width(),
            pixels.height(),
        ) else {
            return;
        };
        let Some(ctx) = Self::context(&self.canvas) else {
            return;
        };

        if dest.size() == Size::new(f64::from(pixels.width()), f64::from(pixels.height())) {
            let _ = ctx.put_image_data(&image, dest.x0, dest.y0);
            return;
        }

        // putImageData cannot scale; stage the bitmap and stretch it over a
        // cleared destination so the result still replaces what was there.
        let Some(scratch) = self.scratch(pixels.width(), pixels.height()) else {
            return;
        };
        let Some(staging) = Self::context(scratch) else {
            return;
        };
        let _ = staging.put_image_data(&image, 0.0, 0.0);
        ctx.clear_rect(dest.x0, dest.y0, dest.width(), dest.height());
        let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
            scratch,
            dest.x0,
            dest.y0,
            dest.width(),
            dest.height(),
        );
    }

    fn set_min_size(&mut self, size: Size) {
        let s = self.canvas.style();
        let _ = s.set_property("min-width", &css_px(size.width));
        let _ = s.set_property("min-height", &css_px(size.height));
    }

    fn set_forced_width(&mut self, width: f64) {
        self.force_axis("width", FORCED_WIDTH_ATTRIBUTE, width);
    }

    fn set_forced_height(&mut self, height: f64) {
        self.force_axis("height", FORCED_HEIGHT_ATTRIBUTE, height);
    }

    fn set_visual_scale(&mut self, scale: Option<f64>) {
        // The CSS box is already in logical pixels, which is what maps the
        // physical backing store onto its logical footprint.
        let _ = match scale {
            Some(factor) => self
                .canvas
                .set_attribute(SCALE_ATTRIBUTE, &format!("{factor}")),
            None => self.canvas.remove_attribute(SCALE_ATTRIBUTE),
        };
    }

    fn bounding_rect(&self) -> Rect {
        let r = self.canvas.get_bounding_client_rect();
        let css = Rect::new(r.left(), r.top(), r.right(), r.bottom());
        // The client rect is in CSS pixels; map it into the units the core
        // divides back out.
        let Some(window) = self.canvas.owner_document().and_then(|d| d.default_view()) else {
            return css;
        };
        let viewport = WindowViewport::new(window);
        Scale::new(viewport.scale()).logical_to_viewport_rect(css, viewport.scroll_offset())
    }
}

/// Returns `true` if an inline CSS length is set to something other than
/// `auto`.
pub(crate) fn is_authored(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.eq_ignore_ascii_case("auto")
}

/// Returns `true` if an inline CSS length was set by an author: it is not
/// `auto` and differs from the value a resize recorded in `forced`.
pub(crate) fn is_authored_axis(inline: &str, forced: Option<&str>) -> bool {
    is_authored(inline) && forced.is_none_or(|forced| forced.trim() != inline.trim())
}

/// Formats a CSS pixel length.
pub(crate) fn css_px(v: f64) -> String {
    format!("{v}px")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_and_empty_are_not_authored() {
        assert!(!is_authored(""));
        assert!(!is_authored("auto"));
        assert!(!is_authored(" AUTO "));
        assert!(is_authored("120px"));
        assert!(is_authored("50%"));
    }

    #[test]
    fn forced_lengths_are_not_authored() {
        assert!(!is_authored_axis("80px", Some("80px")));
        assert!(!is_authored_axis("", Some("80px")));
        assert!(is_authored_axis("80px", None));
        // The author overwrote the forced value.
        assert!(is_authored_axis("120px", Some("80px")));
    }

    #[test]
    fn css_lengths() {
        assert_eq!(css_px(80.0), "80px");
        assert_eq!(css_px(12.5), "12.5px");
    }
}
