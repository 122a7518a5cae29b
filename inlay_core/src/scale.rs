// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between logical (CSS) units and physical (device) pixels.
//!
//! A [`Scale`] wraps the device-pixel ratio of the hosting view:
//!
//! ```text
//! physical = logical * scale
//! logical  = physical / scale
//! ```
//!
//! Callers read the ratio from the environment on every operation (see
//! [`Viewport::scale`](crate::backend::Viewport::scale)) and build a fresh
//! `Scale` from it, so a live ratio change is picked up by the next pass.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Rect, Size, Vec2};

/// Integer size of a drawing surface's backing store, in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PhysicalSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

impl PhysicalSize {
    /// A zero-area backing store.
    pub const EMPTY: Self = Self::new(0, 0);

    /// Creates a size from its components.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either axis is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A device-pixel ratio.
///
/// Non-finite or non-positive ratios are treated as `1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale(f64);

impl Scale {
    /// The identity ratio: logical and physical units coincide.
    pub const IDENTITY: Self = Self(1.0);

    /// Creates a scale from a raw device-pixel ratio.
    #[must_use]
    pub fn new(ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            Self(ratio)
        } else {
            Self::IDENTITY
        }
    }

    /// Returns the raw ratio.
    #[inline]
    #[must_use]
    pub const fn factor(self) -> f64 {
        self.0
    }

    /// Returns `true` if the ratio is exactly one.
    #[inline]
    #[must_use]
    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }

    /// Converts a logical length to physical units.
    #[inline]
    #[must_use]
    pub fn to_physical(self, v: f64) -> f64 {
        v * self.0
    }

    /// Converts a physical length to logical units.
    #[inline]
    #[must_use]
    pub fn to_logical(self, v: f64) -> f64 {
        v / self.0
    }

    /// Converts a logical length to a whole number of device pixels.
    ///
    /// Rounds half away from zero; negative and non-finite results clamp
    /// to zero.
    #[must_use]
    pub fn to_physical_extent(self, v: f64) -> u32 {
        let px = self.to_physical(v).round();
        if px.is_finite() && px > 0.0 {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "value is rounded, positive, and saturates on overflow"
            )]
            let px = px as u32;
            px
        } else {
            0
        }
    }

    /// Converts a logical size to a physical backing-store size.
    #[must_use]
    pub fn to_physical_size(self, size: Size) -> PhysicalSize {
        PhysicalSize::new(
            self.to_physical_extent(size.width),
            self.to_physical_extent(size.height),
        )
    }

    /// Converts a logical rectangle to physical units.
    #[must_use]
    pub fn rect_to_physical(self, rect: Rect) -> Rect {
        rect.scale_from_origin(self.0)
    }

    /// Converts a physical rectangle to logical units.
    #[must_use]
    pub fn rect_to_logical(self, rect: Rect) -> Rect {
        rect.scale_from_origin(1.0 / self.0)
    }

    /// Converts an element's viewport rectangle to logical units.
    ///
    /// The document carries a visual zoom correction of `1 / scale`, so the
    /// scroll offset must be added back before dividing and subtracted after
    /// to invert the visual transform. The size is a plain division.
    #[must_use]
    pub fn viewport_rect_to_logical(self, rect: Rect, scroll: Vec2) -> Rect {
        if self.is_identity() {
            return rect;
        }
        let x = self.to_logical(rect.x0 + scroll.x) - scroll.x;
        let y = self.to_logical(rect.y0 + scroll.y) - scroll.y;
        Rect::from_origin_size(
            (x, y),
            (self.to_logical(rect.width()), self.to_logical(rect.height())),
        )
    }

    /// Maps a logical CSS box to the viewport rectangle the geometry pass
    /// expects; the exact inverse of
    /// [`viewport_rect_to_logical`](Self::viewport_rect_to_logical).
    ///
    /// Backends whose document carries no visual zoom correction use this to
    /// report element geometry, so the logical box comes back unchanged.
    #[must_use]
    pub fn logical_to_viewport_rect(self, rect: Rect, scroll: Vec2) -> Rect {
        if self.is_identity() {
            return rect;
        }
        let x = self.to_physical(rect.x0 + scroll.x) - scroll.x;
        let y = self.to_physical(rect.y0 + scroll.y) - scroll.y;
        Rect::from_origin_size(
            (x, y),
            (self.to_physical(rect.width()), self.to_physical(rect.height())),
        )
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_ratio_falls_back_to_identity() {
        assert_eq!(Scale::new(0.0), Scale::IDENTITY);
        assert_eq!(Scale::new(-2.0), Scale::IDENTITY);
        assert_eq!(Scale::new(f64::NAN), Scale::IDENTITY);
        assert_eq!(Scale::new(1.5).factor(), 1.5);
    }

    #[test]
    fn rect_round_trip_at_scale_two() {
        let scale = Scale::new(2.0);
        let logical = Rect::from_origin_size((10.0, 20.0), (30.0, 40.0));
        let physical = scale.rect_to_physical(logical);
        assert_eq!(
            physical,
            Rect::from_origin_size((20.0, 40.0), (60.0, 80.0)),
            "physical rect"
        );
        assert_eq!(scale.rect_to_logical(physical), logical, "round trip");
    }

    #[test]
    fn physical_extent_rounds_half_away_from_zero() {
        let scale = Scale::new(1.5);
        assert_eq!(scale.to_physical_extent(3.0), 5, "4.5 rounds up");
        assert_eq!(scale.to_physical_extent(2.0), 3);
        assert_eq!(scale.to_physical_extent(-4.0), 0, "negative clamps");
        assert_eq!(
            scale.to_physical_size(Size::new(10.0, 1.0)),
            PhysicalSize::new(15, 2)
        );
    }

    #[test]
    fn viewport_rect_compensates_scroll() {
        let scale = Scale::new(2.0);
        let rect = Rect::from_origin_size((100.0, 50.0), (40.0, 20.0));
        let out = scale.viewport_rect_to_logical(rect, Vec2::new(0.0, 30.0));
        // x: (100 + 0) / 2 - 0, y: (50 + 30) / 2 - 30
        assert_eq!(out, Rect::from_origin_size((50.0, 10.0), (20.0, 10.0)));
    }

    #[test]
    fn viewport_mapping_inverts_exactly() {
        let scale = Scale::new(2.0);
        let scroll = Vec2::new(12.0, 30.0);
        let css = Rect::from_origin_size((100.0, 40.0), (10.0, 5.0));
        let reported = scale.logical_to_viewport_rect(css, scroll);
        assert_eq!(
            reported,
            Rect::from_origin_size((212.0, 110.0), (20.0, 10.0)),
            "x: (100 + 12) * 2 - 12, y: (40 + 30) * 2 - 30"
        );
        assert_eq!(scale.viewport_rect_to_logical(reported, scroll), css);
    }

    #[test]
    fn identity_scale_leaves_viewport_rect_untouched() {
        let rect = Rect::from_origin_size((1.5, 2.5), (3.0, 4.0));
        assert_eq!(
            Scale::IDENTITY.viewport_rect_to_logical(rect, Vec2::new(7.0, 9.0)),
            rect
        );
    }
}
