// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay configuration.

use crate::time::Duration;

/// Names of the host's script message handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerNames {
    /// Receives the one-time "ready" signal.
    pub ready: &'static str,
    /// Receives batches of newly discovered children.
    pub children_discovered: &'static str,
    /// Receives batches of moved or resized children.
    pub children_moved: &'static str,
}

/// Configuration for an [`Overlay`](crate::overlay::Overlay) and the backend
/// that drives it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverlayConfig {
    /// Minimum spacing between geometry passes.
    pub throttle_window: Duration,
    /// Class that marks an element as an overlay placeholder.
    pub marker_class: &'static str,
    /// Tag name (upper case) overlay placeholders must have.
    pub element_tag: &'static str,
    /// Prefix of pixel payload URIs; the child id and image id follow.
    pub resource_scheme: &'static str,
    /// Host message handler names.
    pub handlers: HandlerNames,
}

impl OverlayConfig {
    /// Defaults matching the `maxwell` host protocol: `<canvas
    /// class="GtkWidget">` placeholders, `maxwell:///` payloads, 10 Hz
    /// geometry updates.
    #[must_use]
    pub const fn maxwell() -> Self {
        Self {
            throttle_window: Duration::from_millis(100),
            marker_class: "GtkWidget",
            element_tag: "CANVAS",
            resource_scheme: "maxwell:///",
            handlers: HandlerNames {
                ready: "maxwell_script_loaded",
                children_discovered: "maxwell_children_init",
                children_moved: "maxwell_children_move_resize",
            },
        }
    }

    /// Returns `true` if an inserted node qualifies as an overlay element:
    /// a non-empty id, the expected tag, and the marker class.
    #[must_use]
    pub fn accepts(&self, id: &str, tag: &str, has_marker_class: bool) -> bool {
        !id.is_empty() && tag.eq_ignore_ascii_case(self.element_tag) && has_marker_class
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::maxwell()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maxwell_defaults() {
        let config = OverlayConfig::default();
        assert_eq!(config.throttle_window, Duration::from_millis(100));
        assert_eq!(config.marker_class, "GtkWidget");
        assert_eq!(config.handlers.children_moved, "maxwell_children_move_resize");
    }

    #[test]
    fn accepts_requires_id_tag_and_class() {
        let config = OverlayConfig::maxwell();
        assert!(config.accepts("a", "CANVAS", true));
        assert!(config.accepts("a", "canvas", true), "tag is case-insensitive");
        assert!(!config.accepts("", "CANVAS", true), "empty id");
        assert!(!config.accepts("a", "DIV", true), "wrong kind");
        assert!(!config.accepts("a", "CANVAS", false), "no marker");
    }
}
