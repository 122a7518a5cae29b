// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser tests for the canvas element and the installed runtime.

#![cfg(target_arch = "wasm32")]

use inlay_backend_web::{
    CanvasElement, FORCED_WIDTH_ATTRIBUTE, OverlayElement as _, OverlayRuntime, SCALE_ATTRIBUTE,
    Viewport as _, WindowViewport,
};
use inlay_core::draw::PixelBuffer;
use inlay_core::scale::{PhysicalSize, Scale};
use js_sys::Promise;
use kurbo::{Rect, Size};
use wasm_bindgen::JsCast as _;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn placeholder(id: &str) -> HtmlCanvasElement {
    let doc = document();
    let canvas: HtmlCanvasElement = doc.create_element("canvas").unwrap().unchecked_into();
    canvas.set_id(id);
    canvas.class_list().add_1("GtkWidget").unwrap();
    doc.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

/// Resolves after pending mutation callbacks have run.
async fn next_task() {
    let promise = Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback(&resolve)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

fn has_child(runtime: &OverlayRuntime, id: &str) -> bool {
    runtime
        .children()
        .iter()
        .any(|child| child.as_string().as_deref() == Some(id))
}

fn pixel(canvas: &HtmlCanvasElement, x: f64, y: f64) -> Vec<u8> {
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .unwrap()
        .unwrap()
        .unchecked_into();
    ctx.get_image_data(x, y, 1.0, 1.0).unwrap().data().to_vec()
}

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PixelBuffer {
    let data = rgba.repeat((width * height) as usize);
    PixelBuffer::new(width, height, data).unwrap()
}

#[wasm_bindgen_test]
fn authored_size_reads_inline_style() {
    let canvas = placeholder("authored");
    canvas.style().set_property("width", "120px").unwrap();
    let el = CanvasElement::new(canvas);
    let authored = el.authored_size();
    assert!(authored.width);
    assert!(!authored.height);
}

#[wasm_bindgen_test]
fn resize_preserves_pixels_through_snapshot() {
    let mut el = CanvasElement::new(placeholder("snapshot"));
    el.set_backing_size(PhysicalSize::new(4, 4));
    el.put_pixels(Rect::new(0.0, 0.0, 4.0, 4.0), &solid(4, 4, [255, 0, 0, 255]));

    let snapshot = el.snapshot().unwrap();
    el.set_backing_size(PhysicalSize::new(8, 8));
    assert_eq!(pixel(el.canvas(), 0.0, 0.0), [0, 0, 0, 0], "resize clears");
    el.restore(&snapshot);
    assert_eq!(pixel(el.canvas(), 1.0, 1.0), [255, 0, 0, 255]);
    assert_eq!(pixel(el.canvas(), 6.0, 6.0), [0, 0, 0, 0]);
}

#[wasm_bindgen_test]
fn put_pixels_overwrites_instead_of_blending() {
    let mut el = CanvasElement::new(placeholder("overwrite"));
    el.set_backing_size(PhysicalSize::new(4, 4));
    el.put_pixels(Rect::new(0.0, 0.0, 4.0, 4.0), &solid(4, 4, [0, 0, 255, 255]));
    // A stretched, fully transparent bitmap must clear what was there.
    el.put_pixels(Rect::new(0.0, 0.0, 4.0, 4.0), &solid(2, 2, [0, 0, 0, 0]));
    assert_eq!(pixel(el.canvas(), 2.0, 2.0), [0, 0, 0, 0]);
}

#[wasm_bindgen_test]
fn styles_follow_resize_commands() {
    let mut el = CanvasElement::new(placeholder("styles"));
    el.set_min_size(Size::new(80.0, 40.0));
    el.set_forced_height(40.0);
    el.set_visual_scale(Some(2.0));
    let style = el.canvas().style();
    assert_eq!(style.get_property_value("min-width").unwrap(), "80px");
    assert_eq!(style.get_property_value("height").unwrap(), "40px");
    assert_eq!(el.canvas().get_attribute(SCALE_ATTRIBUTE).as_deref(), Some("2"));

    el.set_visual_scale(None);
    assert_eq!(el.canvas().get_attribute(SCALE_ATTRIBUTE), None);
}

#[wasm_bindgen_test]
fn install_adopts_existing_placeholders() {
    let canvas = placeholder("preexisting");
    canvas.style().set_property("display", "inline-block").unwrap();

    let runtime = inlay_backend_web::install().unwrap();
    assert!(
        runtime
            .children()
            .iter()
            .any(|id| id.as_string().as_deref() == Some("preexisting"))
    );
    assert_eq!(canvas.style().get_property_value("display").unwrap(), "none");
    assert_eq!((canvas.width(), canvas.height()), (0, 0));

    runtime.child_set_visible("preexisting", true);
    assert_eq!(
        canvas.style().get_property_value("display").unwrap(),
        "inline-block"
    );
    runtime.teardown();
    assert_eq!(runtime.children().length(), 0);
}

#[wasm_bindgen_test]
fn forced_size_is_not_authored_on_rediscovery() {
    let canvas = placeholder("forced");
    let mut el = CanvasElement::new(canvas.clone());
    el.set_forced_width(80.0);
    assert_eq!(
        canvas.get_attribute(FORCED_WIDTH_ATTRIBUTE).as_deref(),
        Some("80px")
    );

    // The same canvas, moved and adopted again.
    let again = CanvasElement::new(canvas.clone());
    assert!(!again.authored_size().width);

    canvas.style().set_property("width", "120px").unwrap();
    assert!(CanvasElement::new(canvas).authored_size().width);
}

#[wasm_bindgen_test]
fn bounding_rect_round_trips_to_the_css_box() {
    let canvas = placeholder("bounds");
    canvas.style().set_property("width", "30px").unwrap();
    canvas.style().set_property("height", "20px").unwrap();
    let el = CanvasElement::new(canvas.clone());

    let viewport = WindowViewport::new(web_sys::window().unwrap());
    let logical = Scale::new(viewport.scale())
        .viewport_rect_to_logical(el.bounding_rect(), viewport.scroll_offset());
    let r = canvas.get_bounding_client_rect();
    let css = Rect::new(r.left(), r.top(), r.right(), r.bottom());
    for (got, want) in [
        (logical.x0, css.x0),
        (logical.y0, css.y0),
        (logical.width(), css.width()),
        (logical.height(), css.height()),
    ] {
        assert!((got - want).abs() < 1e-9, "{got} != {want}");
    }
}

#[wasm_bindgen_test]
async fn removing_a_wrapper_forgets_nested_placeholders() {
    let runtime = inlay_backend_web::install().unwrap();
    let doc = document();
    let wrapper = doc.create_element("div").unwrap();
    doc.body().unwrap().append_child(&wrapper).unwrap();

    let canvas = doc.create_element("canvas").unwrap();
    canvas.set_id("nested");
    canvas.class_list().add_1("GtkWidget").unwrap();
    wrapper.append_child(&canvas).unwrap();
    next_task().await;
    assert!(has_child(&runtime, "nested"));

    wrapper.remove();
    next_task().await;
    assert!(!has_child(&runtime, "nested"));

    runtime.teardown();
}

#[wasm_bindgen_test]
async fn moved_placeholder_stays_adopted() {
    let runtime = inlay_backend_web::install().unwrap();
    let doc = document();
    let canvas = placeholder("moved");
    next_task().await;
    assert!(has_child(&runtime, "moved"));

    let target = doc.create_element("section").unwrap();
    doc.body().unwrap().append_child(&target).unwrap();
    target.append_child(&canvas).unwrap();
    next_task().await;
    assert!(has_child(&runtime, "moved"));

    runtime.teardown();
}
