// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Abortable pixel payload fetches.

use alloc::vec::Vec;

use inlay_core::draw::FetchError;
use wasm_bindgen::{JsCast as _, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortSignal, DomException, RequestInit, Response};

/// Fetches the raw bytes behind `uri`.
///
/// Aborting `signal` resolves the fetch with [`FetchError::Aborted`]. Any
/// other failure, including a non-OK status, is [`FetchError::Transport`].
pub async fn fetch_bytes(uri: &str, signal: &AbortSignal) -> Result<Vec<u8>, FetchError> {
    let window = web_sys::window().ok_or(FetchError::Transport)?;

    let init = RequestInit::new();
    init.set_method("GET");
    init.set_signal(Some(signal));

    let response: Response = JsFuture::from(window.fetch_with_str_and_init(uri, &init))
        .await
        .map_err(classify)?
        .dyn_into()
        .map_err(|_| FetchError::Transport)?;
    if !response.ok() {
        return Err(FetchError::Transport);
    }

    let body = response.array_buffer().map_err(classify)?;
    let buffer = JsFuture::from(body).await.map_err(classify)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn classify(err: JsValue) -> FetchError {
    match err.dyn_ref::<DomException>() {
        Some(e) if e.name() == "AbortError" => FetchError::Aborted,
        _ => FetchError::Transport,
    }
}
