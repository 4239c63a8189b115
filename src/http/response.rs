//! HTTP response building module
//!
//! Provides builders for the responses this service emits, decoupled from the
//! handlers that choose them.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::assets::Asset;

/// Body of every static-asset failure
pub const ASSET_NOT_FOUND_BODY: &str = "Asset not found or error in serving static content.";

/// Build 404 response for a static asset that cannot be served
pub fn build_asset_not_found_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain;charset=UTF-8")
        .body(Full::new(Bytes::from_static(ASSET_NOT_FOUND_BODY.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from_static(ASSET_NOT_FOUND_BODY.as_bytes())))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache_control: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag);
    if let Some(value) = cache_control {
        builder = builder.header("Cache-Control", value);
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 200 response carrying a stored asset
pub fn build_asset_response(
    asset: Asset,
    is_head: bool,
    cache_control: Option<&str>,
) -> Response<Full<Bytes>> {
    let content_length = asset.body.len();
    let body = if is_head { Bytes::new() } else { asset.body };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", asset.content_type)
        .header("Content-Length", content_length)
        .header("ETag", &asset.etag);
    if let Some(value) = cache_control {
        builder = builder.header("Cache-Control", value);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build compact JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from_static(
                    br#"{"error":"Internal server error"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
