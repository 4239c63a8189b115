//! Static asset resolver
//!
//! Maps request paths onto asset-store keys with the single-page-application
//! fallback, then serves the stored bytes.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

use crate::assets::AssetError;
use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache};
use crate::logger;

/// Rewrite a request path to the asset it should be served from.
///
/// `/` and any path without a `.` resolve to the root document so that
/// client-side routes load the application shell; everything else is
/// looked up verbatim.
///
/// ```
/// use roi_email_edge::handler::static_files::map_request_to_asset;
/// assert_eq!(map_request_to_asset("/calculadora/resultados", "index.html"), "/index.html");
/// assert_eq!(map_request_to_asset("/assets/app.js", "index.html"), "/assets/app.js");
/// ```
pub fn map_request_to_asset(path: &str, root_document: &str) -> String {
    if path == "/" || !path.contains('.') {
        format!("/{}", root_document.trim_start_matches('/'))
    } else {
        path.to_string()
    }
}

/// Store key for a mapped path: the path without its leading slashes
pub fn asset_key(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Serve the asset for this request, or the fixed 404
pub async fn serve_asset(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let mapped = map_request_to_asset(ctx.path, &state.config.assets.root_document);

    match lookup(ctx, &mapped, state).await {
        Ok(response) => response,
        Err(AssetError::NotFound(key)) => {
            logger::log_warning(&format!("Asset not found: {} -> {key}", ctx.path));
            http::build_asset_not_found_response()
        }
        Err(e) => {
            logger::log_error(&format!("Error serving static asset {}: {e}", ctx.path));
            http::build_asset_not_found_response()
        }
    }
}

async fn lookup(
    ctx: &RequestContext<'_>,
    mapped: &str,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, AssetError> {
    if ctx.method != Method::GET && ctx.method != Method::HEAD {
        return Err(AssetError::MethodNotAllowed(ctx.method.to_string()));
    }

    let asset = state
        .assets
        .get(asset_key(mapped), &state.background)
        .await?;

    let cache_control = cache::browser_cache_control(state.config.assets.browser_ttl);

    if cache::check_etag_match(ctx.if_none_match.as_deref(), &asset.etag) {
        return Ok(http::build_304_response(&asset.etag, cache_control.as_deref()));
    }

    Ok(http::build_asset_response(
        asset,
        ctx.method == Method::HEAD,
        cache_control.as_deref(),
    ))
}
