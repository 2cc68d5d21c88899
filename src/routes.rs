use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, get_service},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tracing::debug;

use crate::error::{NotFoundPage, PageError};
use crate::hot_reload::ws_handler;
use crate::page::{render_index_page, render_not_found, render_post_page};
use crate::state::{AppState, RouterState};

pub fn router(router_state: RouterState, content_dir: &FsPath) -> Router {
    let static_root = content_dir.join("static");
    let static_dir = get_service(ServeDir::new(&static_root));
    let favicon_ico = get_service(ServeFile::new(static_root.join("favicon.ico")));
    let favicon_png = get_service(ServeFile::new(static_root.join("favicon.png")));

    Router::new()
        .route("/", get(|| async { Redirect::permanent("/blog") }))
        .route("/blog", get(default_index))
        .route("/blog/{slug}", get(default_post))
        .route("/{locale}/blog", get(locale_index))
        .route("/{locale}/blog/{slug}", get(locale_post))
        .nest_service("/static", static_dir)
        .route_service("/favicon.ico", favicon_ico)
        .route_service("/favicon.png", favicon_png)
        .route("/ws", get(ws_handler))
        .with_state(router_state)
}

async fn post_response(state: &AppState, locale: &str, slug: &str) -> Response {
    match render_post_page(state, locale, slug, state.is_development).await {
        Ok(page) => Html(page).into_response(),
        Err(PageError::NotFound(reason)) => {
            debug!(%reason, "post not found");
            NotFoundPage(render_not_found(state, locale, slug).await).into_response()
        }
    }
}

async fn index_response(state: &AppState, locale: &str) -> Response {
    match render_index_page(state, locale, state.is_development).await {
        Ok(page) => Html(page).into_response(),
        Err(PageError::NotFound(reason)) => {
            debug!(%reason, "blog index not found");
            NotFoundPage(render_not_found(state, locale, "").await).into_response()
        }
    }
}

async fn default_post(Path(slug): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    post_response(&state, &state.site.default_locale, &slug).await
}

async fn locale_post(
    Path((locale, slug)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Response {
    post_response(&state, &locale, &slug).await
}

async fn default_index(State(state): State<Arc<AppState>>) -> Response {
    index_response(&state, &state.site.default_locale).await
}

async fn locale_index(Path(locale): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    index_response(&state, &locale).await
}
