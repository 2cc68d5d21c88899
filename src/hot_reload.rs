use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use notify_debouncer_full::{
    new_debouncer,
    notify::{Error as NotifyError, RecursiveMode, Watcher},
    DebouncedEvent,
};
use tracing::{debug, error, info};

use crate::content_loader::load_templates;
use crate::error::ContentError;
use crate::state::{AppState, RefreshBroadcaster};
use crate::store::ContentStore;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<RefreshBroadcaster>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, tx))
}

async fn handle_socket(mut socket: WebSocket, tx: RefreshBroadcaster) {
    let mut rx = tx.subscribe();

    if rx.recv().await.is_ok()
        && socket.send(Message::Text("reload".into())).await.is_err()
    {
        debug!("Client disconnected before reload message could be sent");
    }
}

/// Reloads templates and posts. On failure the previous content stays
/// live.
pub async fn reload_content(app_state: &AppState) -> Result<(), ContentError> {
    info!("Reloading blog content...");
    let templates = load_templates(&app_state.content_dir).await?;
    let store = ContentStore::load(&app_state.content_dir, &app_state.site.locales).await?;

    {
        // Same lock order as the page renderers: store, then templates.
        let mut store_guard = app_state.store.write().await;
        let mut templates_guard = app_state.templates.write().await;
        *store_guard = store;
        *templates_guard = templates;
    }
    info!("Content successfully reloaded.");
    Ok(())
}

fn is_editor_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|s| s.starts_with(".#") || s.ends_with('~') || s.ends_with(".swp"))
}

fn is_relevant(event: &DebouncedEvent) -> bool {
    let kind = event.kind;
    (kind.is_modify() || kind.is_create() || kind.is_remove())
        && !event.event.paths.iter().all(|p| is_editor_temp_file(p))
}

pub fn start_content_watcher(tx: RefreshBroadcaster, app_state: Arc<AppState>) {
    info!(dir = %app_state.content_dir.display(), "Starting content watcher for hot-reload...");
    tokio::spawn(async move {
        let (watcher_tx, mut watcher_rx) = tokio::sync::mpsc::channel(1);

        let debouncer = new_debouncer(
            Duration::from_millis(200),
            None,
            move |res: Result<Vec<DebouncedEvent>, Vec<NotifyError>>| match res {
                Ok(events) => {
                    let changed: Vec<_> = events
                        .iter()
                        .filter(|e| is_relevant(e))
                        .flat_map(|e| &e.event.paths)
                        .map(|p| p.display().to_string())
                        .collect();
                    if !changed.is_empty() {
                        debug!(?changed, "Relevant file change detected");
                        // A full channel already has a reload queued.
                        let _ = watcher_tx.try_send(());
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!("Watcher error: {}", e);
                    }
                }
            },
        );
        let mut debouncer = match debouncer {
            Ok(debouncer) => debouncer,
            Err(e) => {
                error!("Failed to create debouncer: {}", e);
                return;
            }
        };

        if let Err(e) = debouncer
            .watcher()
            .watch(&app_state.content_dir, RecursiveMode::Recursive)
        {
            error!("Failed to start watching content directory: {}", e);
            return;
        }

        while watcher_rx.recv().await.is_some() {
            if let Err(e) = reload_content(&app_state).await {
                error!("Failed to reload content: {}", e);
                continue;
            }

            if let Err(e) = tx.send(()) {
                debug!("No reload subscribers: {}", e);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::page::tests::test_site;
    use crate::page::tests::test_templates;

    #[test]
    fn editor_temp_files_are_ignored() {
        assert!(is_editor_temp_file(Path::new("content/posts/en/.#hello.md")));
        assert!(is_editor_temp_file(Path::new("content/posts/en/hello.md~")));
        assert!(!is_editor_temp_file(Path::new("content/posts/en/hello.md")));
    }

    #[tokio::test]
    async fn reload_swaps_in_new_posts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::write(root.join("layout.html"), "{{ content }}").unwrap();
        std::fs::write(root.join("banner.html"), "").unwrap();
        std::fs::write(root.join("not_found.html"), "{{slug}}").unwrap();
        std::fs::create_dir_all(root.join("posts/en")).unwrap();
        std::fs::write(
            root.join("posts/en/fresh.md"),
            "---\ntitle: Fresh\npublishedAt: \"2024-05-01\"\n---\nNew",
        )
        .unwrap();

        let state = AppState::new(
            test_site(),
            PathBuf::from(root),
            test_templates(),
            ContentStore::default(),
            false,
        );
        reload_content(&state).await.unwrap();

        assert!(state.store.read().await.find_post("en", "fresh").is_ok());
        assert_eq!(state.templates.read().await.layout_html, "{{ content }}");
    }

    #[tokio::test]
    async fn reload_waits_for_readers_before_swapping_anything() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::write(root.join("layout.html"), "new layout").unwrap();
        std::fs::write(root.join("banner.html"), "").unwrap();
        std::fs::write(root.join("not_found.html"), "{{slug}}").unwrap();

        let state = Arc::new(AppState::new(
            test_site(),
            root.to_path_buf(),
            test_templates(),
            crate::store::tests::sample_store(),
            false,
        ));

        let reader = state.store.read().await;
        let reload = tokio::spawn({
            let state = state.clone();
            async move { reload_content(&state).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The layout stays old while a request still holds the old posts.
        assert_eq!(
            state.templates.read().await.layout_html,
            test_templates().layout_html
        );
        assert!(reader.find_post("en", "hello-world").is_ok());
        drop(reader);

        reload.await.unwrap().unwrap();
        assert_eq!(state.templates.read().await.layout_html, "new layout");
        assert!(state.store.read().await.find_post("en", "hello-world").is_err());
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_content() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::new(
            test_site(),
            tmp.path().to_path_buf(),
            test_templates(),
            crate::store::tests::sample_store(),
            false,
        );

        assert!(reload_content(&state).await.is_err());
        assert!(state.store.read().await.find_post("en", "hello-world").is_ok());
    }
}
