//! HTTP request dispatch
//!
//! The dispatcher maps a request path to a template identifier, starts
//! the execution, and races the unit's `exec-started` signal against a
//! pre-output `error` to decide the response: a streamed 200 once
//! execution begins, 404 for a missing template, 500 for anything else.
//! Errors after the first output byte can only be logged; the stream is
//! never rolled back.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::Poll;
use std::time::SystemTime;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream;
use log::{error, info};
use tokio::sync::mpsc;

use crate::config::TemplateSettings;
use crate::core::{DataContext, SourceMetadata, TemplateUnit};
use crate::orchestration::TemplateExecutor;
use crate::sink::ChannelSink;

/// Shared state for the template service
pub struct TemplateService {
    pub executor: Arc<TemplateExecutor>,
    pub settings: Arc<TemplateSettings>,
}

/// Build the router that hands every path to the template dispatcher.
pub fn build_router(service: Arc<TemplateService>) -> Router {
    Router::new().fallback(serve_template).with_state(service)
}

/// Outcome of the pre-output phase of one execution.
enum Dispatch {
    Started(Option<SourceMetadata>),
    Failed { not_found: bool },
}

async fn serve_template(State(service): State<Arc<TemplateService>>, uri: Uri) -> Response {
    let identifier = uri.path().to_string();

    let (body_tx, mut body_rx) = mpsc::unbounded_channel::<Bytes>();
    let sink = Arc::new(ChannelSink::new(body_tx));
    let mut unit = TemplateUnit::for_identifier(&identifier, service.settings.clone(), sink);

    // First of exec-started/error decides status and headers.
    let (dispatch_tx, mut dispatch_rx) = mpsc::unbounded_channel::<Dispatch>();

    let tx = dispatch_tx.clone();
    unit.signals().on_exec_started(move |info| {
        let _ = tx.send(Dispatch::Started(info.metadata.clone()));
    });

    let failed_id = identifier.clone();
    unit.signals().on_error(move |err| {
        error!("template {failed_id} failed: {err}");
        let _ = dispatch_tx.send(Dispatch::Failed {
            not_found: err.is_not_found(),
        });
    });

    let complete_id = identifier.clone();
    unit.signals().on_complete(move || {
        info!("Complete: {complete_id}");
    });

    // The unit lives inside this task; when it finishes, the sink sender
    // drops and the body stream terminates.
    let executor = service.executor.clone();
    tokio::spawn(async move {
        executor.execute(&mut unit, &DataContext::new()).await;
    });

    match dispatch_rx.recv().await {
        Some(Dispatch::Started(metadata)) => {
            let body = Body::from_stream(stream::poll_fn(move |cx| {
                match body_rx.poll_recv(cx) {
                    Poll::Ready(Some(chunk)) => Poll::Ready(Some(Ok::<_, Infallible>(chunk))),
                    Poll::Ready(None) => Poll::Ready(None),
                    Poll::Pending => Poll::Pending,
                }
            }));

            let mut builder = Response::builder().status(StatusCode::OK);
            if let Some(modified) = metadata.and_then(|m| m.modified) {
                builder = builder.header(header::LAST_MODIFIED, http_date(modified));
            }
            builder
                .body(body)
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Some(Dispatch::Failed { not_found }) => {
            let status = if not_found {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::empty())
                .unwrap_or_else(|_| status.into_response())
        }
        // Execution ended without any signal; treat as internal.
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Format a timestamp as an RFC 7231 HTTP date.
fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use axum::body::to_bytes;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::engine::PassthroughCompiler;

    #[test]
    fn test_http_date_format() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(784111777);
        assert_eq!(http_date(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    fn router_for(root: &Path) -> Router {
        let service = Arc::new(TemplateService {
            executor: Arc::new(TemplateExecutor::new(Arc::new(PassthroughCompiler))),
            settings: Arc::new(TemplateSettings {
                root: root.to_path_buf(),
                default_document: "index.html".to_string(),
            }),
        });
        build_router(service)
    }

    #[tokio::test]
    async fn test_existing_template_streams_with_last_modified() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hello</h1>").unwrap();

        let response = router_for(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::LAST_MODIFIED));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"<h1>hello</h1>");
    }

    #[tokio::test]
    async fn test_trailing_separator_serves_default_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "docs-home").unwrap();

        let response = router_for(dir.path())
            .oneshot(Request::builder().uri("/docs/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"docs-home");
    }

    #[tokio::test]
    async fn test_missing_template_responds_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let response = router_for(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/nope.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
