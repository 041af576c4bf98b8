use crate::config::Config;
use crate::handlers::dispatch_handler;
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::{Router, body::Body, http::Request};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Build the router: every path and method falls through to dispatch.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch_handler)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri()
                )
            }),
        )
}

/// Bind the configured address and serve until Ctrl-C
pub async fn run(config: &Config, app: Router) -> Result<()> {
    let addr = config.listen_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(address = %listener.local_addr()?, "Mock server listening");

    serve(listener, app, shutdown_signal()).await
}

/// Accept connections until `shutdown` completes.
///
/// Each connection runs on its own task. A connection that fails while the
/// response is being written is logged; the client already has whatever was
/// sent.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            },
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, no longer accepting connections");
                return Ok(());
            }
        };

        let service = TowerToHyperService::new(app.clone());
        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::error!(peer = %peer, error = %e, "write response");
            }
        });
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Api, Examples, Response, Route};
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn app() -> Router {
        let api = Api::new(vec![Route::new(
            "/pets/{id}",
            "GET",
            vec![Response::new(200).with_examples(Examples::single(json!({"id": 1})))],
        )])
        .unwrap();

        router(AppState::new(api))
    }

    async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serve_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, app(), async move {
            let _ = stop_rx.await;
        }));

        let response = raw_request(
            addr,
            "GET /pets/7/ HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(response.ends_with(r#"{"id":1}"#));

        let response = raw_request(
            addr,
            "GET /cats HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found"));

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
