//! Retry demonstration against a deliberately flaky local server.
//!
//! Starts an HTTP server on a random port that answers 500 to the first
//! two requests before succeeding, then drives the retrying client
//! against it.
//!
//! Usage:
//!   # Watch the backoff between attempts:
//!   RUST_LOG=retryable_http=debug cargo run --bin flaky-demo

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use retryable_http::{RetryClient, Strategy};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

const FAILURES_BEFORE_SUCCESS: u32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let hits = Arc::new(AtomicU32::new(0));

    let server_hits = hits.clone();
    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let hits = server_hits.clone();
            tokio::spawn(async move {
                let service = service_fn(move |_req: http::Request<hyper::body::Incoming>| {
                    let hits = hits.clone();
                    async move {
                        let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                        let (status, body) = if n <= FAILURES_BEFORE_SUCCESS {
                            println!("server: request {} -> 500", n);
                            (500, "try again")
                        } else {
                            println!("server: request {} -> 200", n);
                            (200, "made it")
                        };
                        Ok::<_, Infallible>(
                            http::Response::builder()
                                .status(status)
                                .body(Full::new(Bytes::from(body)))
                                .unwrap(),
                        )
                    }
                });
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    println!("flaky server listening on http://{}", addr);

    let client = RetryClient::builder()
        .attempts(5)
        .base_delay(Duration::from_millis(250))
        .strategy(Strategy::Exponential)
        .build()?;

    let started = Instant::now();
    let response = client.get(format!("http://{}/unstable", addr)).await?;
    let elapsed = started.elapsed();

    println!();
    println!(
        "client: {} after {} server hits in {:?}",
        response.status(),
        hits.load(Ordering::SeqCst),
        elapsed
    );
    println!(
        "client: body = {:?}",
        String::from_utf8_lossy(response.body())
    );

    Ok(())
}
