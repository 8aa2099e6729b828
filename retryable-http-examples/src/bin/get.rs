//! Simple GET with retries.
//!
//! Fetches a URL with five exponentially backed-off attempts and prints
//! the response status and a body preview.
//!
//! Usage:
//!   # Fetch the default URL:
//!   cargo run --bin get
//!
//!   # Or specify a target:
//!   cargo run --bin get -- https://example.com
//!
//!   # Watch the retry loop on an unreliable target:
//!   RUST_LOG=retryable_http=debug cargo run --bin get -- http://localhost:9999

use retryable_http::{RetryClient, Strategy};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Check command line args first, then TARGET_URL env var, then default
    let url = env::args()
        .nth(1)
        .or_else(|| env::var("TARGET_URL").ok())
        .unwrap_or_else(|| "https://example.com".to_string());

    let client = RetryClient::builder()
        .attempts(5)
        .base_delay(Duration::from_millis(500))
        .strategy(Strategy::Exponential)
        .build()?;

    println!("GET {}", url);
    let response = client.get(url.as_str()).await?;

    println!("status: {}", response.status());
    println!("headers: {}", response.headers().len());
    println!("body: {} bytes", response.body().len());

    let body = response.body();
    let preview = &body[..body.len().min(200)];
    println!("{}", String::from_utf8_lossy(preview));

    Ok(())
}
