//! Stream the overview of the newest articles in a group
//!
//! Run with: cargo run --example overview
//!
//! Reads NNTP_HOST, NNTP_PORT, NNTP_USER, NNTP_PASS and NNTP_GROUP.

use nntp_stream::{NntpClient, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::new(
        std::env::var("NNTP_HOST").unwrap_or_else(|_| "news.example.com".to_string()),
        std::env::var("NNTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(563),
        true,
        std::env::var("NNTP_USER").unwrap_or_else(|_| "user".to_string()),
        std::env::var("NNTP_PASS").unwrap_or_else(|_| "pass".to_string()),
    );

    println!("Connecting to {}:{}...", config.host, config.port);
    let mut client = NntpClient::connect(Arc::new(config)).await?;
    client.authenticate().await?;

    let caps = client.capabilities().await?;
    let compression = if caps.supports_gzip() {
        client
            .enable_compression(caps.supports_gzip_terminator())
            .await?
    } else {
        false
    };
    println!(
        "Compression: {}",
        if compression { "enabled" } else { "not available" }
    );

    let group = std::env::var("NNTP_GROUP").unwrap_or_else(|_| "alt.test".to_string());
    let info = client.group(&group).await?;
    println!(
        "Selected group '{}': {} articles ({}-{})",
        info.name, info.count, info.first, info.last
    );

    if info.count > 0 {
        let start = info.last.saturating_sub(100).max(info.first);
        let range = format!("{}-{}", start, info.last);
        println!("\nStreaming XOVER {}...", range);

        let mut records = client.xover(&range).await?;
        let mut seen = 0usize;
        while let Some(entry) = records.next_record().await? {
            seen += 1;
            if seen <= 5 {
                println!(
                    "  #{}: {} (by {}, {} bytes)",
                    entry.article_number, entry.subject, entry.author, entry.bytes
                );
            }
            // The rest of the body is drained by the next command
            if seen == 20 {
                break;
            }
        }
        println!("  ... read {} records", seen);
    }

    let (wire, inflated) = client.get_bandwidth_stats();
    if inflated > 0 {
        let ratio = (1.0 - (wire as f64 / inflated as f64)) * 100.0;
        println!(
            "\nBandwidth: {} bytes compressed, {} bytes original ({:.1}% savings)",
            wire, inflated, ratio
        );
    }

    client.quit().await?;
    println!("\nConnection closed.");

    Ok(())
}
