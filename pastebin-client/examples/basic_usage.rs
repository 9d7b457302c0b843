//! Basic usage example for the Pastebin client
//!
//! This example demonstrates how to:
//! - Create a guest client and a logged-in client
//! - Configure the HTTP transport
//! - Create, list, read and delete pastes
//! - Read public pastes without a session
//!
//! Note: This example needs a Pastebin developer key in `PASTEBIN_DEV_KEY`.
//! Set `PASTEBIN_USERNAME` and `PASTEBIN_PASSWORD` as well to run the logged-in part.

use pastebin_client::{
    CreatePasteRequest, Endpoints, Expiration, PastebinClient, ReqwestTransport, Visibility,
    public,
};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let developer_key =
        std::env::var("PASTEBIN_DEV_KEY").expect("PASTEBIN_DEV_KEY environment variable not set");
    let username = std::env::var("PASTEBIN_USERNAME").unwrap_or_default();
    let password = std::env::var("PASTEBIN_PASSWORD").unwrap_or_default();

    // One transport shared by every client and helper in the process
    let transport = Arc::new(
        ReqwestTransport::builder()
            .timeout(Duration::from_secs(30))
            .build()?,
    );
    let endpoints = Endpoints::new();

    // Example 1: Guest client
    println!("=== Example 1: Guest Paste ===");
    let guest = PastebinClient::builder(Arc::clone(&transport))
        .developer_key(developer_key.as_str())
        .build()?;
    let key = guest.create_paste(
        &CreatePasteRequest::new("guest example", "Hello from Rust")
            .expiration(Expiration::TenMinutes)
            .visibility(Visibility::Unlisted),
    )?;
    println!("✓ Guest paste created: https://pastebin.com/{}", key);

    // Example 2: Raw fetch without a session
    println!("\n=== Example 2: Raw Content ===");
    match public::get_paste_content(&*transport, &endpoints, &key) {
        Ok(content) => println!("✓ Content: {}", content),
        Err(e) => println!("✗ Failed to fetch content: {}", e),
    }

    if username.is_empty() {
        println!("\nPASTEBIN_USERNAME not set, skipping logged-in examples");
        return Ok(());
    }

    // Example 3: Logged-in client
    println!("\n=== Example 3: Logged-in Client ===");
    let client = PastebinClient::builder(Arc::clone(&transport))
        .developer_key(developer_key.as_str())
        .credentials(username, password)
        .build()?;
    println!("✓ Logged in as {}", client.username());

    let key = client.create_paste(
        &CreatePasteRequest::new("private example", "fn main() {}")
            .expiration(Expiration::OneHour)
            .visibility(Visibility::Private)
            .syntax("rust"),
    )?;
    println!("✓ Private paste created: {}", key);

    for paste in client.list_pastes()? {
        println!(
            "  {} [{}] {} ({} bytes, {} hits)",
            paste.key(),
            paste.visibility(),
            paste.title(),
            paste.size(),
            paste.hits()
        );
    }

    let content = client.get_user_paste_content(&key)?;
    println!("✓ Own paste content: {}", content);

    client.delete_paste(&key)?;
    println!("✓ Paste {} deleted", key);

    // Example 4: Scraping API (requires an allow-listed IP)
    println!("\n=== Example 4: Scraping API ===");
    match public::get_recent_scraped_pastes(&*transport, &endpoints, "rust", 5) {
        Ok(pastes) => {
            for paste in pastes {
                println!("  {} by {:?}: {}", paste.key(), paste.user(), paste.title());
            }
        }
        Err(e) => println!("✗ Scraping API unavailable: {}", e),
    }

    Ok(())
}
