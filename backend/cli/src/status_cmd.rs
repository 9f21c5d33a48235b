//! CLI Status Command
//!
//! Probes the liveness endpoint of a locally running proxy.

use anyhow::Result;

pub async fn run(port: u16) -> Result<()> {
    let url = format!("http://localhost:{port}/");
    let client = reqwest::Client::new();

    match client.get(&url).send().await {
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if status.is_success() {
                println!("🟢 Draftschema is up on port {port} ({})", body.trim());
            } else {
                println!("🟡 Draftschema answered {status} on port {port}");
            }
        }
        Err(_) => {
            println!("🔴 Draftschema is not running on port {port}");
        }
    }

    Ok(())
}
