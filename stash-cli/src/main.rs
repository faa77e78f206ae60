//! stash-cli — command-line frontend for the Linkstash HTTP API
//!
//! # Subcommands
//! - `save <url> [--notes] [--tags]` — save a link (enrichment runs server-side)
//! - `search <query> [--json]`       — AI search over saved links
//! - `list [--json]`                 — list saved links
//! - `status`                        — show server health

use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8767";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "stash-cli",
    version,
    about = "Linkstash — save links, let the AI find them again"
)]
struct Cli {
    /// Linkstash HTTP server URL (overrides STASH_HTTP_URL env var)
    #[arg(long, env = "STASH_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Bearer token identifying the owner (overrides STASH_TOKEN env var)
    #[arg(long, env = "STASH_TOKEN", default_value = "")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Save a link
    Save {
        /// URL to save
        url: String,

        /// Optional note attached to the link
        #[arg(long)]
        notes: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Ask a natural-language question about your saved links
    Search {
        /// Query text
        query: String,

        /// Output the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// List saved links, most recent first
    List {
        /// Output the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show Linkstash server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    answer: String,
    #[serde(rename = "matchedIds")]
    matched_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LinkItem {
    id: String,
    url: String,
    title: String,
    platform: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    ai_tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    links: Vec<LinkItem>,
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn client() -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?)
}

fn bail_on_error(resp: reqwest::blocking::Response) -> reqwest::blocking::Response {
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        eprintln!("stash-cli: server returned {}: {}", status, body);
        std::process::exit(1);
    }
    resp
}

fn do_save(
    server: &str,
    token: &str,
    url: &str,
    notes: Option<String>,
    tags: Option<String>,
) -> anyhow::Result<()> {
    let tags: Vec<String> = tags
        .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    let body = serde_json::json!({
        "url": url,
        "notes": notes,
        "tags": tags,
    });

    let resp = client()?
        .post(format!("{}/links", server))
        .bearer_auth(token)
        .json(&body)
        .send();

    let resp = match resp {
        Ok(r) => r,
        Err(e) => {
            eprintln!("stash-cli: connection failed to {}: {}", server, e);
            std::process::exit(1);
        }
    };
    let resp = bail_on_error(resp);

    let saved: serde_json::Value = resp.json().unwrap_or_default();
    println!(
        "Saved {} [{}] — AI is enriching it in the background",
        saved["url"].as_str().unwrap_or(url),
        saved["platform"].as_str().unwrap_or("?")
    );

    Ok(())
}

fn do_search(server: &str, token: &str, query: &str, json_output: bool) -> anyhow::Result<()> {
    let resp = client()?
        .post(format!("{}/search", server))
        .bearer_auth(token)
        .json(&serde_json::json!({ "query": query }))
        .send();

    let resp = match resp {
        Ok(r) => r,
        Err(e) => {
            eprintln!("stash-cli: connection failed to {}: {}", server, e);
            std::process::exit(1);
        }
    };
    let resp = bail_on_error(resp);

    if json_output {
        println!("{}", resp.text().unwrap_or_default());
        return Ok(());
    }

    let search: SearchResponse = match resp.json() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("stash-cli: failed to parse search response: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}\n", search.answer);
    if !search.matched_ids.is_empty() {
        println!("Matched links:");
        for id in &search.matched_ids {
            println!("  {}", id);
        }
    }

    Ok(())
}

fn do_list(server: &str, token: &str, json_output: bool) -> anyhow::Result<()> {
    let resp = client()?
        .get(format!("{}/links", server))
        .bearer_auth(token)
        .send();

    let resp = match resp {
        Ok(r) => r,
        Err(e) => {
            eprintln!("stash-cli: connection failed to {}: {}", server, e);
            std::process::exit(1);
        }
    };
    let resp = bail_on_error(resp);

    if json_output {
        println!("{}", resp.text().unwrap_or_default());
        return Ok(());
    }

    let list: ListResponse = match resp.json() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("stash-cli: failed to parse list response: {}", e);
            std::process::exit(1);
        }
    };

    if list.links.is_empty() {
        println!("No links saved yet.");
        return Ok(());
    }

    for l in &list.links {
        println!("{} [{}] {}", l.id, l.platform, l.title);
        println!("    {}", l.url);
        if let Some(summary) = &l.summary {
            println!("    {}", summary);
        }
        let all_tags: Vec<&str> = l
            .tags
            .iter()
            .chain(l.ai_tags.iter())
            .map(String::as_str)
            .collect();
        if !all_tags.is_empty() {
            println!("    tags: {}", all_tags.join(", "));
        }
        println!();
    }

    Ok(())
}

fn do_status(server: &str) -> anyhow::Result<()> {
    let resp = client()?.get(format!("{}/health", server)).send();

    match resp {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!(
                "Linkstash server: {}",
                body["status"].as_str().unwrap_or("unknown")
            );
            println!("Version:          {}", body["version"].as_str().unwrap_or("?"));
            println!(
                "PostgreSQL:       {}",
                body["postgresql"].as_str().unwrap_or("?")
            );
        }
        Ok(r) => {
            eprintln!("stash-cli: server unhealthy ({})", r.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("stash-cli: connection failed to {}: {}", server, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Save { url, notes, tags } => {
            do_save(&cli.server, &cli.token, &url, notes, tags)
        }
        Commands::Search { query, json } => do_search(&cli.server, &cli.token, &query, json),
        Commands::List { json } => do_list(&cli.server, &cli.token, json),
        Commands::Status => do_status(&cli.server),
    }
}
