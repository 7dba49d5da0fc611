// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Netlens CLI - In-Process Network Traffic Logger
//!
//! Demonstration of the netlens library.

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use netlens::{Config, LogKind, NetLogger, Request};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("netlens=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "fetch" => {
            if args.len() < 3 {
                eprintln!("Usage: netlens fetch <url> [--deny <pattern>]...");
                return ExitCode::from(1);
            }
            fetch_url(&args[2], &args[3..]).await
        }
        "stats" => {
            if args.len() < 3 {
                eprintln!("Usage: netlens stats <url>...");
                return ExitCode::from(1);
            }
            fetch_stats(&args[2..]).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("netlens {}", netlens::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Netlens - In-Process Network Traffic Logger

USAGE:
    netlens <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>       Fetch a URL through the logger and print the log export
    stats <url>...    Fetch several URLs concurrently and print statistics
    help              Show this help message
    version           Show version information

OPTIONS:
    --deny <pattern>  Do not record URLs matching the pattern (fetch only)

EXAMPLES:
    netlens fetch https://example.com
    netlens fetch https://example.com --deny "\.png$"
    netlens stats https://example.com https://example.org
"#
    );
}

/// Parse `--deny <pattern>` pairs
fn parse_deny_patterns(args: &[String]) -> Result<Vec<String>> {
    let mut patterns = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--deny" => {
                let pattern = iter.next().context("--deny requires a pattern")?;
                patterns.push(pattern.clone());
            }
            other => anyhow::bail!("Unknown option: {}", other),
        }
    }
    Ok(patterns)
}

async fn fetch_url(url: &str, options: &[String]) -> Result<()> {
    let deny = parse_deny_patterns(options)?;

    let logger = NetLogger::new(Config::default());
    logger.start_with(|config| {
        for pattern in deny {
            config.add_deny_pattern(pattern);
        }
    });

    let client = logger.client().context("Failed to create client")?;
    println!("Fetching: {}", url);

    match client.get(url).await {
        Ok(response) => {
            println!("Status: {}", response.status);
            println!("Size: {} bytes", response.body_len());
            println!("Time: {}ms\n", response.response_time_ms);
        }
        Err(e) => println!("Request failed: {}\n", e),
    }

    print!("{}", logger.export_logs().await);
    logger.stop();
    Ok(())
}

async fn fetch_stats(urls: &[String]) -> Result<()> {
    let logger = NetLogger::new(Config::default().capture_bodies(false, true));
    logger.start();

    let client = logger.client().context("Failed to create client")?;
    let requests = urls
        .iter()
        .map(|url| Request::get(url).with_context(|| format!("Invalid URL: {}", url)))
        .collect::<Result<Vec<_>>>()?;

    println!("Fetching {} URLs...", requests.len());
    let results = client.execute_all(requests).await;
    let failures = results.iter().filter(|r| r.is_err()).count();

    let stats = logger.statistics().await;
    println!("\n=== Statistics ===");
    println!("Total:        {}", stats.total);
    println!("Success:      {}", stats.success);
    println!("Failed:       {}", stats.failed);
    println!("Transport errors: {}", failures);
    println!("Total bytes:  {}", stats.total_bytes);
    println!("Success rate: {:.1}%", stats.success_rate());
    for kind in [LogKind::Http, LogKind::Https] {
        println!("{:<13} {}", format!("{}:", kind), stats.count_of(kind));
    }

    for record in logger.store().get_failed().await {
        println!(
            "  - {} {} ({})",
            record.url(),
            record.status_code.map_or("-".to_string(), |s| s.to_string()),
            record.error.as_deref().unwrap_or("no error")
        );
    }

    logger.stop();
    Ok(())
}
