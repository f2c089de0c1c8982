use anyhow::Result;
use colored::Colorize;
use osusume::logging;
use osusume::source::{ContentSource, HttpSource};
use std::env;
use std::process;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    logging::configure_logging();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        return Ok(());
    }

    let query = &args[1];
    let page: u32 = args
        .iter()
        .position(|arg| arg == "--page")
        .and_then(|i| args.get(i + 1))
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let base_url = env::var("UPSTREAM_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000/api/".to_string());

    println!("Searching upstream at {} for: {}", base_url, query);

    let source = HttpSource::new(&base_url)?;

    match source.search(query, page).await {
        Ok(results) => {
            println!("\n{}", "═".repeat(100).bright_blue());
            println!(
                "{}  {} (page {})",
                "SEARCH RESULTS".bright_blue(),
                query.bright_yellow(),
                page
            );
            println!("{}", "═".repeat(100).bright_blue());

            println!(
                "{}: {} videos, {} shorts",
                "Mapped".bright_blue(),
                results.videos.len(),
                results.shorts.len()
            );

            if !results.videos.is_empty() {
                println!("\n{}", "Videos".bright_green());
                println!("{}", "─".repeat(80).dimmed());
                for (i, candidate) in results.videos.iter().take(10).enumerate() {
                    println!(
                        "{}. {} ({}s)\n   {} [{}]",
                        i + 1,
                        candidate.title.bright_white(),
                        candidate.duration_seconds,
                        candidate.channel_name.bright_cyan(),
                        candidate.channel_id.dimmed()
                    );
                }
                if results.videos.len() > 10 {
                    println!("... and {} more videos", results.videos.len() - 10);
                }
            }

            if !results.shorts.is_empty() {
                println!("\n{}", "Shorts".bright_green());
                println!("{}", "─".repeat(80).dimmed());
                for (i, candidate) in results.shorts.iter().take(10).enumerate() {
                    println!(
                        "{}. {} - {}",
                        i + 1,
                        candidate.title.bright_white(),
                        candidate.channel_name.bright_cyan()
                    );
                }
            }

            println!("\n{}", "═".repeat(100).bright_blue());

            if results.videos.is_empty() && results.shorts.is_empty() {
                eprintln!("Search succeeded but mapped no usable candidates");
                process::exit(1);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Search failed: {}", err);
            process::exit(2);
        }
    }
}

// Print usage instructions
fn print_usage(program_name: &str) {
    println!("Usage: {} <query> [--page N]", program_name);
    println!("\nEnvironment:");
    println!("  UPSTREAM_BASE_URL    Upstream proxy API root (default http://localhost:3000/api/)");
    println!("\nExamples:");
    println!("  {} \"ゲーム実況\"", program_name);
    println!("  {} \"料理 レシピ\" --page 2", program_name);
}
