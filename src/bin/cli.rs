//! Aurora CLI
//!
//! Command-line interface for Aurora operations:
//! - Ask for an insight (through the API or in-process)
//! - List records for a window
//! - Check server health
//! - Generate a default config file

use anyhow::{bail, Context};
use aurora::assembler::Mode;
use aurora::config::Config;
use aurora::narrative::NarrativeSynthesizer;
use aurora::pipeline::{InsightOrchestrator, InsightRequest};
use aurora::store::InMemoryStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "aurora")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Insights and narratives from HRV and stress data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8000", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question about your data
    Insight {
        /// Natural-language query
        query: String,
        /// Mode (energy, longevity)
        #[arg(short, long, default_value = "longevity")]
        mode: String,
        /// Window size in days
        #[arg(short, long)]
        days: Option<i64>,
        /// Run the pipeline in-process instead of calling the API
        #[arg(long)]
        local: bool,
    },

    /// List records for a window
    Records {
        /// Window size in days (1-30)
        #[arg(short, long, default_value = "7")]
        days: i64,
    },

    /// Show server health
    Health,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Insight {
            query,
            mode,
            days,
            local,
        } => {
            let request = InsightRequest { query, mode, days };

            let response = if local {
                run_local(&request).await?
            } else {
                let response = client
                    .post(format!("{}/api/insight", cli.api_url))
                    .json(&request)
                    .send()
                    .await
                    .with_context(|| format!("Cannot connect to Aurora API at {}", cli.api_url))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    bail!("Insight request failed ({}): {}", status, text);
                }
                response.json::<serde_json::Value>().await?
            };

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&response)?),
                _ => print_insight(&response),
            }
        }

        Commands::Records { days } => {
            let response = client
                .get(format!("{}/api/records", cli.api_url))
                .query(&[("days", days)])
                .send()
                .await
                .with_context(|| format!("Cannot connect to Aurora API at {}", cli.api_url))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                bail!("Records request failed ({}): {}", status, text);
            }

            let data: serde_json::Value = response.json().await?;
            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&data)?),
                _ => print_records(&data),
            }
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Aurora v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
                    println!("Store: {}", health["store"].as_str().unwrap_or("unknown"));
                    println!(
                        "Narrative: {} ({})",
                        health["narrative_backend"].as_str().unwrap_or("unknown"),
                        health["model"].as_str().unwrap_or("-")
                    );

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Make sure the Aurora API server is running:");
                    eprintln!("  cargo run --bin aurora-api");
                    return Err(e).context(format!("Cannot connect to Aurora API at {}", cli.api_url));
                }
            }
        }

        Commands::Config { output } => {
            let config = aurora::config::generate_default_config();

            match output {
                Some(path) => {
                    std::fs::write(&path, &config)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", config),
            }
        }
    }

    Ok(())
}

/// Run the pipeline in-process over the sample dataset
async fn run_local(request: &InsightRequest) -> anyhow::Result<serde_json::Value> {
    let config = aurora::logging::with_bootstrap(Config::load_default);
    let anchor = config
        .pipeline
        .sample_anchor
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let store = Arc::new(InMemoryStore::sample(anchor));
    let synthesizer = Arc::new(NarrativeSynthesizer::from_config(&config.narrative)?);
    let orchestrator = InsightOrchestrator::new(store, synthesizer, config.pipeline);

    let outcome = orchestrator.handle(request).await?;
    Ok(serde_json::to_value(&outcome.response)?)
}

fn print_insight(response: &serde_json::Value) {
    let mode = response["data"]["mode"].as_str().unwrap_or("-");
    println!("Mode: {}", mode);

    if mode == Mode::Energy.as_str() {
        let hero = &response["hero"];
        println!(
            "Coordination: {}/100 - {}",
            hero["coordination_score"].as_u64().unwrap_or(0),
            hero["headline"].as_str().unwrap_or("-")
        );
    }

    println!();
    println!("{}", response["insight"].as_str().unwrap_or(""));

    if let Some(takeaways) = response["narrative"]["key_takeaways"].as_array() {
        if !takeaways.is_empty() {
            println!();
            println!("Key takeaways:");
            for t in takeaways {
                println!("  - {}", t.as_str().unwrap_or("-"));
            }
        }
    }

    if let Some(recs) = response["recommendations"].as_array() {
        println!();
        println!("Recommendations:");
        for r in recs {
            println!("  - {}", r.as_str().unwrap_or("-"));
        }
    }

    let narrative = &response["narrative"];
    println!();
    println!(
        "Chart: {}  |  Model: {}{}",
        response["chart"]["chart_type"].as_str().unwrap_or("-"),
        narrative["model_name"].as_str().unwrap_or("-"),
        if narrative["fallback_used"].as_bool().unwrap_or(false) {
            " (fallback)"
        } else {
            ""
        }
    );
}

fn print_records(data: &serde_json::Value) {
    let rows = match data["data"].as_array() {
        Some(r) if !r.is_empty() => r,
        _ => {
            println!("No data for the selected window");
            return;
        }
    };

    println!("{:<20} | {:<8} | {:<8} | {:<4}", "Timestamp", "HRV", "Stress", "Age");
    println!("{}", "-".repeat(50));

    for row in rows {
        let ts = row["timestamp"]
            .as_str()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<20} | {:<8.1} | {:<8.1} | {:<4}",
            ts,
            row["hrv"].as_f64().unwrap_or(0.0),
            row["stress_score"].as_f64().unwrap_or(0.0),
            row["age"].as_u64().unwrap_or(0)
        );
    }

    if let Some(metrics) = data["metrics"].as_object() {
        println!();
        for (name, value) in metrics {
            println!("{:<24} {:.2}", name, value.as_f64().unwrap_or(0.0));
        }
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
