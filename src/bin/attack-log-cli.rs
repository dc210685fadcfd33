use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "attack-log-cli")]
#[command(about = "Inspect and drive a running attack-log server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server status and log sizes
    Status,
    /// Print captured requests, newest first
    Logs {
        /// Only attack-flagged requests
        #[arg(short, long)]
        attacks: bool,
        /// Maximum entries to print
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Ask the server to forward a request
    Forward {
        /// Path on the target, e.g. /api/users
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Target host (sent as the Host header)
        #[arg(long)]
        host: Option<String>,
        /// JSON body for POST/PUT/PATCH
        #[arg(short, long)]
        body: Option<String>,
        /// Extra header as NAME:VALUE, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/api/status", cli.url)).send().await?;
            print_response(res, None).await?;
        }
        Commands::Logs { attacks, limit } => {
            let endpoint = if attacks { "api/attack-logs" } else { "api/logs" };
            let res = client.get(format!("{}/{}", cli.url, endpoint)).send().await?;
            print_response(res, limit).await?;
        }
        Commands::Forward { path, method, host, body, headers } => {
            let mut header_map = Map::new();
            for header in headers {
                let (name, value) = header
                    .split_once(':')
                    .ok_or_else(|| format!("header must be NAME:VALUE, got {header:?}"))?;
                header_map.insert(name.trim().to_string(), Value::String(value.trim().to_string()));
            }
            if let Some(host) = host {
                header_map.insert("Host".to_string(), Value::String(host));
            }

            let mut payload = json!({ "path": path, "method": method, "headers": header_map });
            if let Some(body) = body {
                payload["body"] = serde_json::from_str(&body)?;
            }

            let res = client
                .post(format!("{}/api/log", cli.url))
                .json(&payload)
                .send()
                .await?;
            print_response(res, None).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response, limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let mut json: Value = res.json().await?;
    if let (Some(limit), Value::Array(entries)) = (limit, &mut json) {
        entries.truncate(limit);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
