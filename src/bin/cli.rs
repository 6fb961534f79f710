//! ClipShelf CLI
//!
//! Command-line client for a running ClipShelf server:
//! - Push text and read the latest entry
//! - Browse and clear room history
//! - Manage the shared file shelf
//! - Check status

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipshelf-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Shared clipboard and file shelf client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8085", global = true)]
    pub api_url: String,

    /// Clipboard room ("default" or an 8-character room token)
    #[arg(short, long, default_value = "default", global = true)]
    pub room: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit text to the clipboard ("-" reads stdin)
    Push {
        /// Text to submit
        text: String,
    },

    /// Print the latest entry
    Latest,

    /// Show every stored entry
    History,

    /// Clear all entries in the room
    Clear,

    /// Generate a new room
    NewRoom,

    /// Manage shared files
    Files {
        #[command(subcommand)]
        command: FileCommands,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum FileCommands {
    /// List shared files
    List,

    /// Upload a file
    Upload {
        /// Path of the file to upload
        path: PathBuf,
    },

    /// Download a file
    Download {
        /// Shared file name
        name: String,
        /// Output path (default: the file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a file
    Delete {
        /// Shared file name
        name: String,
    },

    /// Delete every shared file
    DeleteAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let entries_url = format!("{}/api/v1/rooms/{}/entries", cli.api_url, cli.room);

    match cli.command {
        Commands::Push { text } => {
            let text = if text == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read stdin")?;
                buf
            } else {
                text
            };

            let response = client
                .post(&entries_url)
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await?;
            let response = check(response).await?;
            let result: serde_json::Value = response.json().await?;

            match result["status"].as_str() {
                Some("ok") => println!("Saved to room {}", cli.room),
                _ => println!("Nothing saved (empty text)"),
            }
        }

        Commands::Latest => {
            let view = fetch_view(&client, &entries_url).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&view["latest"])?);
            } else if let Some(text) = view["latest"]["text"].as_str() {
                println!("{}", text);
            } else {
                eprintln!("Clipboard is empty");
            }
        }

        Commands::History => {
            let view = fetch_view(&client, &entries_url).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_history(&view);
            }
        }

        Commands::Clear => {
            let response = client.delete(&entries_url).send().await?;
            check(response).await?;
            println!("Cleared room {}", cli.room);
        }

        Commands::NewRoom => {
            let response = client
                .post(format!("{}/api/v1/rooms", cli.api_url))
                .send()
                .await?;
            let response = check(response).await?;
            let room: serde_json::Value = response.json().await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&room)?);
            } else {
                println!("Room: {}", room["room"].as_str().unwrap_or("-"));
                println!("Page: {}{}", cli.api_url, room["page"].as_str().unwrap_or("/"));
            }
        }

        Commands::Files { command } => {
            run_files(&client, &cli.api_url, &cli.format, command).await?
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("ClipShelf v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
                    println!("  Entry store: {}", health["storage"].as_str().unwrap_or("-"));
                    println!("  File shelf:  {}", health["shelf"].as_str().unwrap_or("-"));
                    println!(
                        "  Live pages:  {}",
                        health["ws_connections"].as_u64().unwrap_or(0)
                    );

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Cannot connect to ClipShelf at {}", cli.api_url);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin clipshelf");
                    return Err(e.into());
                }
            }
        }

        Commands::Config { output } => {
            let config = clipshelf::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", config),
            }
        }
    }

    Ok(())
}

async fn run_files(
    client: &reqwest::Client,
    api_url: &str,
    format: &str,
    command: FileCommands,
) -> Result<()> {
    let files_url = format!("{}/api/v1/files", api_url);
    let file_url = |name: &str| format!("{}/{}", files_url, urlencoding::encode(name));

    match command {
        FileCommands::List => {
            let response = check(client.get(&files_url).send().await?).await?;
            let listing: serde_json::Value = response.json().await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print_files(&listing);
            }
        }

        FileCommands::Upload { path } => {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("Not a file path: {:?}", path))?
                .to_string();
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {:?}", path))?;

            let part = reqwest::multipart::Part::bytes(bytes).file_name(name.clone());
            let form = reqwest::multipart::Form::new().part("file", part);

            let response = client.post(&files_url).multipart(form).send().await?;
            let response = check(response).await?;
            let result: serde_json::Value = response.json().await?;

            let skipped = result["skipped"]
                .as_array()
                .map(|s| !s.is_empty())
                .unwrap_or(false);
            if skipped {
                println!("A file named '{}' already exists, upload skipped", name);
            } else {
                println!("Uploaded '{}'", name);
            }
        }

        FileCommands::Download { name, output } => {
            let response = check(client.get(file_url(&name)).send().await?).await?;
            let bytes = response.bytes().await?;

            let path = output.unwrap_or_else(|| PathBuf::from(&name));
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("Downloaded '{}' to {:?} ({} bytes)", name, path, bytes.len());
        }

        FileCommands::Delete { name } => {
            check(client.delete(file_url(&name)).send().await?).await?;
            println!("Deleted '{}'", name);
        }

        FileCommands::DeleteAll => {
            check(client.delete(&files_url).send().await?).await?;
            println!("All shared files deleted");
        }
    }

    Ok(())
}

async fn fetch_view(client: &reqwest::Client, url: &str) -> Result<serde_json::Value> {
    let response = check(client.get(url).send().await?).await?;
    Ok(response.json().await?)
}

/// Turn a non-success response into an error carrying the server's message
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    let message = body["error"]["message"].as_str().unwrap_or("no details");
    bail!("Request failed ({}): {}", status, message)
}

fn print_history(view: &serde_json::Value) {
    let mut entries = Vec::new();
    if view["latest"].is_object() {
        entries.push(&view["latest"]);
    }
    if let Some(history) = view["history"].as_array() {
        entries.extend(history.iter());
    }

    if entries.is_empty() {
        println!("Clipboard is empty");
        return;
    }

    println!("{:<4} {:<20} {}", "#", "Time", "Text");
    println!("{}", "-".repeat(60));

    for (i, entry) in entries.iter().enumerate() {
        let text = entry["text"].as_str().unwrap_or("");
        println!(
            "{:<4} {:<20} {}",
            i,
            entry["time"].as_str().unwrap_or("-"),
            preview(text, 40)
        );
    }
}

fn print_files(listing: &serde_json::Value) {
    let mut files: Vec<&serde_json::Value> = listing["files"]
        .as_array()
        .map(|f| f.iter().collect())
        .unwrap_or_default();

    if files.is_empty() {
        println!("No files shared yet.");
        return;
    }

    files.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));

    println!("{:<40} {:>12}", "Name", "Size");
    println!("{}", "-".repeat(53));
    for file in files {
        println!(
            "{:<40} {:>12}",
            file["name"].as_str().unwrap_or("-"),
            clipshelf::render::format_size(file["size"].as_u64().unwrap_or(0))
        );
    }
}

/// First line of `text`, cut to `max` characters
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    let mut out: String = line.chars().take(max).collect();
    if line.chars().count() > max || text.lines().nth(1).is_some() {
        out.push_str("...");
    }
    out
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 40), "short");
        assert_eq!(preview("first\nsecond", 40), "first...");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("", 10), "");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7260), "2h 1m");
        assert_eq!(format_duration(90000), "1d 1h");
    }

    #[test]
    fn test_cli_parses_file_commands() {
        let cli = Cli::parse_from([
            "clipshelf-cli",
            "--room",
            "ab12cd34",
            "files",
            "download",
            "a.txt",
            "-o",
            "out.txt",
        ]);
        assert_eq!(cli.room, "ab12cd34");
        match cli.command {
            Commands::Files {
                command: FileCommands::Download { name, output },
            } => {
                assert_eq!(name, "a.txt");
                assert_eq!(output, Some(PathBuf::from("out.txt")));
            }
            _ => panic!("expected files download"),
        }
    }
}
