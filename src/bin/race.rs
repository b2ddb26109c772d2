use anyhow::{Context, Result};
use clap::Parser;
use linkrace::api::SearchResponse;
use std::io::Write;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "race")]
#[command(about = "Interactive client: race between two encyclopedia articles")]
struct Args {
    /// Base URL of the linkrace server
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    server: String,
}

/// Build the search URL with percent-encoded title path segments.
fn search_url(server: &str, start_title: &str, target_title: &str) -> Result<url::Url> {
    let mut url = url::Url::parse(server).context("Invalid server URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Server URL cannot be a base URL"))?
        .extend(["api", "v1", start_title, target_title]);
    Ok(url)
}

async fn prompt(reader: &mut BufReader<tokio::io::Stdin>, text: &str) -> Result<Option<String>> {
    print!("{}> ", text);
    std::io::stdout().flush()?;
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None); // EOF
    }
    Ok(Some(line.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let client = reqwest::Client::new();
    let mut stdin = BufReader::new(tokio::io::stdin());

    println!("Press CTRL+C at any time to stop the client.");

    loop {
        let Some(start_title) = prompt(&mut stdin, "Give the starting article").await? else {
            break;
        };
        let Some(target_title) = prompt(&mut stdin, "Give the target article").await? else {
            break;
        };
        if start_title.is_empty() || target_title.is_empty() {
            println!("Both titles are required.");
            continue;
        }

        let url = search_url(&args.server, &start_title, &target_title)?;
        let started = Instant::now();

        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                match response.json::<SearchResponse>().await {
                    Ok(body) if body.found => {
                        println!(
                            "Target reachable: yes (found from '{}')",
                            body.direct_ancestor.as_deref().unwrap_or("?")
                        );
                    }
                    Ok(_) => println!("Target reachable: no"),
                    Err(_) => println!("Server answered {} without a search result", status),
                }
            }
            Err(e) => {
                println!(
                    "Request failed, check your connection or the server address: {}",
                    e
                );
            }
        }
        println!("Search took: {:?}", started.elapsed());
    }

    Ok(())
}
