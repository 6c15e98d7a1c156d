use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use care_agents::ChatTurnAgent;
use care_core::ChatInput;
use care_genai::Generator;
use care_lookup::Search;
use care_observability::{init_tracing, AppMetrics};
use care_storage::{InteractionLogRepository, Store};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "concierge")]
#[command(about = "Care Concierge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat loop against the local turn pipeline.
    Chat,
    /// One utterance in, one reply out, as JSON.
    Ask { message: String },
    /// Show recent hash-only interaction log entries.
    Logs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("care_cli");
    let cli = Cli::parse();

    let (agent, store) = build_agent().await?;

    match cli.command {
        Command::Chat => run_chat(agent).await?,
        Command::Ask { message } => {
            let reply = agent
                .handle_turn(ChatInput {
                    message,
                    token: None,
                })
                .await;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Logs { limit } => {
            let entries = store.recent_interactions(limit).await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

async fn run_chat(agent: ChatTurnAgent<Store, Search, Generator>) -> Result<()> {
    println!("Care Concierge chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = agent
            .handle_turn(ChatInput {
                message: message.to_string(),
                token: None,
            })
            .await;

        println!("\n{}\n", reply.reply_text);
    }

    Ok(())
}

async fn build_agent() -> Result<(ChatTurnAgent<Store, Search, Generator>, Arc<Store>)> {
    let metrics = AppMetrics::shared();

    let store = if let Ok(database_url) = env::var("CARE_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };
    let store = Arc::new(store);

    let search = Search::from_api_key(env::var("GOOGLE_MAPS_API_KEY").ok())?;
    let generator = Generator::from_api_key(env::var("OPENAI_API_KEY").ok())?;

    let agent = ChatTurnAgent::new(
        store.clone(),
        Arc::new(search),
        Arc::new(generator),
        metrics,
        env::var("CARE_LOG_SECRET").ok(),
    );

    Ok((agent, store))
}
