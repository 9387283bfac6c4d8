use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;

use ragchat_cli::{config::Config, logging::init_logging, render::TerminalObserver};
use ragchat_client::{ChatController, ClientError, RagClient};
use ragchat_stream::SessionState;

#[derive(Parser, Debug)]
#[command(name = "ragchat-cli")]
#[command(author, version, about = "Chat with a RAG generation server", long_about = None)]
struct Cli {
    /// Extra TOML config layered over config/default.toml
    #[arg(short = 'c', long, env = "RAGCHAT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the server URL from config
    #[arg(short = 's', long, value_name = "URL")]
    server_url: Option<String>,

    /// Answer without retrieving from the knowledge base
    #[arg(long)]
    no_kb: bool,

    /// Cancel an answer that takes longer than this many seconds
    #[arg(short = 't', long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Ask a single question and exit; starts an interactive chat when omitted
    question: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    init_logging(&config.logging);

    let mut client_config = config.client_config();
    if let Some(url) = cli.server_url {
        client_config.server_url = url;
    }
    tracing::info!("Using generate endpoint {}", client_config.generate_url());

    let client = RagClient::new(client_config).context("Failed to create RAG client")?;

    let mut options = config.generation.clone();
    if cli.no_kb {
        options.use_knowledge_base = false;
    }

    let mut controller = ChatController::new(Arc::new(client), options).with_parser(config.parser());
    let deadline = cli
        .timeout
        .or(config.server.request_timeout_secs)
        .map(Duration::from_secs);

    spawn_interrupt_handler(&controller);

    match cli.question {
        Some(question) => {
            ask(&mut controller, &question, deadline)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;
        }
        None => repl(&mut controller, deadline).await?,
    }

    Ok(())
}

/// First Ctrl-C stops the answer in progress; with nothing streaming it exits
fn spawn_interrupt_handler(controller: &ChatController) {
    let flight = controller.flight();
    tokio::spawn(async move {
        loop {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
            if !flight.cancel_active() {
                std::process::exit(130);
            }
        }
    });
}

async fn ask(
    controller: &mut ChatController,
    question: &str,
    deadline: Option<Duration>,
) -> Result<(), ClientError> {
    let timer = deadline.map(|limit| {
        let flight = controller.flight();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            if flight.cancel_active() {
                tracing::warn!("Answer cancelled after {}s deadline", limit.as_secs());
            }
        })
    });

    let result = controller.send(question, TerminalObserver::stdout()).await;

    if let Some(timer) = timer {
        timer.abort();
    }

    let outcome = result?;
    tracing::info!(
        "Turn {} finished as {:?} in {}ms",
        outcome.session_id,
        outcome.state,
        outcome.elapsed_ms
    );
    if outcome.state == SessionState::Completed && outcome.unsignalled {
        tracing::warn!("Server closed the stream without an end-of-answer signal");
    }
    Ok(())
}

async fn repl(controller: &mut ChatController, deadline: Option<Duration>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Type a question, /reset to start over, /kb on|off, /quit to leave.");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                controller.reset();
                println!("Conversation cleared.");
            }
            "/kb on" => controller.options_mut().use_knowledge_base = true,
            "/kb off" => controller.options_mut().use_knowledge_base = false,
            question => {
                if let Err(e) = ask(controller, question, deadline).await {
                    tracing::error!("Turn failed ({:?}): {}", e.kind(), e);
                    eprintln!("{}", e.user_message());
                }
            }
        }
    }

    Ok(())
}
