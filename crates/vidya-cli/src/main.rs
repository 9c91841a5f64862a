//! vidya CLI: college information chat and voice server.
//!
//! ```text
//! vidya serve [--config vidya.toml] [--port 5000] [--database-url sqlite:vidya.db]
//! vidya ask "What is the B.Tech fee?" [--server http://localhost:5000]
//! vidya speak "प्रवेश कब शुरू होंगे?" --out reply.mp3 [--server ...]
//! vidya facts [--category fees | --search hostel] [--file facts.json]
//! ```
//!
//! API keys are read from the environment (or a `.env` file) so they never
//! need to appear on the command line.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use secrecy::Secret;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vidya_lib::config::ServerConfig;
use vidya_lib::vidya_core::facts::FactStore;
use vidya_lib::vidya_core::types::Fact;

const DEFAULT_SERVER: &str = "http://localhost:5000";

/// vidya: bilingual college information assistant
#[derive(Parser)]
#[command(name = "vidya", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Ask the running server a question
    Ask {
        /// Question, in Hindi or English
        question: String,
        /// Continue an existing chat session
        #[arg(long)]
        session: Option<String>,
        /// Server URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Synthesize speech through the running server
    Speak {
        /// Text to speak
        text: String,
        /// Where to write the MP3
        #[arg(long, short, default_value = "speech.mp3")]
        out: PathBuf,
        /// Server URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Print college facts without a server
    Facts {
        /// Only facts in this category
        #[arg(long, conflicts_with = "search")]
        category: Option<String>,
        /// Only facts matching this text
        #[arg(long)]
        search: Option<String>,
        /// Facts JSON file instead of the bundled data
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// TOML config file
    #[arg(long, env = "VIDYA_CONFIG")]
    config: Option<PathBuf>,
    /// Listen host
    #[arg(long, env = "VIDYA_HOST")]
    host: Option<String>,
    /// Listen port
    #[arg(long, env = "PORT")]
    port: Option<u16>,
    /// `sqlite:` database URL; in-memory storage when unset
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Facts JSON file instead of the bundled data
    #[arg(long, env = "VIDYA_FACTS")]
    facts: Option<PathBuf>,
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    groq_api_key: Option<String>,
    #[arg(long, env = "CARTESIA_API_KEY", hide_env_values = true)]
    cartesia_api_key: Option<String>,
    #[arg(long, env = "CARTESIA_VOICE_ID")]
    cartesia_voice_id: Option<String>,
    #[arg(long, env = "CARTESIA_HINDI_VOICE_ID")]
    cartesia_hindi_voice_id: Option<String>,
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    elevenlabs_api_key: Option<String>,
    #[arg(long, env = "ELEVENLABS_VOICE_ID")]
    elevenlabs_voice_id: Option<String>,
}

impl ServeArgs {
    /// Config file (or defaults) with flags and environment applied on top.
    fn into_config(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(url) = self.database_url {
            config.database_url = Some(url);
        }
        if let Some(path) = self.facts {
            config.facts_path = Some(path);
        }
        if let Some(key) = self.groq_api_key {
            config.groq.api_key = Some(Secret::new(key));
        }
        if let Some(key) = self.cartesia_api_key {
            config.cartesia.api_key = Some(Secret::new(key));
        }
        if let Some(voice) = self.cartesia_voice_id {
            config.cartesia.voice_id = Some(voice);
        }
        if let Some(voice) = self.cartesia_hindi_voice_id {
            config.cartesia.hindi_voice_id = Some(voice);
        }
        if let Some(key) = self.elevenlabs_api_key {
            config.elevenlabs.api_key = Some(Secret::new(key));
        }
        if let Some(voice) = self.elevenlabs_voice_id {
            config.elevenlabs.voice_id = voice;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vidya=info,vidya_lib=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            let config = args.into_config()?;
            vidya_lib::server::serve(config).await?;
        }

        Command::Ask {
            question,
            session,
            server,
        } => {
            let resp = reqwest::Client::new()
                .post(format!("{server}/api/chat"))
                .json(&json!({ "message": question, "sessionId": session }))
                .send()
                .await
                .with_context(|| format!("connecting to {server}"))?;
            let status = resp.status();
            let body: Value = resp.json().await.context("reading chat response")?;
            if !status.is_success() {
                bail!("chat failed ({status}): {}", error_message(&body));
            }
            println!("{}", body["reply"].as_str().unwrap_or_default());
            eprintln!(
                "[{} · {} · session {}]",
                body["source"].as_str().unwrap_or("?"),
                body["language"].as_str().unwrap_or("?"),
                body["sessionId"].as_str().unwrap_or("?"),
            );
        }

        Command::Speak { text, out, server } => {
            let resp = reqwest::Client::new()
                .post(format!("{server}/api/tts"))
                .json(&json!({ "text": text }))
                .send()
                .await
                .with_context(|| format!("connecting to {server}"))?;
            let status = resp.status();
            if status.is_success() {
                let provider = header_str(&resp, "x-tts-provider");
                let language = header_str(&resp, "x-tts-language");
                let audio = resp.bytes().await.context("reading audio")?;
                tokio::fs::write(&out, &audio)
                    .await
                    .with_context(|| format!("writing {}", out.display()))?;
                info!("{} bytes from {provider} ({language})", audio.len());
                println!("{}", out.display());
            } else {
                let body: Value = resp.json().await.context("reading TTS response")?;
                if body["fallback"] == "browser" {
                    println!(
                        "No server voice available; the widget would speak this in the browser ({}):\n{}",
                        body["language"].as_str().unwrap_or("en"),
                        body["text"].as_str().unwrap_or_default()
                    );
                } else {
                    bail!("speech failed ({status}): {}", error_message(&body));
                }
            }
        }

        Command::Facts {
            category,
            search,
            file,
        } => {
            let store = match file {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    FactStore::from_json(&json)?
                }
                None => FactStore::bundled()?,
            };
            let facts: Vec<&Fact> = match (&category, &search) {
                (Some(c), _) => store.by_category(c),
                (None, Some(q)) => store.search(q),
                (None, None) => store.all().iter().collect(),
            };
            for fact in &facts {
                println!("[{}] {}: {}", fact.category, fact.title, fact.content);
            }
            if facts.is_empty() {
                eprintln!("no matching facts");
            }
        }
    }

    Ok(())
}

fn header_str(resp: &reqwest::Response, name: &str) -> String {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("?")
        .to_string()
}

fn error_message(body: &Value) -> &str {
    body["error"].as_str().unwrap_or("unknown error")
}
