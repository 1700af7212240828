// src/main.rs
// Museo CLI: serve the HTTP API or run a single flow from the terminal

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use museo::config::{ApiKeys, MuseoConfig, config_dir};
use museo::profile::{AgeInput, ExitTicketRequest, VisitorForm, parse_exhibits};
use museo::speech::{SpeechRequest, SpeechSynthesizer, Voice};
use museo::{Assistant, web};

#[derive(Parser)]
#[command(name = "museo")]
#[command(about = "Museum visit assistant: itineraries, kid Q&A, and exit tickets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Plan a visit
    Itinerary {
        #[arg(long)]
        age: String,

        /// Repeat for several interests
        #[arg(short, long = "interest", required = true)]
        interests: Vec<String>,

        /// How long the family will stay, e.g. "3 hours"
        #[arg(long)]
        stay: String,

        #[arg(long)]
        goals: Option<String>,

        #[arg(long)]
        arrival: Option<String>,

        #[arg(long)]
        language: Option<String>,

        /// Accessibility needs or other expectations
        #[arg(long)]
        notes: Option<String>,

        /// Also narrate the plan and save the audio here
        #[arg(long)]
        narrate: Option<PathBuf>,
    },

    /// Ask a one-off question on behalf of a child
    Ask {
        #[arg(long)]
        age: String,

        question: String,
    },

    /// Build a take-home exit ticket
    ExitTicket {
        #[arg(long)]
        age: String,

        /// Comma-separated exhibit names, in visit order
        #[arg(long)]
        exhibits: String,

        #[arg(long, default_value = "")]
        favorite: String,
    },

    /// Synthesize text to a WAV file
    Speak {
        #[arg(long)]
        text: String,

        #[arg(long)]
        voice: Option<Voice>,

        #[arg(short, long, default_value = "speech.wav")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from ~/.museo/.env or current dir)
    let env_path = Some(config_dir().join(".env")).filter(|p| p.exists());
    if let Some(path) = env_path {
        let _ = dotenvy::from_path(&path);
    } else {
        let _ = dotenvy::dotenv();
    }

    // Logs go to stderr so command output stays clean on stdout
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("museo=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = MuseoConfig::load();
    let keys = ApiKeys::from_env();
    let validation = config.validate(&keys);
    if !validation.warnings.is_empty() || !validation.errors.is_empty() {
        eprintln!("{}", validation.report());
    }
    if !validation.is_valid() {
        bail!("invalid configuration at {}", MuseoConfig::config_path().display());
    }

    match cli.command {
        Commands::Serve { host, port } => {
            let mut settings = config.server.clone();
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            let assistant = Assistant::from_config(&config, &keys);
            let state =
                web::AppState::new(Arc::new(assistant), keys.has_completion(), keys.has_video_search())
                    .with_audio_store(web::AudioStore::from_settings(&settings));
            web::run(&settings, state).await?;
        }
        Commands::Itinerary {
            age,
            interests,
            stay,
            goals,
            arrival,
            language,
            notes,
            narrate,
        } => {
            let profile = VisitorForm {
                age: AgeInput::Text(age),
                interests,
                learning_goals: goals,
                arrival_time: arrival,
                stay_duration: stay,
                language,
                accessibility_notes: notes,
            }
            .validate()?;
            let assistant = Assistant::from_config(&config, &keys);

            match narrate {
                None => println!("{}", assistant.itinerary.generate(&profile).await?),
                Some(dest) => {
                    let reply = assistant.itinerary.generate_narrated(&profile).await?;
                    println!("{}", reply.text);
                    match reply.audio.audio {
                        Some(audio) => {
                            let saved = audio.persist(&dest)?;
                            info!(path = %saved.display(), "narration saved");
                        }
                        None => eprintln!("Narration unavailable; see logs for details."),
                    }
                }
            }
        }
        Commands::Ask { age, question } => {
            let age = AgeInput::Text(age).parse()?;
            let assistant = Assistant::from_config(&config, &keys);
            println!("{}", assistant.questions.answer(age, &question).await?);
        }
        Commands::ExitTicket {
            age,
            exhibits,
            favorite,
        } => {
            let age = AgeInput::Text(age).parse()?;
            let request = ExitTicketRequest::new(age, parse_exhibits(&exhibits), favorite);
            let assistant = Assistant::from_config(&config, &keys);
            let bundle = assistant.exit_tickets.compose(&request).await?;

            println!("{}", bundle.summary_text);
            for (n, hit) in bundle.video_hits.iter().enumerate() {
                eprintln!("video {}: {}", n + 1, hit.watch_url());
            }
        }
        Commands::Speak { text, voice, out } => {
            let synthesizer = SpeechSynthesizer::new(
                museo::http::create_shared_client(),
                &config.speech,
                keys.openai.clone(),
            );
            let request = SpeechRequest::new(
                text,
                config.speech.instructions.clone(),
                voice.unwrap_or(config.speech.voice),
            );

            // The blocking wrapper owns its own runtime, so keep it off ours
            let audio = tokio::task::spawn_blocking(move || synthesizer.synthesize_blocking(&request))
                .await
                .context("speech task panicked")??;
            let saved = audio.persist(&out)?;
            println!("{}", saved.display());
        }
    }

    Ok(())
}
