use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use sneaker_bot::Model;
use sneaker_bot::core::config::{self, CliOverrides};
use sneaker_bot::core::session::Session;
use sneaker_bot::core::state::App;
use sneaker_bot::inference::OpenRouterProvider;
use sneaker_bot::pipeline::{CURSOR_GLYPH, PipelineSettings, ResponsePipeline, RevealSink, TurnOutcome};
use sneaker_bot::tui;

#[derive(Parser)]
#[command(name = "sneaker-bot", about = "AI sneaker release tracker for the terminal")]
struct Args {
    /// Model to ask
    #[arg(short, long, value_enum)]
    model: Option<Model>,

    /// Response creativity, 0.0 to 1.0
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Attempts per question when the response can't be read, 1 to 5
    #[arg(long)]
    max_retries: Option<u8>,

    /// Refuse questions that aren't about sneakers
    #[arg(long)]
    topic_filter: bool,

    /// Ask one question, print the answer and exit
    #[arg(short, long)]
    prompt: Option<String>,
}

/// Prints each reveal frame's new words to stdout.
#[derive(Default)]
struct StdoutSink {
    printed: usize,
}

impl RevealSink for StdoutSink {
    fn show(&mut self, frame: &str) {
        let frame = frame.trim_end_matches(CURSOR_GLYPH);
        if let Some(new) = frame.get(self.printed..) {
            print!("{new}");
            let _ = io::stdout().flush();
            self.printed = frame.len();
        }
    }

    fn error(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

async fn run_headless(pipeline: ResponsePipeline, session: &mut Session, prompt: &str) {
    let mut sink = StdoutSink::default();
    let outcome = pipeline.run_turn(session, prompt, &mut sink).await;
    if sink.printed > 0 {
        println!();
    }
    match outcome {
        TurnOutcome::Completed(reply) => log::info!(
            "Headless turn done: attempts={}, failed={}",
            reply.attempts,
            reply.error.is_some()
        ),
        TurnOutcome::Refused => log::info!("Headless prompt refused"),
        TurnOutcome::Abandoned(e) => log::warn!("Headless turn abandoned: {}", e),
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to sneaker-bot.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("sneaker-bot.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().map_err(|e| io::Error::other(e.to_string()))?;
    let cli = CliOverrides {
        model: args.model,
        temperature: args.temperature,
        max_retries: args.max_retries,
        topic_filter: args.topic_filter,
    };
    let resolved = config::resolve(&file_config, &cli);

    log::info!(
        "Sneaker Bot starting up: model={}, temperature={}, max_retries={}, topic_filter={}, credential_set={}",
        resolved.model.id(),
        resolved.temperature,
        resolved.max_retries,
        resolved.topic_filter,
        !resolved.credential.is_missing()
    );

    let provider = OpenRouterProvider::new(Some(resolved.base_url.clone()), resolved.request_timeout)
        .map_err(|e| io::Error::other(e.to_string()))?;
    let pipeline = ResponsePipeline::new(Arc::new(provider), PipelineSettings::from(&resolved));

    if let Some(prompt) = args.prompt {
        let mut session = Session::new(resolved.request_config());
        run_headless(pipeline, &mut session, &prompt).await;
        return Ok(());
    }

    tui::run(App::from_config(&resolved), pipeline)
}
