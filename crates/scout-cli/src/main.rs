mod export;
mod views;

use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use scout_contracts::chat::{parse_intent, Intent, CHAT_HELP_COMMANDS};
use scout_contracts::events::{EventKind, EventWriter};
use scout_contracts::models::{ModelRole, ModelSelector};
use scout_contracts::results::SearchMode;
use scout_contracts::session::SessionState;
use scout_engine::{GeminiTransport, QueryService, ScoutConfig, SearchController};
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(
    name = "scout",
    version,
    about = "Web search, web image search and image generation on Gemini"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Grounded web search with a concise summary and sources.
    Search(QueryArgs),
    /// Web image search (up to 6 results).
    Images(QueryArgs),
    /// Generate 4 images from a prompt.
    Generate(GenerateArgs),
    /// Interactive session; plain lines are queries in the current mode.
    Chat(ChatArgs),
}

#[derive(Debug, Args)]
struct ModelArgs {
    #[arg(long)]
    text_model: Option<String>,
    #[arg(long)]
    image_model: Option<String>,
}

#[derive(Debug, Args)]
struct QueryArgs {
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
    /// Print the typed result as JSON instead of the text view.
    #[arg(long)]
    json: bool,
    #[arg(long)]
    events: Option<PathBuf>,
    #[command(flatten)]
    models: ModelArgs,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    query: QueryArgs,
    /// Directory to write the generated images to.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ChatArgs {
    #[arg(long, default_value = "web", value_parser = parse_mode)]
    mode: SearchMode,
    /// Default directory for /save; also holds events.jsonl unless --events is given.
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    events: Option<PathBuf>,
    #[command(flatten)]
    models: ModelArgs,
}

fn parse_mode(raw: &str) -> Result<SearchMode, String> {
    raw.parse()
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("scout error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = ScoutConfig::from_env()?;
    match cli.command {
        Command::Search(args) => run_query_native(&config, SearchMode::Web, &args, None),
        Command::Images(args) => run_query_native(&config, SearchMode::WebImage, &args, None),
        Command::Generate(args) => run_query_native(
            &config,
            SearchMode::ImageGeneration,
            &args.query,
            args.out.as_deref(),
        ),
        Command::Chat(args) => {
            run_chat_native(&config, args)?;
            Ok(0)
        }
    }
}

fn build_service(
    config: &ScoutConfig,
    models: &ModelArgs,
    events: Option<EventWriter>,
) -> Result<QueryService> {
    let mut config = config.clone();
    if models.text_model.is_some() {
        config.text_model = models.text_model.clone();
    }
    if models.image_model.is_some() {
        config.image_model = models.image_model.clone();
    }
    let transport = GeminiTransport::new(&config)?;
    let (service, warnings) = QueryService::from_config(Box::new(transport), &config)?;
    for warning in warnings {
        eprintln!("scout warning: {warning}");
    }
    Ok(service.with_events(events))
}

fn open_events(path: Option<&Path>) -> Option<EventWriter> {
    let events = EventWriter::for_new_session(path?);
    eprintln!("Event log: {}", events.path().display());
    Some(events)
}

fn record(events: Option<&EventWriter>, kind: EventKind, fields: Value) {
    if let Some(events) = events {
        events.record(kind, fields);
    }
}

fn run_query_native(
    config: &ScoutConfig,
    mode: SearchMode,
    args: &QueryArgs,
    out_dir: Option<&Path>,
) -> Result<i32> {
    let events = open_events(args.events.as_deref());
    let service = build_service(config, &args.models, events.clone())?;
    record(
        events.as_ref(),
        EventKind::SessionStarted,
        json!({
            "command": mode.as_str(),
            "model": service.model(ModelRole::for_mode(mode)),
        }),
    );

    let query = args.query.join(" ");
    let mut controller = SearchController::new(mode).with_events(events.clone());
    if !args.json {
        eprintln!("{}", views::render_loading(mode, query.trim()));
    }
    controller.submit(&service, &query);
    match controller.state() {
        SessionState::Failed { message, .. } => {
            eprintln!("{}", views::render_error(message));
            return Ok(1);
        }
        SessionState::Succeeded { result, .. } if args.json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        _ => {
            if let Some(view) = controller.visible_view() {
                print!("{}", views::render_view(view));
            }
        }
    }

    if let (Some(dir), Some(images)) = (out_dir, controller.generated_images()) {
        let written = export::save_generated_images(dir, images)?;
        for path in &written {
            eprintln!("Saved {}", path.display());
        }
        record(
            events.as_ref(),
            EventKind::ImagesSaved,
            json!({ "dir": dir.display().to_string(), "count": written.len() }),
        );
    }
    Ok(0)
}

fn run_chat_native(config: &ScoutConfig, args: ChatArgs) -> Result<()> {
    let events_path = args
        .events
        .clone()
        .or_else(|| args.out.as_ref().map(|dir| dir.join("events.jsonl")));
    let events = open_events(events_path.as_deref());
    let mut service = build_service(config, &args.models, events.clone())?;
    let mut controller = SearchController::new(args.mode).with_events(events.clone());
    let selector = ModelSelector::default();

    record(
        events.as_ref(),
        EventKind::SessionStarted,
        json!({
            "command": "chat",
            "mode": args.mode.as_str(),
            "text_model": service.model(ModelRole::Text),
            "image_model": service.model(ModelRole::Image),
        }),
    );

    print!("{}", views::render_welcome());
    println!("Type /help for commands.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("[{}] {} > ", controller.mode(), controller.mode().placeholder());
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let intent = parse_intent(line.trim_end_matches(['\n', '\r']));
        match intent.action.as_str() {
            "noop" => {}
            "help" => {
                println!("Commands: {}", CHAT_HELP_COMMANDS.join(" "));
            }
            "status" => {
                println!(
                    "{}",
                    status_line(
                        controller.mode(),
                        service.model(ModelRole::Text),
                        service.model(ModelRole::Image),
                        controller.state(),
                    )
                );
            }
            "quit" => break,
            "set_mode" => {
                apply_mode_update(&mut controller, &intent);
            }
            "set_text_model" | "set_image_model" => {
                let role = if intent.action == "set_text_model" {
                    ModelRole::Text
                } else {
                    ModelRole::Image
                };
                let requested = intent.command_args.get("model").and_then(Value::as_str);
                match selector.select(role, requested) {
                    Ok(selection) => {
                        if let Some(reason) = &selection.fallback_reason {
                            println!("{reason}");
                        }
                        println!("Using {} as the {} model", selection.name, selection.role);
                        service.set_model(selection.role, selection.name);
                    }
                    Err(err) => println!("{err:#}"),
                }
            }
            "save_images" => {
                let dir = intent
                    .command_args
                    .get("path")
                    .and_then(Value::as_str)
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
                    .or_else(|| args.out.clone());
                let Some(dir) = dir else {
                    println!("/save requires a directory (or start chat with --out)");
                    continue;
                };
                let Some(images) = controller.generated_images() else {
                    println!("No generated images to save. Run /generate first.");
                    continue;
                };
                match export::save_generated_images(&dir, images) {
                    Ok(written) => {
                        for path in &written {
                            println!("Saved {}", path.display());
                        }
                        record(
                            events.as_ref(),
                            EventKind::ImagesSaved,
                            json!({ "dir": dir.display().to_string(), "count": written.len() }),
                        );
                    }
                    Err(err) => println!("{}", views::render_error(&format!("{err:#}"))),
                }
            }
            "query" => {
                if !apply_mode_update(&mut controller, &intent) {
                    continue;
                }
                let Some(query) = intent.prompt.as_deref() else {
                    continue;
                };
                if !controller.can_submit() {
                    println!("A query is already running.");
                    continue;
                }
                println!("{}", views::render_loading(controller.mode(), query));
                controller.submit(&service, query);
                match controller.state() {
                    SessionState::Failed { message, .. } => {
                        println!("{}", views::render_error(message));
                    }
                    _ => {
                        if let Some(view) = controller.visible_view() {
                            print!("{}", views::render_view(view));
                        }
                    }
                }
            }
            "unknown" => {
                let command = intent
                    .command_args
                    .get("command")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                println!("Unknown command: /{command}. Type /help for commands.");
            }
            other => {
                println!("Unsupported action: {other}");
            }
        }
    }

    record(events.as_ref(), EventKind::SessionFinished, json!({}));
    Ok(())
}

fn status_line(
    mode: SearchMode,
    text_model: &str,
    image_model: &str,
    state: &SessionState,
) -> String {
    let last = match (state.last_query(), state.last_mode()) {
        (Some(query), Some(last_mode)) => format!(
            "\"{query}\" ({}, {})",
            last_mode.label(),
            state.status_label()
        ),
        _ => "none".to_string(),
    };
    format!(
        "Mode: {} | text model: {text_model} | image model: {image_model} | last query: {last}",
        mode.label()
    )
}

/// Applies a `mode` settings update if present. Returns false when the
/// requested mode name is invalid.
fn apply_mode_update(controller: &mut SearchController, intent: &Intent) -> bool {
    let Some(raw) = intent.mode_update() else {
        return true;
    };
    match raw.parse::<SearchMode>() {
        Ok(mode) => {
            if mode != controller.mode() && intent.action == "set_mode" {
                println!("Mode set to {}", mode.label());
            }
            controller.set_mode(mode);
            true
        }
        Err(err) => {
            println!("{err}");
            false
        }
    }
}
