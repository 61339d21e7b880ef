//! Main binary for the turnloop CLI

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing::Level;
use turnloop::llm::{ExecutionCallback, ExecutionOutcome, ToolExecutionResult};
use turnloop::utils::{init_logging, parse_level};
use turnloop::{
    create_tool_registry, Config, Conversation, Driver, OpenAiClient, ToolArgs, ToolCall,
    UnknownToolPolicy,
};

/// Prints tool activity to stderr while the driver runs
struct ProgressPrinter;

impl ExecutionCallback for ProgressPrinter {
    fn on_tool_start(&mut self, call: &ToolCall) {
        eprintln!("-> {}({})", call.name(), call.arguments());
    }

    fn on_tool_complete(&mut self, result: &ToolExecutionResult) {
        let marker = match result.outcome {
            ExecutionOutcome::Success => "ok",
            ExecutionOutcome::Failed => "failed",
            ExecutionOutcome::InvalidArguments => "invalid arguments",
            ExecutionOutcome::UnknownTool => "unknown tool",
        };
        eprintln!("<- {} [{}]: {}", result.tool_name, marker, result.content);
    }
}

fn cli() -> Command {
    Command::new("turnloop")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Drive a tool-calling conversation against an OpenAI-compatible endpoint")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("ask")
                .about("Send a prompt and run tool calls until the model answers")
                .arg(Arg::new("prompt").required(true).value_name("PROMPT"))
                .arg(
                    Arg::new("system")
                        .long("system")
                        .value_name("TEXT")
                        .help("System prompt to prepend"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Configuration file (default: ./turnloop.toml if present)"),
                )
                .arg(Arg::new("model").long("model").value_name("MODEL"))
                .arg(Arg::new("base-url").long("base-url").value_name("URL"))
                .arg(
                    Arg::new("max-turns")
                        .long("max-turns")
                        .value_name("N")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("skip-unknown-tools")
                        .long("skip-unknown-tools")
                        .action(ArgAction::SetTrue)
                        .help("Append no result for calls to unregistered tools"),
                )
                .arg(
                    Arg::new("verbose")
                        .long("verbose")
                        .short('v')
                        .action(ArgAction::SetTrue)
                        .help("Debug logging and tool progress on stderr"),
                )
                .arg(
                    Arg::new("log-level")
                        .long("log-level")
                        .value_name("LEVEL")
                        .value_parser(|s: &str| {
                            parse_level(s).ok_or_else(|| format!("unknown log level '{}'", s))
                        })
                        .help("trace, debug, info, warn or error (default: info)"),
                ),
        )
        .subcommand(Command::new("tools").about("Print the tool descriptors sent to the model"))
        .subcommand(
            Command::new("call")
                .about("Run a single tool locally")
                .arg(Arg::new("tool").required(true).value_name("TOOL"))
                .arg(
                    Arg::new("args")
                        .value_name("ARGS_JSON")
                        .help("Tool arguments as a JSON object"),
                ),
        )
}

async fn ask(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let verbose = matches.get_flag("verbose");
    let level = match matches.get_one::<Level>("log-level") {
        Some(level) => *level,
        None if verbose => Level::DEBUG,
        None => Level::INFO,
    };
    init_logging(level);

    let mut config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(model) = matches.get_one::<String>("model") {
        config.client.model = model.clone();
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.client.base_url = base_url.clone();
    }
    if let Some(max_turns) = matches.get_one::<usize>("max-turns") {
        config.driver.max_turns = *max_turns;
    }
    if matches.get_flag("skip-unknown-tools") {
        config.driver.unknown_tool = UnknownToolPolicy::Skip;
    }
    config.validate()?;

    let api_key = config.client.api_key()?;
    let client = OpenAiClient::new(&config.client, api_key)?;
    let driver = Driver::new(client, create_tool_registry(), &config);

    let prompt = matches
        .get_one::<String>("prompt")
        .map(String::as_str)
        .unwrap_or_default();
    let system = matches.get_one::<String>("system").map(String::as_str);
    let mut conversation = Conversation::with_prompt(system, prompt);

    let exchange = if verbose {
        driver
            .run_with_callback(&mut conversation, &mut ProgressPrinter)
            .await?
    } else {
        driver.run(&mut conversation).await?
    };

    for diagnostic in &exchange.diagnostics {
        eprintln!("warning: {}", diagnostic.message);
    }
    println!("{}", exchange.answer);
    Ok(())
}

fn call(matches: &clap::ArgMatches) -> anyhow::Result<bool> {
    let registry = create_tool_registry();
    let tool_name = matches
        .get_one::<String>("tool")
        .map(String::as_str)
        .unwrap_or_default();
    let raw_args = matches
        .get_one::<String>("args")
        .map(String::as_str)
        .unwrap_or("{}");

    let tool_args = ToolArgs::parse(raw_args)?;
    let result = registry.execute_tool(tool_name, &tool_args)?;
    println!("{}", result.to_content());
    Ok(result.success)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("ask", sub_matches)) => {
            if let Err(e) = ask(sub_matches).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(("tools", _)) => {
            let registry = create_tool_registry();
            let schemas = registry.get_all_schemas();
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
        Some(("call", sub_matches)) => match call(sub_matches) {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        _ => {
            eprintln!("No command specified");
            std::process::exit(1);
        }
    }

    Ok(())
}
