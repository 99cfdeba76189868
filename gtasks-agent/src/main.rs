use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use gtasks_agent::api::GoogleTasksClient;
use gtasks_agent::assistant::{Assistant, AssistantReply, DEFAULT_MAX_TURNS};
use gtasks_agent::config::Config;
use gtasks_agent::history::{load_history, save_history, ConversationHistory};
use gtasks_agent::llm::OpenAiChatModel;
use gtasks_agent::tools::create_tasks_toolset;
use gtasks_sdk::{log_file_saved, log_info, log_warning};

#[derive(Parser, Debug)]
#[command(author, version, about = "Conversational agent for Google Tasks", long_about = None)]
struct Args {
    /// Messages to send; without any, an interactive session starts
    commands: Vec<String>,

    /// Chat model to use (overrides OPENAI_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Maximum model round-trips per message
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    max_turns: usize,

    /// Start a new conversation instead of resuming the saved one
    #[arg(long)]
    fresh: bool,

    /// Truncate printed tool output to this many characters
    #[arg(long, default_value_t = 2000)]
    max_output: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(model) = &args.model {
        config.model = model.clone();
    }

    let tasks_client = Arc::new(GoogleTasksClient::new(&config));
    let chat_model = Arc::new(OpenAiChatModel::new(&config));
    let tools = create_tasks_toolset(tasks_client);

    let mut history = if args.fresh {
        ConversationHistory::new()
    } else {
        load_history()
    };
    if !history.messages.is_empty() {
        log_info!(
            "Resuming conversation {} ({} messages)",
            history.thread_id,
            history.messages.len()
        );
    }

    let mut assistant = Assistant::with_transcript(chat_model, tools, history.messages.clone())
        .with_max_turns(args.max_turns);

    if args.commands.is_empty() {
        run_interactive(&mut assistant, &mut history, args.max_output).await?;
    } else {
        for command in &args.commands {
            println!("you> {command}");
            let reply = assistant.handle(command).await?;
            print_reply(&reply, args.max_output);
            persist(&mut history, &assistant);
        }
    }

    match save_history(&history) {
        Ok(path) => log_file_saved!(path.display()),
        Err(e) => log_warning!("Could not save conversation history: {}", e),
    }

    Ok(())
}

/// Read-eval loop on stdin until EOF or an exit command
async fn run_interactive(
    assistant: &mut Assistant,
    history: &mut ConversationHistory,
    max_output: usize,
) -> Result<()> {
    let stdin = io::stdin();

    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        match assistant.handle(input).await {
            Ok(reply) => {
                print_reply(&reply, max_output);
                persist(history, assistant);
            }
            Err(e) => log_warning!("{:#}", e),
        }
    }

    Ok(())
}

/// Carry the assistant's transcript into the persisted thread
fn persist(history: &mut ConversationHistory, assistant: &Assistant) {
    history.messages = assistant.messages().to_vec();
    if let Err(e) = save_history(history) {
        log_warning!("Could not save conversation history: {}", e);
    }
}

fn print_reply(reply: &AssistantReply, max_output: usize) {
    for call in &reply.tool_calls {
        println!(
            "\x1b[2m[{}] {}\x1b[0m",
            call.name,
            truncate(&call.output, max_output)
        );
    }
    println!("{}\n", reply.content);
}

/// Cut long tool output down to `max` characters for display
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}
