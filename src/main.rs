//! Interactive procedure walkthrough on the terminal
//!
//! Logs go to stderr; the conversation goes to stdout.

use crossterm::style::{style, Stylize};
use procedure_guide::llm::{connect, LlmConfig};
use procedure_guide::{Procedure, ProcedureGuide};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "procedure_guide=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Configuration
    let llm_config = LlmConfig::from_env();
    let llm = connect(&llm_config)?;

    let procedure = match std::env::var("PROCEDURE_FILE").ok().map(PathBuf::from) {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading procedure");
            Procedure::load(&path)?
        }
        None => Procedure::gel_electrophoresis(),
    };

    tracing::info!(
        procedure = %procedure.name,
        steps = procedure.steps.len(),
        model = %llm_config.model,
        cache = llm_config.cache,
        "Starting procedure guide"
    );

    let mut guide = ProcedureGuide::new(llm, procedure, &llm_config.model);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut message = guide.procedure().opening_message();

    loop {
        let turn = guide.respond(&message).await?;

        if let Some(step) = &turn.checked_step {
            let check = format!(
                "\nHas the user completed the step {step} in the procedure of {}? {}\n",
                guide.procedure().name,
                turn.step_completed
            );
            println!("{}", style(check).yellow());
        }
        println!("\n{}", style(&turn.thought).blue());
        println!("\n{}", turn.reply);

        if turn.finished {
            break;
        }

        print!("\nUser: ");
        std::io::stdout().flush()?;
        match lines.next_line().await? {
            Some(line) if line.trim() != "quit" => message = line,
            _ => break,
        }
    }

    Ok(())
}
