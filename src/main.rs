//! Howdah CLI binary entry point.

use clap::Parser;
use howdah::cli::{self, Cli, Commands, ConnectionArgs, SendArgs, TaskArgs};
use howdah::session::Session;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let connection = match &cli.command {
        Commands::Send(args) => &args.connection,
        Commands::Task(args) => &args.connection,
    };
    init_logging(connection.verbose);

    let result = match cli.command {
        Commands::Send(args) => handle_send(args).await,
        Commands::Task(args) => handle_task(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "howdah=debug" } else { "howdah=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn handle_send(args: SendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let reply = run_session(&args.connection, &args.prompt).await?;
    println!("{reply}");
    Ok(())
}

async fn handle_task(args: TaskArgs) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&args.output_dir)?;
    let prompt = cli::task_prompt(&args.input_dir, &args.output_dir);
    let reply = run_session(&args.connection, &prompt).await?;
    println!("{reply}");
    Ok(())
}

async fn run_session(
    connection: &ConnectionArgs,
    prompt: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let kind = cli::resolve_backend(connection)?;
    let config = cli::build_config(connection)?;

    let mut session = Session::connect(kind, config, connection.session.clone())?;
    let reply = session.send(prompt).await?;

    if connection.verbose {
        let description = serde_json::to_string_pretty(&session.describe())?;
        eprintln!("{description}");
    }

    Ok(reply)
}
