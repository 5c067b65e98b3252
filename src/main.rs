use anyhow::Result;
use clap::Parser;
use notegenius::{
    app,
    cli::{handle_config_command, handle_process_command, Cli, CliCommand},
    config::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let load_config = || match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    match cli.command {
        Some(CliCommand::Version) => {
            println!("NoteGenius {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(CliCommand::Config) => handle_config_command(&load_config()?),
        Some(CliCommand::Process(args)) => handle_process_command(args, &load_config()?).await,
        Some(CliCommand::Serve(args)) => app::run_service(load_config()?, args.port).await,
        None => app::run_service(load_config()?, None).await,
    }
}
