use crate::api::ApiServer;
use crate::config::Config;
use crate::session::{SessionMachine, SessionStatusHandle, SessionTiming, ThreadRandom};
use crate::summary::build_producer;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Build a session machine wired the way the config asks for.
pub fn build_machine(config: &Config) -> Result<SessionMachine> {
    let producer = build_producer(&config.producer)?;

    Ok(SessionMachine::new(
        producer,
        Arc::new(ThreadRandom),
        SessionTiming::from(&config.session),
        SessionStatusHandle::default(),
    ))
}

pub async fn run_service(mut config: Config, port: Option<u16>) -> Result<()> {
    info!("Starting NoteGenius service");

    if let Some(port) = port {
        config.server.port = port;
    }

    let machine = Arc::new(build_machine(&config)?);
    let api_server = ApiServer::new(machine, &config);

    info!("NoteGenius is ready!");
    info!(
        "Try: curl -X POST -H 'Content-Type: application/json' -d '{{\"text\":\"...\"}}' http://127.0.0.1:{}/submit/text",
        config.server.port
    );

    api_server.start().await
}
