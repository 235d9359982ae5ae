//! Checks the classification service and classifies the text given as arguments.

use std::sync::Arc;
use std::time::{Duration, Instant};

use comment_predictor::classifier::HttpClassifier;
use comment_predictor::config;
use comment_predictor::logging;
use comment_predictor::session::{ConnectionStatus, SessionController, SubmitOutcome};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let settings = config::load_or_default()?;
    let client = HttpClassifier::new(&settings.service)?;
    tracing::info!("Using classification service at {}", client.base_url());

    let wait_limit = settings.service.read_timeout() + settings.service.connect_timeout();
    let mut session = SessionController::new(Arc::new(client), settings.session);

    session.check_health();
    settle(&mut session, wait_limit);
    if session.state().connection != ConnectionStatus::Connected {
        match &session.state().service_health {
            Some(health) => eprintln!(
                "Classification service is not ready: {}",
                health.message.as_deref().unwrap_or("models not loaded")
            ),
            None => eprintln!("Classification service is not reachable"),
        }
        std::process::exit(1);
    }

    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if text.trim().is_empty() {
        println!("{}", serde_json::to_string_pretty(&session.state().service_health)?);
        return Ok(());
    }

    if session.submit(text) == SubmitOutcome::Started {
        settle(&mut session, wait_limit);
    }
    match (&session.state().prediction, session.state().error_message()) {
        (Some(prediction), _) => println!("{}", serde_json::to_string_pretty(prediction)?),
        (None, Some(message)) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
        (None, None) => {
            eprintln!("No prediction received in time");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn settle(session: &mut SessionController, limit: Duration) {
    let started = Instant::now();
    while session.is_busy() && started.elapsed() < limit {
        session.poll_jobs();
        std::thread::sleep(POLL_INTERVAL);
    }
    session.poll_jobs();
}
