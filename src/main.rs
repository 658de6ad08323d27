mod config;
mod controller;
mod errors;
mod form;
mod models;
mod notify;
mod transport;
mod utils;

#[cfg(test)]
mod test_utils;

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use log::{debug, info};

use crate::{
    config::{Args, Config},
    controller::FormUploadController,
    form::SubmitEvent,
    models::Outcome,
    notify::ConsoleNotifier,
    transport::Transport,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    utils::logger::initialize(args.log_level)?;

    let config = Config::load(&args)?;
    info!("Using conversion service at {}", config.server_url);

    let transport = Transport::new(config.server_url.clone())?;
    let mut controller = FormUploadController::new(config.forms.clone(), transport, Arc::new(ConsoleNotifier));
    controller.initialize(&config.enabled);

    let mut event = SubmitEvent::new(args.command.to_form(&config.forms));
    let outcome = controller.submit(&mut event).await;
    debug!(
        "{} submitted, default action prevented: {}",
        event.form().selector(),
        event.default_prevented()
    );

    if let (Outcome::Delivered(response), Some(dir)) = (&outcome, &args.save_to) {
        let path = response.save_to(dir).await?;
        info!(
            "Saved {} bytes ({}) to {}",
            response.body.len(),
            response.content_type.as_deref().unwrap_or("unknown type"),
            path.display()
        );
    }

    exit_status(&outcome, event.form().selector()).map(ExitCode::from)
}

/// 0 when the server's reply was shown, 2 when the form was rejected, 1 when the upload failed.
fn exit_status(outcome: &Outcome, selector: &str) -> anyhow::Result<u8> {
    match outcome {
        Outcome::Delivered(_) => Ok(0),
        Outcome::Rejected(rejection) => {
            debug!("{} was left empty", rejection.field);
            Ok(2)
        }
        Outcome::Failed(e) => {
            debug!("{:?}", e);
            Ok(1)
        }
        Outcome::Unhandled => anyhow::bail!(
            "No upload handler is enabled for {}; check `enabled` in the config file",
            selector
        ),
    }
}
