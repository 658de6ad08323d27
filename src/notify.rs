use std::io::{self, Write};

use log::warn;

/// Shows a message to the user and returns once it has been shown.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Writes notifications to stdout, one per line.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{message}").and_then(|_| stdout.flush()) {
            warn!("Could not write notification to stdout: {}", e);
        }
    }
}
