//! Spinner shown while waiting for a database to become available

use std::time::Duration;

use dbctl_core::{InstanceStatus, PollPolicy, ProgressCallback, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::WaitArgs;

/// Poll policy for `--wait` / `--wait-timeout`
pub fn poll_policy(args: &WaitArgs) -> PollPolicy {
    PollPolicy::default().with_max_wait(args.wait_timeout.map(Duration::from_secs))
}

/// Build a spinner plus the callback that drives it
///
/// The spinner draws to stderr and hides itself when stderr is not a terminal.
pub fn spinner() -> (ProgressBar, ProgressCallback) {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));

    let handle = pb.clone();
    let callback: ProgressCallback = Box::new(move |event| match event {
        ProgressEvent::Started { name } => {
            handle.set_message(format!("Waiting for {}", name));
        }
        ProgressEvent::Polling { name, status, .. } => {
            handle.set_message(format!("{}: {}", name, format_status(&status)));
        }
        ProgressEvent::Ready { name, status, .. } => {
            handle.finish_with_message(format!("{}: {}", name, format_status(&status)));
        }
    });
    (pb, callback)
}

/// Status with a leading icon
fn format_status(status: &InstanceStatus) -> String {
    match status {
        InstanceStatus::Available | InstanceStatus::BackingUp => format!("\u{2713} {}", status),
        InstanceStatus::Provisioning | InstanceStatus::Restoring => format!("\u{21bb} {}", status),
        InstanceStatus::Deleting => format!("\u{2717} {}", status),
        InstanceStatus::Other(_) => status.to_string(),
    }
}
