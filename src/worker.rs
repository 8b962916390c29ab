//! Loads a workbook off the UI thread.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use crate::error_display::user_message;
use crate::session::Session;
use crate::AppEvent;

/// Read `path` and build its session on a new thread.
///
/// Sends one `Status` before reading, then exactly one of `Loaded` or
/// `LoadFailed`, all tagged with `generation` so the receiver can drop results
/// of a load it has since replaced.
pub fn spawn_load(
    path: PathBuf,
    max_options: usize,
    generation: u64,
    tx: Sender<AppEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let _ = tx.send(AppEvent::Status(
            generation,
            "Reading workbook (all tabs)…".to_string(),
        ));
        log::info!("loading {}", path.display());

        let outcome = catch_unwind(AssertUnwindSafe(|| Session::open(&path, max_options)));
        let event = match outcome {
            Ok(Ok(session)) => {
                log::info!(
                    "loaded {} sheets, {} views from {}",
                    session.workbook().len(),
                    session.view_names().len(),
                    path.display()
                );
                AppEvent::Loaded(generation, Box::new(session))
            }
            Ok(Err(e)) => {
                log::error!("failed to load {}: {:?}", path.display(), e);
                AppEvent::LoadFailed(generation, user_message(&e))
            }
            Err(panic) => {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                log::error!("loader panicked on {}: {}", path.display(), msg);
                AppEvent::LoadFailed(generation, format!("Internal error: {}", msg))
            }
        };
        let _ = tx.send(event);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_missing_file_reports_failure() {
        let (tx, rx) = channel();
        let handle = spawn_load(PathBuf::from("/definitely/not/here.xlsx"), 100, 7, tx);
        handle.join().unwrap();

        let events: Vec<AppEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], AppEvent::Status(7, _)));
        match &events[1] {
            AppEvent::LoadFailed(7, msg) => assert!(!msg.is_empty()),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
