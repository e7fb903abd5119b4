//! Speculative background fetch for the settings currently being chosen.
//!
//! While the player is still on the configuration screen, the controller
//! asks the generator for a full game's worth of questions so the loading
//! step can skip the round-trip.
//!
//! # Lifecycle
//!
//! `Idle → Fetching → {Ready, Failed}`. There is at most one live ticket:
//!
//! - a request for the same settings as a fresh `Fetching`/`Ready` ticket is
//!   coalesced (no-op);
//! - a request for different settings supersedes the ticket. The old fetch
//!   is aborted and, since every ticket owns its own result channel, its
//!   result could never reach the new slot anyway;
//! - a failed fetch is not retried; the next request starts over.
//!
//! [`PrefetchController::take`] consumes the ticket whether or not it
//! matches, so a result is handed off at most once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::telemetry;
use crate::traits::QuestionGenerator;
use crate::types::{GameSettings, GenerateRequest, Question};

/// Tickets older than this are neither coalesced nor handed off.
pub const PREFETCH_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// Observable state of the current ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefetchStatus {
    Idle,
    Fetching,
    /// Fetched this many questions.
    Ready(usize),
    Failed,
}

/// What [`PrefetchController::request`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefetchOutcome {
    /// A new fetch was dispatched.
    Started,
    /// A fresh ticket for the same settings already exists.
    Coalesced,
}

#[derive(Debug, Clone)]
enum TicketState {
    Fetching,
    Ready(Vec<Question>),
    Failed,
}

struct Ticket {
    settings: GameSettings,
    dispatched_at: Instant,
    state: watch::Receiver<TicketState>,
    task: JoinHandle<()>,
}

impl Ticket {
    fn is_fresh(&self) -> bool {
        self.dispatched_at.elapsed() <= PREFETCH_MAX_AGE
    }

    fn status(&self) -> PrefetchStatus {
        match &*self.state.borrow() {
            TicketState::Fetching => PrefetchStatus::Fetching,
            TicketState::Ready(questions) => PrefetchStatus::Ready(questions.len()),
            TicketState::Failed => PrefetchStatus::Failed,
        }
    }

    fn discard(self) {
        self.task.abort();
    }
}

/// Single-flight background fetch keyed by the current settings.
pub struct PrefetchController {
    generator: Arc<dyn QuestionGenerator>,
    slot: Mutex<Option<Ticket>>,
}

impl PrefetchController {
    pub fn new(generator: Arc<dyn QuestionGenerator>) -> Self {
        Self {
            generator,
            slot: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Ticket>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a background fetch for `request`, unless one is already live
    /// for the same settings.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&self, request: GenerateRequest) -> PrefetchOutcome {
        let settings = request.settings();
        let mut slot = self.slot();

        if let Some(ticket) = slot.as_ref() {
            let live = matches!(
                ticket.status(),
                PrefetchStatus::Fetching | PrefetchStatus::Ready(_)
            );
            if ticket.settings == settings && live && ticket.is_fresh() {
                metrics::counter!(telemetry::PREFETCH_TOTAL, "outcome" => "coalesced")
                    .increment(1);
                return PrefetchOutcome::Coalesced;
            }
        }
        if let Some(old) = slot.take() {
            debug!(old = %old.settings, new = %settings, "superseding prefetch ticket");
            old.discard();
        }

        let (tx, rx) = watch::channel(TicketState::Fetching);
        let generator = Arc::clone(&self.generator);
        let task_settings = settings.clone();
        let task = tokio::spawn(async move {
            let state = match generator.generate(&request).await {
                Ok(questions) => {
                    debug!(settings = %task_settings, count = questions.len(), "prefetch ready");
                    metrics::counter!(telemetry::PREFETCH_TOTAL, "outcome" => "ready")
                        .increment(1);
                    TicketState::Ready(questions)
                }
                Err(e) => {
                    warn!(settings = %task_settings, error = %e, "prefetch failed");
                    metrics::counter!(telemetry::PREFETCH_TOTAL, "outcome" => "failed")
                        .increment(1);
                    TicketState::Failed
                }
            };
            // No receiver means the ticket was taken or superseded.
            let _ = tx.send(state);
        });

        metrics::counter!(telemetry::PREFETCH_TOTAL, "outcome" => "started").increment(1);
        debug!(%settings, "prefetch started");
        *slot = Some(Ticket {
            settings,
            dispatched_at: Instant::now(),
            state: rx,
            task,
        });
        PrefetchOutcome::Started
    }

    /// State of the live ticket, or `Idle`.
    pub fn status(&self) -> PrefetchStatus {
        self.slot()
            .as_ref()
            .map_or(PrefetchStatus::Idle, Ticket::status)
    }

    /// Settings of the live ticket, if any.
    pub fn pending_settings(&self) -> Option<GameSettings> {
        self.slot().as_ref().map(|t| t.settings.clone())
    }

    /// Consume the ticket and return its batch if it can serve a game.
    ///
    /// Waits for an in-flight fetch. Returns the whole batch only when the
    /// ticket was dispatched for `settings`, is at most
    /// [`PREFETCH_MAX_AGE`] old, and holds at least `required` questions.
    /// The slot is empty afterwards in every case.
    pub async fn take(&self, settings: &GameSettings, required: usize) -> Option<Vec<Question>> {
        let ticket = self.slot().take()?;

        if ticket.settings != *settings {
            debug!(ticket = %ticket.settings, wanted = %settings, "prefetch ticket for other settings");
            ticket.discard();
            return reject();
        }
        if !ticket.is_fresh() {
            debug!(%settings, "prefetch ticket too old");
            ticket.discard();
            return reject();
        }

        let Ticket { state: mut rx, .. } = ticket;
        let state = match rx
            .wait_for(|s| !matches!(s, TicketState::Fetching))
            .await
        {
            Ok(current) => current.clone(),
            Err(_) => return reject(),
        };

        match state {
            TicketState::Ready(questions) if questions.len() >= required => {
                metrics::counter!(telemetry::PREFETCH_TOTAL, "outcome" => "consumed")
                    .increment(1);
                Some(questions)
            }
            TicketState::Ready(questions) => {
                debug!(%settings, got = questions.len(), required, "prefetch batch too small");
                reject()
            }
            _ => reject(),
        }
    }

    /// Drop the live ticket, aborting its fetch.
    pub fn discard(&self) {
        if let Some(ticket) = self.slot().take() {
            ticket.discard();
        }
    }
}

impl Drop for PrefetchController {
    fn drop(&mut self) {
        self.discard();
    }
}

fn reject() -> Option<Vec<Question>> {
    metrics::counter!(telemetry::PREFETCH_TOTAL, "outcome" => "rejected").increment(1);
    None
}
