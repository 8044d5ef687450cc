//! # Lottery ledger
//!
//! Domain logic over a single JSON ledger document holding every draw and
//! ticket. Each operation loads the full document, applies its change in
//! memory, and commits by whole-document overwrite. Mutating operations do
//! all of that inside their serializer slot, so the load they validate
//! against is always the latest committed state and concurrent requests
//! cannot lose each other's writes.

use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::Identity,
    config::{Config, CorruptionPolicy},
    error::{AppError, CapScope},
    serializer::WriteSerializer,
    store,
};

pub const NUMBERS_PER_PICK: usize = 6;
pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 49;

/// Serializer store id for the lottery ledger. The user store, owned by the
/// auth service, serializes under its own id and never queues behind us.
const LEDGER_STORE: &str = "lottery";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub draws: Vec<Draw>,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draw {
    pub id: String,
    pub numbers: Vec<u8>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub user_id: String,
    pub numbers: Vec<u8>,
    pub draw_id: Option<String>,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResult {
    pub ticket_id: String,
    pub numbers: Vec<u8>,
    pub matches: usize,
    pub prize: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DrawResults {
    pub draw: Draw,
    pub results: Vec<TicketResult>,
}

/// 6 distinct uniform picks in [1,49], resampling duplicates, sorted for
/// stable display.
pub fn pick_numbers<R: Rng + ?Sized>(rng: &mut R) -> Vec<u8> {
    let mut numbers = Vec::with_capacity(NUMBERS_PER_PICK);
    while numbers.len() < NUMBERS_PER_PICK {
        let n = rng.random_range(MIN_NUMBER..=MAX_NUMBER);
        if !numbers.contains(&n) {
            numbers.push(n);
        }
    }
    numbers.sort_unstable();
    numbers
}

pub fn count_matches(ticket: &[u8], draw: &[u8]) -> usize {
    ticket.iter().filter(|n| draw.contains(n)).count()
}

pub fn prize_for(matches: usize) -> &'static str {
    match matches {
        6 => "Jackpot",
        5 => "Big prize",
        4 => "Small prize",
        _ => "No prize",
    }
}

pub struct LotteryService {
    path: PathBuf,
    policy: CorruptionPolicy,
    max_pending_tickets: usize,
    max_pending_per_user: usize,
    admin_domain: String,
    serializer: Arc<WriteSerializer>,
}

impl LotteryService {
    pub fn new(config: &Config, serializer: Arc<WriteSerializer>) -> Self {
        Self {
            path: config.ledger_path(),
            policy: config.corruption_policy,
            max_pending_tickets: config.max_pending_tickets,
            max_pending_per_user: config.max_pending_per_user,
            admin_domain: config.admin_domain.clone(),
            serializer,
        }
    }

    async fn load(&self) -> Result<Ledger, AppError> {
        store::load(&self.path, self.policy).await
    }

    /// Appends a pending ticket for `user_id`, enforcing the global and
    /// per-user pending caps against the latest committed ledger.
    pub async fn issue_ticket(&self, user_id: &str) -> Result<Ticket, AppError> {
        self.serializer
            .run(LEDGER_STORE, || async move {
                let mut ledger = self.load().await?;

                let pending: Vec<&Ticket> = ledger
                    .tickets
                    .iter()
                    .filter(|t| t.draw_id.is_none())
                    .collect();
                if pending.len() >= self.max_pending_tickets {
                    return Err(AppError::CapacityExceeded {
                        scope: CapScope::Global,
                    });
                }
                if pending.iter().filter(|t| t.user_id == user_id).count()
                    >= self.max_pending_per_user
                {
                    return Err(AppError::CapacityExceeded {
                        scope: CapScope::PerUser,
                    });
                }

                let ticket = Ticket {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    numbers: pick_numbers(&mut rand::rng()),
                    draw_id: None,
                    purchased_at: Utc::now(),
                };
                ledger.tickets.push(ticket.clone());
                store::save(&self.path, &ledger).await?;

                Ok(ticket)
            })
            .await
    }

    /// The caller's tickets in purchase order, 1-based page/limit window.
    pub async fn list_my_tickets(
        &self,
        user_id: &str,
        page: usize,
        limit: usize,
    ) -> Result<TicketPage, AppError> {
        let ledger = self.load().await?;

        let mine: Vec<Ticket> = ledger
            .tickets
            .into_iter()
            .filter(|t| t.user_id == user_id)
            .collect();
        let total = mine.len();

        let page = page.max(1);
        let limit = limit.max(1);
        // Window offset saturates so an absurd page yields an empty page
        // instead of overflowing.
        let tickets = mine
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(TicketPage { tickets, total })
    }

    /// Creates a draw and assigns every pending ticket to it in one commit.
    ///
    /// Refused while any existing draw has no tickets assigned to it; more
    /// than one such draw means the document was edited out from under us and
    /// is reported as an internal invariant breach rather than resolved by
    /// picking one.
    pub async fn execute_draw(&self, caller: &Identity) -> Result<Draw, AppError> {
        if !caller.is_admin(&self.admin_domain) {
            return Err(AppError::Forbidden);
        }

        self.serializer
            .run(LEDGER_STORE, || async move {
                let mut ledger = self.load().await?;

                let unfilled = ledger
                    .draws
                    .iter()
                    .filter(|d| {
                        !ledger
                            .tickets
                            .iter()
                            .any(|t| t.draw_id.as_deref() == Some(d.id.as_str()))
                    })
                    .count();
                if unfilled > 1 {
                    return Err(AppError::Internal(format!(
                        "{unfilled} draws have no tickets assigned; ledger needs manual repair"
                    )));
                }
                if unfilled == 1 {
                    return Err(AppError::UnfilledDrawExists);
                }

                let draw = Draw {
                    id: Uuid::new_v4().to_string(),
                    numbers: pick_numbers(&mut rand::rng()),
                    date: Utc::now(),
                };

                let mut assigned = 0usize;
                for ticket in ledger.tickets.iter_mut().filter(|t| t.draw_id.is_none()) {
                    ticket.draw_id = Some(draw.id.clone());
                    assigned += 1;
                }
                info!(draw_id = %draw.id, assigned, "draw executed");

                ledger.draws.push(draw.clone());
                store::save(&self.path, &ledger).await?;

                Ok(draw)
            })
            .await
    }

    /// All draws, newest first; equal timestamps keep creation order.
    pub async fn list_draws(&self) -> Result<Vec<Draw>, AppError> {
        let mut draws = self.load().await?.draws;
        draws.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(draws)
    }

    /// The draw's public fields plus the caller's own per-ticket results.
    pub async fn get_results(
        &self,
        draw_id: &str,
        user_id: &str,
    ) -> Result<DrawResults, AppError> {
        let ledger = self.load().await?;

        let draw = ledger
            .draws
            .iter()
            .find(|d| d.id == draw_id)
            .ok_or(AppError::DrawNotFound)?
            .clone();

        let results = ledger
            .tickets
            .iter()
            .filter(|t| t.user_id == user_id && t.draw_id.as_deref() == Some(draw_id))
            .map(|t| {
                let matches = count_matches(&t.numbers, &draw.numbers);
                TicketResult {
                    ticket_id: t.id.clone(),
                    numbers: t.numbers.clone(),
                    matches,
                    prize: prize_for(matches),
                }
            })
            .collect();

        Ok(DrawResults { draw, results })
    }
}
