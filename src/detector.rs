use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{EntityKey, NotificationEvent, ObservationRow, StateRecord, TrackedEntity};
use crate::parsers::{Sentinels, StatusClass};

/// When an actionable status turns into an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyPolicy {
    /// Only when the status differs from the stored one.
    EdgeTriggered,
    /// Every run while the status is actionable.
    LevelTriggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatePersistence {
    Always,
    /// Leave the stored state untouched. Only meaningful with `LevelTriggered`.
    Skip,
}

/// How a tracked entity missing from the page is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Strict,
    Tolerant,
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("tracked entity {entity:?} not found among {rows} extracted rows")]
    EntityNotFound { entity: String, rows: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    NoSlot(StatusClass),
    Unchanged,
    Notify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityOutcome {
    pub entity: String,
    pub status: Option<String>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub events: Vec<NotificationEvent>,
    pub outcomes: Vec<EntityOutcome>,
    pub state_changed: bool,
}

impl Evaluation {
    pub fn found(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome != Outcome::NotFound)
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct Detector {
    pub policy: NotifyPolicy,
    pub persistence: StatePersistence,
    pub mode: MatchMode,
    pub sentinels: Sentinels,
}

impl Detector {
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: config.policy,
            persistence: config.persistence,
            mode: config.match_mode,
            sentinels: config.sentinels.clone(),
        }
    }

    /// Compare this run's rows with `state` and decide which alerts fire.
    ///
    /// `state` is updated in place according to the persistence setting. In
    /// strict mode a missing entity fails the whole evaluation before any
    /// update, so the caller never persists a half-evaluated run.
    pub fn evaluate(
        &self,
        targets: &[TrackedEntity],
        rows: &[ObservationRow],
        state: &mut StateRecord,
        source_url: &str,
    ) -> Result<Evaluation, DetectError> {
        let index = index_rows(rows);
        let matches: Vec<(&TrackedEntity, Option<&ObservationRow>)> = targets
            .iter()
            .map(|target| (target, index.get(&target.key).copied()))
            .collect();

        if self.mode == MatchMode::Strict {
            if let Some((missing, _)) = matches.iter().find(|(_, row)| row.is_none()) {
                return Err(DetectError::EntityNotFound {
                    entity: missing.name.clone(),
                    rows: rows.len(),
                });
            }
        }

        let mut evaluation = Evaluation::default();

        for (target, row) in matches {
            let Some(row) = row else {
                warn!("{} not found on the page ({} rows), skipping", target.name, rows.len());
                evaluation.outcomes.push(EntityOutcome {
                    entity: target.name.clone(),
                    status: None,
                    outcome: Outcome::NotFound,
                });
                continue;
            };

            let outcome = self.judge(&target.key, &row.status, state);
            info!("{}: {:?} -> {:?}", target.name, row.status, outcome);

            if outcome == Outcome::Notify {
                evaluation.events.push(NotificationEvent {
                    entity: target.name.clone(),
                    status: row.status.clone(),
                    source_url: source_url.to_string(),
                });
            }

            if self.persistence == StatePersistence::Always {
                evaluation.state_changed |= state.set(&target.key, &row.status);
            }

            evaluation.outcomes.push(EntityOutcome {
                entity: target.name.clone(),
                status: Some(row.status.clone()),
                outcome,
            });
        }

        if !targets.is_empty() && evaluation.found() == 0 {
            warn!(
                "None of the {} tracked entities were found among {} rows",
                targets.len(),
                rows.len()
            );
        }

        Ok(evaluation)
    }

    fn judge(&self, key: &EntityKey, status: &str, state: &StateRecord) -> Outcome {
        let class = self.sentinels.classify(status);
        if !class.is_actionable() {
            return Outcome::NoSlot(class);
        }

        match self.policy {
            NotifyPolicy::LevelTriggered => Outcome::Notify,
            NotifyPolicy::EdgeTriggered if state.get(key) == Some(status) => Outcome::Unchanged,
            NotifyPolicy::EdgeTriggered => Outcome::Notify,
        }
    }
}

/// First row wins when the page lists an entity twice.
fn index_rows(rows: &[ObservationRow]) -> HashMap<EntityKey, &ObservationRow> {
    let mut index = HashMap::new();
    for row in rows {
        let key = row.key();
        if !key.is_empty() {
            index.entry(key).or_insert(row);
        }
    }
    index
}
