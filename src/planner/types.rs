use crate::model::TranslatorId;
use chrono::NaiveDate;
use thiserror::Error;

/// Options de détection de conflits.
#[derive(Debug, Clone, Copy)]
pub struct DetectOptions {
    /// Plafond hebdomadaire d'heures de tâches (semaine ISO).
    pub weekly_hours_target: f64,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            weekly_hours_target: 37.5,
        }
    }
}

/// Catégories de conflits d'horaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Somme des réservations du jour > capacité quotidienne.
    Surallocation,
    /// Deux réservations de même nature s'intersectent.
    Chevauchement,
    /// Une tâche empiète sur un blocage.
    Blocage,
    /// Une tâche déborde de la fenêtre de travail ou couvre le déjeuner.
    HorsTravail,
    /// Heures de tâches d'une semaine ISO > plafond hebdomadaire.
    CapaciteDepassee,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::Surallocation => "surallocation",
            ConflictKind::Chevauchement => "chevauchement",
            ConflictKind::Blocage => "blocage",
            ConflictKind::HorsTravail => "horsTravail",
            ConflictKind::CapaciteDepassee => "capaciteDepassee",
        }
    }
}

/// Conflit détecté, purement informatif : jamais bloquant, résolution
/// laissée à l'humain.
#[derive(Debug, Clone)]
pub struct Conflict {
    pub translator: TranslatorId,
    pub date: NaiveDate,
    pub kind: ConflictKind,
    pub detail: String,
}

/// Échec d'une vérification du plan. Jamais corrigé silencieusement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("plan includes non-working day {0}")]
    NonWorkingDay(NaiveDate),
    #[error("plan overcommits {date}: asks {asked:.2}h but only {available:.2}h free")]
    OverCapacity {
        date: NaiveDate,
        asked: f64,
        available: f64,
    },
    #[error("plan totals {planned:.2}h, task requires {expected:.2}h")]
    TotalMismatch { planned: f64, expected: f64 },
    #[error("no room left on {date}: {asked:.2}h do not fit the {available:.2}h of free slots")]
    NoIntradayRoom {
        date: NaiveDate,
        asked: f64,
        available: f64,
    },
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("infeasible allocation: {missing:.2}h left unplaced between {floor} and {ceiling}")]
    Infeasible {
        missing: f64,
        floor: NaiveDate,
        ceiling: NaiveDate,
    },
    #[error("invalid date range: {0}")]
    InvalidRange(&'static str),
    #[error("unknown translator: {0}")]
    UnknownTranslator(String),
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
