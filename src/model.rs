use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tolérance d'arrondi sur les heures (0,01 h = 36 s).
pub const EPSILON_HOURS: f64 = 0.01;

/// Fuseau métier fixe (toutes les dates naïves s'interprètent dans ce fuseau).
/// Constante de configuration, jamais un état global mutable.
pub const BUSINESS_TIMEZONE: &str = "America/Toronto";

/// Identifiant fort pour Translator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranslatorId(String);

impl TranslatorId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Blockage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockageId(String);

impl BlockageId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour TimeReservation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(String);

impl ReservationId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Traducteur (profil + calendrier de travail)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translator {
    pub id: TranslatorId,
    pub handle: String,
    pub display_name: String,
    pub calendar: crate::calendar::WorkCalendar,
}

impl Translator {
    pub fn new<H: Into<String>, D: Into<String>>(
        handle: H,
        display_name: D,
        calendar: crate::calendar::WorkCalendar,
    ) -> Self {
        Self {
            id: TranslatorId::random(),
            handle: handle.into(),
            display_name: display_name.into(),
            calendar,
        }
    }
}

/// Mode de répartition d'une tâche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationMode {
    /// JAT : au plus tard avant l'échéance.
    Backward,
    /// PEPS : au plus tôt à partir de la date de début.
    Forward,
    /// Équilibré : répartition uniforme sur [start_date, end_date].
    Uniform,
    /// Saisie directe des paires {date, heures} par l'appelant.
    Manual,
}

/// Tâche à répartir sur le calendrier d'un traducteur.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub translator: TranslatorId,
    pub total_hours: f64,
    pub due_date: NaiveDateTime,
    pub mode: AllocationMode,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    /// Vrai quand une saisie manuelle ne totalise pas `total_hours`
    /// (état transitoire, signalé jusqu'à correction).
    #[serde(default)]
    pub inconsistent: bool,
}

impl Task {
    /// Crée une tâche en validant que `total_hours > 0`.
    pub fn new(
        translator: TranslatorId,
        total_hours: f64,
        due_date: NaiveDateTime,
        mode: AllocationMode,
    ) -> Result<Self, String> {
        if total_hours <= 0.0 {
            return Err("total_hours must be strictly positive".to_string());
        }
        Ok(Self {
            id: TaskId::random(),
            translator,
            total_hours,
            due_date,
            mode,
            start_date: None,
            end_date: None,
            completed: false,
            inconsistent: false,
        })
    }
}

/// Indisponibilité déclarée (congé, réunion, formation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blockage {
    pub id: BlockageId,
    pub translator: TranslatorId,
    pub date: NaiveDate,
    pub full_day: bool,
    #[serde(default)]
    pub start: Option<NaiveTime>,
    #[serde(default)]
    pub end: Option<NaiveTime>,
    pub reason: String,
}

impl Blockage {
    /// Blocage jour entier.
    pub fn full_day<R: Into<String>>(translator: TranslatorId, date: NaiveDate, reason: R) -> Self {
        Self {
            id: BlockageId::random(),
            translator,
            date,
            full_day: true,
            start: None,
            end: None,
            reason: reason.into(),
        }
    }

    /// Blocage sur un intervalle `[start, end)` en validant `end > start`.
    pub fn partial<R: Into<String>>(
        translator: TranslatorId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        reason: R,
    ) -> Result<Self, String> {
        if end <= start {
            return Err("blockage end must be strictly after start".to_string());
        }
        Ok(Self {
            id: BlockageId::random(),
            translator,
            date,
            full_day: false,
            start: Some(start),
            end: Some(end),
            reason: reason.into(),
        })
    }
}

/// Intervalle horaire semi-ouvert `[start, end)` au sein d'une journée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, String> {
        if end <= start {
            return Err("range end must be strictly after start".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Durée en heures décimales.
    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_minutes() as f64 / 60.0
    }
}

/// Origine d'une réservation (tâche ou blocage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationOwner {
    Task(TaskId),
    Blockage(BlockageId),
}

/// Nature d'une réservation, dérivée de son origine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationKind {
    Task,
    Blockage,
}

/// Unité atomique persistée : des heures réservées sur une date,
/// découpées en sous-intervalles hors pause déjeuner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeReservation {
    pub id: ReservationId,
    pub owner: ReservationOwner,
    pub translator: TranslatorId,
    pub date: NaiveDate,
    pub hours: f64,
    pub ranges: Vec<TimeRange>,
}

impl TimeReservation {
    pub fn kind(&self) -> ReservationKind {
        match self.owner {
            ReservationOwner::Task(_) => ReservationKind::Task,
            ReservationOwner::Blockage(_) => ReservationKind::Blockage,
        }
    }
}

/// Une journée planifiée d'un plan d'allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub date: NaiveDate,
    pub hours: f64,
}

/// Plan d'allocation (sortie transitoire de l'engin, pas encore découpé
/// en intervalles horaires). Trié chronologiquement, sans entrée à 0 h.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub entries: Vec<PlanEntry>,
}

impl AllocationPlan {
    pub fn total_hours(&self) -> f64 {
        self.entries.iter().map(|e| e.hours).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Requête d'allocation immuable (objet-valeur consommé par l'engin).
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    pub translator: TranslatorId,
    pub total_hours: f64,
    pub due_date: NaiveDateTime,
    pub mode: AllocationMode,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Agenda complet d'un bureau (l'agrégat persisté).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Agenda {
    pub translators: Vec<Translator>,
    pub tasks: Vec<Task>,
    pub blockages: Vec<Blockage>,
    pub reservations: Vec<TimeReservation>,
}

impl Agenda {
    pub fn find_translator_by_handle<'a>(&'a self, handle: &str) -> Option<&'a Translator> {
        self.translators.iter().find(|t| t.handle == handle)
    }
    pub fn find_translator_by_id<'a>(&'a self, id: &TranslatorId) -> Option<&'a Translator> {
        self.translators.iter().find(|t| &t.id == id)
    }
    pub fn find_task_by_id<'a>(&'a self, id: &TaskId) -> Option<&'a Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }
    pub fn find_task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }
    pub fn reservations_for_task<'a>(
        &'a self,
        id: &'a TaskId,
    ) -> impl Iterator<Item = &'a TimeReservation> {
        self.reservations
            .iter()
            .filter(move |r| matches!(&r.owner, ReservationOwner::Task(t) if t == id))
    }
}
