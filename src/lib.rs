#![forbid(unsafe_code)]
//! Planitrad — engin de répartition de charge pour traducteurs (sans BD).
//!
//! - Stockage fichiers (JSON), imports CSV.
//! - Allocation JAT (au plus tard), PEPS (au plus tôt), équilibrée, manuelle.
//! - Découpage intra-journée autour du déjeuner.
//! - Détection de conflits en cinq catégories, purement consultative.
//! - Dates naïves, interprétées dans le fuseau métier fixe
//!   [`BUSINESS_TIMEZONE`] ; l'affichage localisé reste hors de la lib.

pub mod calendar;
pub mod io;
pub mod model;
pub mod planner;
pub mod slicer;
pub mod storage;

pub use calendar::{WorkCalendar, WorkWindow};
pub use model::{
    Agenda, AllocationMode, AllocationPlan, AllocationRequest, Blockage, BlockageId, PlanEntry,
    ReservationId, ReservationKind, ReservationOwner, Task, TaskId, TimeRange, TimeReservation,
    Translator, TranslatorId, BUSINESS_TIMEZONE, EPSILON_HOURS,
};
pub use planner::{Conflict, ConflictKind, DetectOptions, PlanError, Planner, ValidationError};
pub use storage::{JsonStorage, Storage};
