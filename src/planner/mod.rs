mod backward;
mod conflicts;
mod forward;
mod types;
mod uniform;
mod util;
mod validate;

pub use types::{Conflict, ConflictKind, DetectOptions, PlanError, ValidationError};

use crate::model::{
    Agenda, AllocationMode, AllocationPlan, AllocationRequest, Blockage, PlanEntry, ReservationId,
    ReservationOwner, Task, TaskId, TimeRange, TimeReservation, Translator, TranslatorId,
    EPSILON_HOURS,
};
use crate::slicer;
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;

/// Planner : l'engin d'allocation et de détection, encapsulant un Agenda.
///
/// Tous les calculs sont des fonctions pures d'un instantané de l'agenda ;
/// seul `commit_task`, `complete_task`, `delete_task` et `add_blockage`
/// mutent l'état, et jamais partiellement : une erreur laisse l'agenda
/// intact. La sérialisation des mutations concurrentes sur un même agenda
/// incombe au porteur du fichier (voir `Storage`).
#[derive(Debug, Default)]
pub struct Planner {
    agenda: Agenda,
}

impl Planner {
    pub fn new() -> Self {
        Self {
            agenda: Agenda::default(),
        }
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }
    pub fn agenda_mut(&mut self) -> &mut Agenda {
        &mut self.agenda
    }

    pub fn add_translators(&mut self, translators: Vec<Translator>) {
        self.agenda.translators.extend(translators);
    }

    /// Capacité libre d'un jour : capacité quotidienne moins les heures
    /// déjà réservées (tâches + blocages), bornée à zéro.
    pub fn free_capacity(&self, translator: &TranslatorId, date: NaiveDate) -> f64 {
        let Some(t) = self.agenda.find_translator_by_id(translator) else {
            return 0.0;
        };
        self.free_capacity_excluding(t, date, None)
    }

    pub(crate) fn free_capacity_excluding(
        &self,
        translator: &Translator,
        date: NaiveDate,
        exclude: Option<&TaskId>,
    ) -> f64 {
        let reserved: f64 = self
            .reservations_on(translator, date, exclude)
            .map(|r| r.hours)
            .sum();
        translator.calendar.free_capacity(date, reserved)
    }

    fn reservations_on<'a>(
        &'a self,
        translator: &'a Translator,
        date: NaiveDate,
        exclude: Option<&'a TaskId>,
    ) -> impl Iterator<Item = &'a TimeReservation> {
        self.agenda
            .reservations
            .iter()
            .filter(move |r| r.translator == translator.id && r.date == date)
            .filter(move |r| match (exclude, &r.owner) {
                (Some(task), ReservationOwner::Task(owner)) => owner != task,
                _ => true,
            })
    }

    /// Prévisualise un plan sans rien persister. Identique d'un appel à
    /// l'autre tant que l'instantané ne change pas.
    pub fn preview_allocation(
        &self,
        request: &AllocationRequest,
        today: NaiveDate,
    ) -> Result<AllocationPlan, PlanError> {
        let translator = self.resolve_translator(&request.translator)?;
        check_request(request, today)?;
        self.compute_plan(translator, request, today, None)
    }

    /// Calcule (ou accepte, en mode Manual) un plan, le découpe en
    /// intervalles horaires, le valide puis remplace les réservations de la
    /// tâche. Rien n'est écrit si une étape échoue ; seule exception, une
    /// saisie manuelle dont la somme diffère du total est acceptée et la
    /// tâche marquée incohérente jusqu'à correction.
    pub fn commit_task(
        &mut self,
        mut task: Task,
        manual_entries: Option<Vec<PlanEntry>>,
        today: NaiveDate,
    ) -> Result<Vec<ReservationId>, PlanError> {
        let translator = self.resolve_translator(&task.translator)?.clone();
        let request = AllocationRequest {
            translator: task.translator.clone(),
            total_hours: task.total_hours,
            due_date: task.due_date,
            mode: task.mode,
            start_date: task.start_date,
            end_date: task.end_date,
        };
        check_request(&request, today)?;

        let exclude = task.id.clone();
        let plan = match task.mode {
            AllocationMode::Manual => {
                let entries = manual_entries
                    .ok_or(PlanError::InvalidRange("manual mode requires explicit entries"))?;
                manual_plan(entries)?
            }
            _ => self.compute_plan(&translator, &request, today, Some(&exclude))?,
        };

        task.inconsistent = false;
        match validate::validate_plan(self, &translator, &plan, task.total_hours, Some(&exclude)) {
            Ok(()) => {}
            Err(ValidationError::TotalMismatch { .. }) if task.mode == AllocationMode::Manual => {
                task.inconsistent = true;
            }
            Err(err) => return Err(err.into()),
        }

        let reservations = self.slice_plan(&translator, &plan, &exclude)?;
        let ids: Vec<ReservationId> = reservations.iter().map(|r| r.id.clone()).collect();

        // Recalcul = suppression + régénération, en une seule mutation.
        self.agenda.reservations.retain(
            |r| !matches!(&r.owner, ReservationOwner::Task(t) if *t == exclude),
        );
        self.agenda.reservations.extend(reservations);
        if let Some(existing) = self.agenda.find_task_mut(&task.id) {
            *existing = task;
        } else {
            self.agenda.tasks.push(task);
        }
        Ok(ids)
    }

    /// Marque la tâche terminée et libère ses réservations postérieures à
    /// la date d'achèvement.
    pub fn complete_task(
        &mut self,
        task_id: &TaskId,
        completion_date: NaiveDate,
    ) -> Result<(), PlanError> {
        let task = self
            .agenda
            .find_task_mut(task_id)
            .ok_or_else(|| PlanError::UnknownTask(task_id.as_str().to_string()))?;
        task.completed = true;
        self.agenda.reservations.retain(|r| {
            !(matches!(&r.owner, ReservationOwner::Task(t) if t == task_id)
                && r.date > completion_date)
        });
        Ok(())
    }

    /// Supprime la tâche et toutes ses réservations.
    pub fn delete_task(&mut self, task_id: &TaskId) -> Result<(), PlanError> {
        if self.agenda.find_task_by_id(task_id).is_none() {
            return Err(PlanError::UnknownTask(task_id.as_str().to_string()));
        }
        self.agenda.tasks.retain(|t| &t.id != task_id);
        self.agenda
            .reservations
            .retain(|r| !matches!(&r.owner, ReservationOwner::Task(t) if t == task_id));
        Ok(())
    }

    /// Enregistre un blocage et sa réservation dérivée. Les blocages sont
    /// créés et supprimés directement par l'utilisateur, jamais recalculés.
    pub fn add_blockage(&mut self, blockage: Blockage) -> Result<ReservationId, PlanError> {
        let translator = self.resolve_translator(&blockage.translator)?.clone();
        let cal = &translator.calendar;

        let (hours, ranges) = if blockage.full_day {
            let mut ranges = Vec::new();
            match cal.lunch() {
                Some((ls, le)) => {
                    if ls > cal.work_start {
                        ranges.push(TimeRange {
                            start: cal.work_start,
                            end: ls,
                        });
                    }
                    if cal.work_end > le {
                        ranges.push(TimeRange {
                            start: le,
                            end: cal.work_end,
                        });
                    }
                }
                None => ranges.push(TimeRange {
                    start: cal.work_start,
                    end: cal.work_end,
                }),
            }
            (cal.daily_capacity_hours, ranges)
        } else {
            let (start, end) = match (blockage.start, blockage.end) {
                (Some(s), Some(e)) => (s, e),
                _ => return Err(PlanError::InvalidRange("partial blockage requires start and end")),
            };
            if end <= start {
                return Err(PlanError::InvalidRange("blockage end before start"));
            }
            // Borné à la fenêtre de travail ; un blocage qui n'en recoupe
            // rien (ou qui tombe entièrement dans le déjeuner) ne réserve
            // aucune heure et est refusé plutôt que stocké à vide.
            let start = start.max(cal.work_start);
            let end = end.min(cal.work_end);
            if end <= start {
                return Err(PlanError::InvalidRange("blockage lies outside the work window"));
            }
            let range = TimeRange { start, end };
            let ranges = split_around_lunch(&range, cal.lunch());
            if ranges.is_empty() {
                return Err(PlanError::InvalidRange(
                    "blockage lies entirely within the lunch break",
                ));
            }
            (cal.working_hours_in(&range), ranges)
        };

        let reservation = TimeReservation {
            id: ReservationId::random(),
            owner: ReservationOwner::Blockage(blockage.id.clone()),
            translator: blockage.translator.clone(),
            date: blockage.date,
            hours,
            ranges,
        };
        let id = reservation.id.clone();
        self.agenda.blockages.push(blockage);
        self.agenda.reservations.push(reservation);
        Ok(id)
    }

    /// Supprime un blocage et sa réservation.
    pub fn delete_blockage(&mut self, blockage_id: &crate::model::BlockageId) {
        self.agenda.blockages.retain(|b| &b.id != blockage_id);
        self.agenda
            .reservations
            .retain(|r| !matches!(&r.owner, ReservationOwner::Blockage(b) if b == blockage_id));
    }

    /// Rapport de conflits d'un traducteur.
    pub fn detect_conflicts(
        &self,
        translator: &TranslatorId,
        opts: DetectOptions,
    ) -> Result<Vec<Conflict>, PlanError> {
        let t = self.resolve_translator(translator)?;
        Ok(conflicts::detect_conflicts(self, t, opts))
    }

    /// Rapport de conflits de tous les traducteurs de l'agenda.
    pub fn detect_all(&self, opts: DetectOptions) -> Vec<Conflict> {
        self.agenda
            .translators
            .iter()
            .flat_map(|t| conflicts::detect_conflicts(self, t, opts))
            .collect()
    }

    fn resolve_translator(&self, id: &TranslatorId) -> Result<&Translator, PlanError> {
        self.agenda
            .find_translator_by_id(id)
            .ok_or_else(|| PlanError::UnknownTranslator(id.as_str().to_string()))
    }

    fn compute_plan(
        &self,
        translator: &Translator,
        request: &AllocationRequest,
        today: NaiveDate,
        exclude: Option<&TaskId>,
    ) -> Result<AllocationPlan, PlanError> {
        match request.mode {
            AllocationMode::Backward => backward::allocate(
                self,
                translator,
                request.total_hours,
                request.due_date,
                today,
                exclude,
            ),
            AllocationMode::Forward => {
                let start = request.start_date.unwrap_or(today);
                forward::allocate(
                    self,
                    translator,
                    request.total_hours,
                    start,
                    request.due_date,
                    exclude,
                )
            }
            AllocationMode::Uniform => {
                let (Some(start), Some(end)) = (request.start_date, request.end_date) else {
                    return Err(PlanError::InvalidRange(
                        "uniform mode requires start_date and end_date",
                    ));
                };
                uniform::allocate(self, translator, request.total_hours, start, end, exclude)
            }
            AllocationMode::Manual => Err(PlanError::InvalidRange(
                "manual mode has no computed preview",
            )),
        }
    }

    /// Résout les intervalles horaires de chaque journée du plan : les
    /// heures se posent au plus tôt dans les créneaux encore libres de la
    /// fenêtre de travail, après les réservations déjà en place. Les tâches
    /// d'une même journée se suivent donc, et rien ne déborde jamais de la
    /// fenêtre ni sur le déjeuner.
    fn slice_plan(
        &self,
        translator: &Translator,
        plan: &AllocationPlan,
        task_id: &TaskId,
    ) -> Result<Vec<TimeReservation>, ValidationError> {
        let cal = &translator.calendar;
        let mut out = Vec::with_capacity(plan.entries.len());
        for entry in &plan.entries {
            let busy: Vec<TimeRange> = self
                .reservations_on(translator, entry.date, Some(task_id))
                .flat_map(|r| r.ranges.iter().copied())
                .collect();
            let slots = slicer::free_slots((cal.work_start, cal.work_end), cal.lunch(), &busy);
            let ranges = slicer::fill_slots(&slots, entry.hours).ok_or_else(|| {
                ValidationError::NoIntradayRoom {
                    date: entry.date,
                    asked: entry.hours,
                    available: slots.iter().map(TimeRange::hours).sum(),
                }
            })?;
            out.push(TimeReservation {
                id: ReservationId::random(),
                owner: ReservationOwner::Task(task_id.clone()),
                translator: translator.id.clone(),
                date: entry.date,
                hours: entry.hours,
                ranges,
            });
        }
        Ok(out)
    }
}

/// Contrôles de cohérence de la requête, avant tout parcours de dates.
fn check_request(request: &AllocationRequest, today: NaiveDate) -> Result<(), PlanError> {
    if request.total_hours <= 0.0 {
        return Err(PlanError::InvalidRange("total_hours must be positive"));
    }
    if request.due_date.date() < today {
        return Err(PlanError::InvalidRange("due date is in the past"));
    }
    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        if end < start {
            return Err(PlanError::InvalidRange("end date before start date"));
        }
    }
    Ok(())
}

/// Normalise une saisie manuelle : rejet des heures négatives, fusion des
/// dates répétées (leur cumul compte comme une seule journée face à la
/// capacité), entrées nulles écartées, tri chronologique.
fn manual_plan(entries: Vec<PlanEntry>) -> Result<AllocationPlan, PlanError> {
    let mut merged: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for entry in entries {
        if entry.hours < 0.0 {
            return Err(PlanError::InvalidRange("manual entry with negative hours"));
        }
        *merged.entry(entry.date).or_default() += entry.hours;
    }
    let entries = merged
        .into_iter()
        .filter(|(_, hours)| *hours > EPSILON_HOURS)
        .map(|(date, hours)| PlanEntry { date, hours })
        .collect();
    Ok(AllocationPlan { entries })
}

/// Découpe un intervalle autour du déjeuner (0, 1 ou 2 morceaux).
fn split_around_lunch(
    range: &TimeRange,
    lunch: Option<(NaiveTime, NaiveTime)>,
) -> Vec<TimeRange> {
    let Some((ls, le)) = lunch else {
        return vec![*range];
    };
    let mut out = Vec::with_capacity(2);
    if range.start < ls {
        out.push(TimeRange {
            start: range.start,
            end: range.end.min(ls),
        });
    }
    if range.end > le {
        out.push(TimeRange {
            start: range.start.max(le),
            end: range.end,
        });
    }
    // Vide si l'intervalle tombe entièrement dans le déjeuner.
    out
}
