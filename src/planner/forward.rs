use super::{types::PlanError, util, Planner};
use crate::model::{AllocationPlan, PlanEntry, TaskId, Translator, EPSILON_HOURS};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// PEPS : avance les jours depuis `start` en remplissant la capacité libre
/// de chaque jour ouvré, le jour d'échéance ne comptant que ses heures
/// ouvrées précédant l'heure d'échéance. Échoue si le parcours dépasserait
/// l'échéance avec des heures restantes : la tâche ne peut pas être finie à
/// temps à la capacité courante.
pub(super) fn allocate(
    planner: &Planner,
    translator: &Translator,
    total_hours: f64,
    start: NaiveDate,
    due: NaiveDateTime,
    exclude: Option<&TaskId>,
) -> Result<AllocationPlan, PlanError> {
    let mut remaining = total_hours;
    let mut entries: Vec<PlanEntry> = Vec::new();
    let mut date = start;

    while remaining > EPSILON_HOURS {
        if date > due.date() {
            return Err(PlanError::Infeasible {
                missing: remaining,
                floor: start,
                ceiling: due.date(),
            });
        }
        if translator.calendar.is_working_day(date) {
            let mut free = planner.free_capacity_excluding(translator, date, exclude);
            if date == due.date() {
                free = free.min(util::hours_before(&translator.calendar, due.time()));
            }
            if free > EPSILON_HOURS {
                let hours = free.min(remaining);
                entries.push(PlanEntry { date, hours });
                remaining -= hours;
            }
        }
        date += Duration::days(1);
    }

    Ok(AllocationPlan { entries })
}
