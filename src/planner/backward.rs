use super::{types::PlanError, util, Planner};
use crate::model::{AllocationPlan, PlanEntry, TaskId, Translator, EPSILON_HOURS};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// JAT : remonte les jours depuis l'échéance (incluse, à hauteur des heures
/// ouvrées précédant l'heure d'échéance) en remplissant la capacité libre
/// de chaque jour ouvré, puis renvoie le plan remis en ordre chronologique.
/// Échoue si le parcours franchit `floor` (le plancher, en général
/// aujourd'hui) avec des heures restantes.
pub(super) fn allocate(
    planner: &Planner,
    translator: &Translator,
    total_hours: f64,
    due: NaiveDateTime,
    floor: NaiveDate,
    exclude: Option<&TaskId>,
) -> Result<AllocationPlan, PlanError> {
    let mut remaining = total_hours;
    let mut entries: Vec<PlanEntry> = Vec::new();
    let mut date = due.date();

    while remaining > EPSILON_HOURS {
        if date < floor {
            return Err(PlanError::Infeasible {
                missing: remaining,
                floor,
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
        date -= Duration::days(1);
    }

    entries.reverse();
    Ok(AllocationPlan { entries })
}
