use super::types::ValidationError;
use super::Planner;
use crate::model::{AllocationPlan, TaskId, Translator, EPSILON_HOURS};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Vérifie un plan avant acceptation, dans l'ordre : jours ouvrés,
/// capacité par jour (mesurée sur l'instantané d'avant application),
/// somme totale. Les entrées d'une même date se cumulent face à la
/// capacité du jour. Ne tronque ni ne corrige jamais : toute entorse
/// renvoie l'erreur qui nomme le jour et les heures en cause.
pub(super) fn validate_plan(
    planner: &Planner,
    translator: &Translator,
    plan: &AllocationPlan,
    expected_total: f64,
    exclude: Option<&TaskId>,
) -> Result<(), ValidationError> {
    for entry in &plan.entries {
        if !translator.calendar.is_working_day(entry.date) {
            return Err(ValidationError::NonWorkingDay(entry.date));
        }
    }

    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for entry in &plan.entries {
        *per_day.entry(entry.date).or_default() += entry.hours;
    }
    for (date, asked) in per_day {
        let available = planner.free_capacity_excluding(translator, date, exclude);
        if asked > available + EPSILON_HOURS {
            return Err(ValidationError::OverCapacity {
                date,
                asked,
                available,
            });
        }
    }

    let planned = plan.total_hours();
    if (planned - expected_total).abs() > EPSILON_HOURS {
        return Err(ValidationError::TotalMismatch {
            planned,
            expected: expected_total,
        });
    }

    Ok(())
}
