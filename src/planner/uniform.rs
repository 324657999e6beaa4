use super::{types::PlanError, util, Planner};
use crate::model::{AllocationPlan, PlanEntry, TaskId, Translator, EPSILON_HOURS};
use chrono::NaiveDate;

/// Équilibré : vise `total / nombre de jours ouvrés` sur chaque jour de
/// `[start, end]`, puis redistribue le manque des jours contraints sur les
/// jours qui gardent de la marge, au prorata de leur marge. Chaque tour
/// sature au moins un jour ou éteint le manque, la boucle termine donc en
/// au plus un tour par jour.
pub(super) fn allocate(
    planner: &Planner,
    translator: &Translator,
    total_hours: f64,
    start: NaiveDate,
    end: NaiveDate,
    exclude: Option<&TaskId>,
) -> Result<AllocationPlan, PlanError> {
    let days: Vec<(NaiveDate, f64)> = util::dates_ascending(start, end)
        .into_iter()
        .filter(|d| translator.calendar.is_working_day(*d))
        .map(|d| (d, planner.free_capacity_excluding(translator, d, exclude)))
        .collect();

    if days.is_empty() {
        return Err(PlanError::Infeasible {
            missing: total_hours,
            floor: start,
            ceiling: end,
        });
    }

    let target = total_hours / days.len() as f64;

    // Première passe : le quota du jour, plafonné par sa capacité libre.
    let mut allocated: Vec<f64> = days
        .iter()
        .map(|(_, free)| target.min(*free))
        .collect();
    let mut shortfall = total_hours - allocated.iter().sum::<f64>();

    // Redistribution proportionnelle du manque sur les jours à marge.
    while shortfall > EPSILON_HOURS {
        let spare: Vec<f64> = days
            .iter()
            .zip(allocated.iter())
            .map(|((_, free), got)| (free - got).max(0.0))
            .collect();
        let total_spare: f64 = spare.iter().sum();
        if total_spare <= EPSILON_HOURS {
            return Err(PlanError::Infeasible {
                missing: shortfall,
                floor: start,
                ceiling: end,
            });
        }
        let mut placed = 0.0;
        for (idx, margin) in spare.iter().enumerate() {
            if *margin <= 0.0 {
                continue;
            }
            let add = (shortfall * margin / total_spare).min(*margin);
            allocated[idx] += add;
            placed += add;
        }
        shortfall -= placed;
    }

    let entries = days
        .iter()
        .zip(allocated.iter())
        .filter(|(_, got)| **got > EPSILON_HOURS)
        .map(|((date, _), got)| PlanEntry {
            date: *date,
            hours: *got,
        })
        .collect();

    Ok(AllocationPlan { entries })
}
