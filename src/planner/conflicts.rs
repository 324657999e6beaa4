use super::{Conflict, ConflictKind, DetectOptions, Planner};
use crate::model::{ReservationKind, TimeReservation, Translator, EPSILON_HOURS};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Classe les violations d'horaire d'un traducteur sur l'ensemble de ses
/// réservations, toutes origines confondues. Purement consultatif : rien
/// n'est bloqué ni corrigé, le rapport est rejouable à l'identique sur un
/// même instantané.
pub(super) fn detect_conflicts(
    planner: &Planner,
    translator: &Translator,
    opts: DetectOptions,
) -> Vec<Conflict> {
    let mut out = Vec::new();

    let mut by_date: BTreeMap<NaiveDate, Vec<&TimeReservation>> = BTreeMap::new();
    for r in planner
        .agenda()
        .reservations
        .iter()
        .filter(|r| r.translator == translator.id)
    {
        by_date.entry(r.date).or_default().push(r);
    }

    let cal = &translator.calendar;

    for (date, reservations) in &by_date {
        let total: f64 = reservations.iter().map(|r| r.hours).sum();
        if total > cal.daily_capacity_hours + EPSILON_HOURS {
            out.push(Conflict {
                translator: translator.id.clone(),
                date: *date,
                kind: ConflictKind::Surallocation,
                detail: format!(
                    "{total:.2}h reserved for a {:.2}h daily capacity",
                    cal.daily_capacity_hours
                ),
            });
        }

        for (idx, a) in reservations.iter().enumerate() {
            for b in reservations.iter().skip(idx + 1) {
                let Some((ra, rb)) = intersecting_ranges(a, b) else {
                    continue;
                };
                let kind = match (a.kind(), b.kind()) {
                    (ReservationKind::Task, ReservationKind::Blockage)
                    | (ReservationKind::Blockage, ReservationKind::Task) => ConflictKind::Blocage,
                    _ => ConflictKind::Chevauchement,
                };
                out.push(Conflict {
                    translator: translator.id.clone(),
                    date: *date,
                    kind,
                    detail: format!(
                        "[{}, {}) intersects [{}, {})",
                        ra.start, ra.end, rb.start, rb.end
                    ),
                });
            }
        }

        for r in reservations {
            if r.kind() != ReservationKind::Task {
                continue;
            }
            for range in &r.ranges {
                let outside = range.start < cal.work_start || range.end > cal.work_end;
                let in_lunch = cal
                    .lunch()
                    .map(|(ls, le)| range.start < le && ls < range.end)
                    .unwrap_or(false);
                if outside || in_lunch {
                    out.push(Conflict {
                        translator: translator.id.clone(),
                        date: *date,
                        kind: ConflictKind::HorsTravail,
                        detail: format!(
                            "[{}, {}) outside working window [{}, {})",
                            range.start, range.end, cal.work_start, cal.work_end
                        ),
                    });
                }
            }
        }
    }

    // Contrôle glissant par semaine ISO, distinct du contrôle quotidien :
    // seules les heures de tâches comptent.
    let mut by_week: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, reservations) in &by_date {
        let task_hours: f64 = reservations
            .iter()
            .filter(|r| r.kind() == ReservationKind::Task)
            .map(|r| r.hours)
            .sum();
        if task_hours > 0.0 {
            *by_week.entry(super::util::iso_week_monday(*date)).or_default() += task_hours;
        }
    }
    for (monday, hours) in by_week {
        if hours > opts.weekly_hours_target + EPSILON_HOURS {
            out.push(Conflict {
                translator: translator.id.clone(),
                date: monday,
                kind: ConflictKind::CapaciteDepassee,
                detail: format!(
                    "{hours:.2}h of tasks in ISO week against a {:.2}h target",
                    opts.weekly_hours_target
                ),
            });
        }
    }

    out
}

/// Première paire de sous-intervalles qui s'intersectent entre deux
/// réservations d'un même jour.
fn intersecting_ranges<'a>(
    a: &'a TimeReservation,
    b: &'a TimeReservation,
) -> Option<(&'a crate::model::TimeRange, &'a crate::model::TimeRange)> {
    for ra in &a.ranges {
        for rb in &b.ranges {
            if ra.overlaps(rb) {
                return Some((ra, rb));
            }
        }
    }
    None
}
