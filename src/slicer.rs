//! Découpage intra-journée : convertit une durée en 1 ou 2 sous-intervalles
//! contigus en contournant la pause déjeuner.

use crate::model::TimeRange;
use chrono::{Duration, NaiveTime};

/// Convertit des heures décimales en durée, à la minute près.
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::minutes((hours * 60.0).round() as i64)
}

/// Place `duration_hours` à partir de `cursor` en évitant `lunch`.
///
/// Retourne le curseur mis à jour (point de départ de la prochaine
/// réservation du même jour) et la liste des sous-intervalles posés :
/// un seul si la durée tient d'un côté du déjeuner, deux si elle le
/// chevauche. Les réservations successives d'une même journée sont ainsi
/// posées bout à bout, jamais sur le déjeuner.
pub fn slice(
    cursor: NaiveTime,
    duration_hours: f64,
    lunch: Option<(NaiveTime, NaiveTime)>,
) -> (NaiveTime, Vec<TimeRange>) {
    let mut cursor = cursor;
    let duration = hours_to_duration(duration_hours);
    if duration <= Duration::zero() {
        return (cursor, Vec::new());
    }

    let mut ranges = Vec::with_capacity(2);

    if let Some((lunch_start, lunch_end)) = lunch {
        // Un curseur posé dans le déjeuner reprend après.
        if cursor >= lunch_start && cursor < lunch_end {
            cursor = lunch_end;
        }
        if cursor < lunch_start {
            let available = lunch_start - cursor;
            let consumed = available.min(duration);
            ranges.push(TimeRange {
                start: cursor,
                end: cursor + consumed,
            });
            let rest = duration - consumed;
            if rest > Duration::zero() {
                ranges.push(TimeRange {
                    start: lunch_end,
                    end: lunch_end + rest,
                });
                return (lunch_end + rest, ranges);
            }
            return (cursor + consumed, ranges);
        }
    }

    ranges.push(TimeRange {
        start: cursor,
        end: cursor + duration,
    });
    (cursor + duration, ranges)
}

/// Créneaux libres d'une journée : la fenêtre de travail moins le déjeuner
/// et les sous-intervalles déjà occupés (bornés à la fenêtre).
pub fn free_slots(
    window: (NaiveTime, NaiveTime),
    lunch: Option<(NaiveTime, NaiveTime)>,
    busy: &[TimeRange],
) -> Vec<TimeRange> {
    let (work_start, work_end) = window;
    let mut blocked: Vec<(NaiveTime, NaiveTime)> = busy
        .iter()
        .map(|r| (r.start, r.end))
        .chain(lunch)
        .collect();
    blocked.sort();

    let mut slots = Vec::new();
    let mut cursor = work_start;
    for (start, end) in blocked {
        let start = start.max(work_start);
        let end = end.min(work_end);
        if end <= start {
            continue;
        }
        if start > cursor {
            slots.push(TimeRange {
                start: cursor,
                end: start,
            });
        }
        cursor = cursor.max(end);
    }
    if cursor < work_end {
        slots.push(TimeRange {
            start: cursor,
            end: work_end,
        });
    }
    slots
}

/// Place `duration_hours` au plus tôt dans les créneaux libres, en ordre.
/// Retourne `None` si les créneaux ne suffisent pas : aucun intervalle ne
/// déborde jamais de la fenêtre de travail.
pub fn fill_slots(slots: &[TimeRange], duration_hours: f64) -> Option<Vec<TimeRange>> {
    let mut remaining = hours_to_duration(duration_hours);
    let mut ranges = Vec::new();
    for slot in slots {
        if remaining <= Duration::zero() {
            break;
        }
        let take = (slot.end - slot.start).min(remaining);
        ranges.push(TimeRange {
            start: slot.start,
            end: slot.start + take,
        });
        remaining = remaining - take;
    }
    if remaining > Duration::zero() {
        return None;
    }
    Some(ranges)
}
