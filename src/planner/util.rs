use crate::calendar::WorkCalendar;
use crate::model::TimeRange;
use chrono::{Duration, NaiveDate, NaiveTime};

/// Itère les dates de `start` à `end` inclus, dans l'ordre croissant.
pub(super) fn dates_ascending(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut current = start;
    while current <= end {
        out.push(current);
        current += Duration::days(1);
    }
    out
}

/// Heures ouvrées d'une journée avant `deadline` (déjeuner déduit).
/// Une échéance à minuit ou avant l'ouverture ne laisse rien ce jour-là.
pub(super) fn hours_before(calendar: &WorkCalendar, deadline: NaiveTime) -> f64 {
    if deadline <= calendar.work_start {
        return 0.0;
    }
    calendar.working_hours_in(&TimeRange {
        start: calendar.work_start,
        end: deadline,
    })
}

/// Lundi de la semaine ISO d'une date.
pub(super) fn iso_week_monday(date: NaiveDate) -> NaiveDate {
    use chrono::{Datelike, Weekday};
    let week = date.iso_week();
    NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon).unwrap_or(date)
}
