#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use planitrad::{
    model::{
        AllocationMode, Blockage, BlockageId, ReservationId, ReservationOwner, Task, TaskId,
        TimeRange, TimeReservation,
    },
    planner::{ConflictKind, DetectOptions, Planner},
    Translator, TranslatorId, WorkCalendar,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

fn setup(calendar: WorkCalendar) -> (Planner, TranslatorId) {
    let mut planner = Planner::new();
    let translator = Translator::new("bruno", "Bruno", calendar);
    let id = translator.id.clone();
    planner.add_translators(vec![translator]);
    (planner, id)
}

/// Calendrier 9h–17h sans pause, 7 h/jour : isole les cas de test du
/// déjeuner.
fn no_lunch_calendar() -> WorkCalendar {
    WorkCalendar::new(t(9, 0), t(17, 0), None, 7.0).unwrap()
}

fn task_reservation(
    translator: &TranslatorId,
    date: NaiveDate,
    hours: f64,
    ranges: Vec<TimeRange>,
) -> TimeReservation {
    TimeReservation {
        id: ReservationId::random(),
        owner: ReservationOwner::Task(TaskId::random()),
        translator: translator.clone(),
        date,
        hours,
        ranges,
    }
}

fn range(start: NaiveTime, end: NaiveTime) -> TimeRange {
    TimeRange::new(start, end).unwrap()
}

#[test]
fn overlapping_task_ranges_yield_one_chevauchement() {
    let (mut planner, id) = setup(no_lunch_calendar());
    let date = d(2026, 9, 7);
    // Deux réservations [9h,12h) et [11h,13h) posées à la main.
    {
        let agenda = planner.agenda_mut();
        agenda
            .reservations
            .push(task_reservation(&id, date, 3.0, vec![range(t(9, 0), t(12, 0))]));
        agenda
            .reservations
            .push(task_reservation(&id, date, 2.0, vec![range(t(11, 0), t(13, 0))]));
    }

    let conflicts = planner.detect_conflicts(&id, DetectOptions::default()).unwrap();
    let overlaps: Vec<_> = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::Chevauchement)
        .collect();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].date, date);
}

#[test]
fn task_meeting_a_blockage_is_classified_blocage() {
    let (mut planner, id) = setup(no_lunch_calendar());
    let date = d(2026, 9, 7);
    {
        let agenda = planner.agenda_mut();
        agenda
            .reservations
            .push(task_reservation(&id, date, 3.0, vec![range(t(9, 0), t(12, 0))]));
        agenda.reservations.push(TimeReservation {
            id: ReservationId::random(),
            owner: ReservationOwner::Blockage(BlockageId::random()),
            translator: id.clone(),
            date,
            hours: 2.0,
            ranges: vec![range(t(11, 0), t(13, 0))],
        });
    }

    let conflicts = planner.detect_conflicts(&id, DetectOptions::default()).unwrap();
    assert!(conflicts.iter().any(|c| c.kind == ConflictKind::Blocage));
    assert!(!conflicts.iter().any(|c| c.kind == ConflictKind::Chevauchement));
}

#[test]
fn day_over_daily_capacity_is_surallocation() {
    let (mut planner, id) = setup(no_lunch_calendar());
    let date = d(2026, 9, 7);
    {
        let agenda = planner.agenda_mut();
        agenda
            .reservations
            .push(task_reservation(&id, date, 5.0, vec![range(t(9, 0), t(14, 0))]));
        agenda
            .reservations
            .push(task_reservation(&id, date, 4.0, vec![range(t(14, 0), t(18, 0))]));
    }

    let conflicts = planner.detect_conflicts(&id, DetectOptions::default()).unwrap();
    let over: Vec<_> = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::Surallocation)
        .collect();
    assert_eq!(over.len(), 1);
    assert!(over[0].detail.contains("9.00"));
}

#[test]
fn ranges_outside_the_work_window_are_hors_travail() {
    let (mut planner, id) = setup(no_lunch_calendar());
    let date = d(2026, 9, 7);
    {
        let agenda = planner.agenda_mut();
        agenda
            .reservations
            .push(task_reservation(&id, date, 2.0, vec![range(t(7, 0), t(9, 0))]));
    }

    let conflicts = planner.detect_conflicts(&id, DetectOptions::default()).unwrap();
    assert!(conflicts.iter().any(|c| c.kind == ConflictKind::HorsTravail));
}

#[test]
fn task_covering_lunch_is_hors_travail() {
    let (mut planner, id) = setup(WorkCalendar::standard());
    let date = d(2026, 9, 7);
    {
        let agenda = planner.agenda_mut();
        agenda
            .reservations
            .push(task_reservation(&id, date, 3.0, vec![range(t(11, 0), t(14, 0))]));
    }

    let conflicts = planner.detect_conflicts(&id, DetectOptions::default()).unwrap();
    assert!(conflicts.iter().any(|c| c.kind == ConflictKind::HorsTravail));
}

#[test]
fn weekly_task_hours_over_target_raise_capacite_depassee() {
    let (mut planner, id) = setup(no_lunch_calendar());
    // 8 h par jour ouvré du 7 au 11 septembre : 40 h dans la semaine ISO.
    {
        let agenda = planner.agenda_mut();
        for day in 7..=11 {
            agenda.reservations.push(task_reservation(
                &id,
                d(2026, 9, day),
                8.0,
                vec![range(t(9, 0), t(17, 0))],
            ));
        }
    }

    let conflicts = planner
        .detect_conflicts(
            &id,
            DetectOptions {
                weekly_hours_target: 37.5,
            },
        )
        .unwrap();
    let weekly: Vec<_> = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::CapaciteDepassee)
        .collect();
    assert_eq!(weekly.len(), 1);
    // Le conflit est daté du lundi de la semaine ISO.
    assert_eq!(weekly[0].date, d(2026, 9, 7));
}

#[test]
fn blockage_hours_count_toward_surallocation_but_not_weekly_target() {
    let (mut planner, id) = setup(no_lunch_calendar());
    let date = d(2026, 9, 7);
    planner
        .add_blockage(Blockage::full_day(id.clone(), date, "congé"))
        .unwrap();
    {
        let agenda = planner.agenda_mut();
        agenda
            .reservations
            .push(task_reservation(&id, date, 4.0, vec![range(t(9, 0), t(13, 0))]));
    }

    let conflicts = planner
        .detect_conflicts(
            &id,
            DetectOptions {
                weekly_hours_target: 5.0,
            },
        )
        .unwrap();
    // 7 h de blocage + 4 h de tâche > 7 h de capacité quotidienne.
    assert!(conflicts.iter().any(|c| c.kind == ConflictKind::Surallocation));
    // Mais seules les 4 h de tâche comptent pour le plafond hebdomadaire.
    assert!(!conflicts.iter().any(|c| c.kind == ConflictKind::CapaciteDepassee));
}

#[test]
fn clean_committed_schedule_has_no_conflicts() {
    let (mut planner, id) = setup(WorkCalendar::standard());
    let task = Task::new(
        id.clone(),
        14.0,
        d(2026, 9, 11).and_time(t(17, 0)),
        AllocationMode::Forward,
    )
    .unwrap();
    planner.commit_task(task, None, d(2026, 9, 7)).unwrap();

    let conflicts = planner.detect_conflicts(&id, DetectOptions::default()).unwrap();
    assert!(conflicts.is_empty());
}

#[test]
fn detection_is_idempotent_and_side_effect_free() {
    let (mut planner, id) = setup(no_lunch_calendar());
    {
        let agenda = planner.agenda_mut();
        agenda.reservations.push(task_reservation(
            &id,
            d(2026, 9, 7),
            9.0,
            vec![range(t(9, 0), t(18, 0))],
        ));
    }

    let before = planner.agenda().reservations.len();
    let first = planner.detect_conflicts(&id, DetectOptions::default()).unwrap();
    let second = planner.detect_conflicts(&id, DetectOptions::default()).unwrap();
    assert_eq!(first.len(), second.len());
    assert_eq!(planner.agenda().reservations.len(), before);
}
