use crate::calendar::WorkCalendar;
use crate::model::{Agenda, Blockage, Translator};
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use csv::ReaderBuilder;
use std::path::Path;

/// Import de traducteurs depuis CSV :
/// header `handle,display_name[,work_start][,work_end][,lunch][,daily_capacity]`.
/// `lunch` au format `12:00-13:00`, `none` pour aucune pause. Les colonnes
/// vides ou omises retombent sur le calendrier standard (9h–17h, 7 h/jour).
pub fn import_translators_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Translator>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let display = rec.get(1).context("missing display_name")?.trim();
        if handle.is_empty() || display.is_empty() {
            bail!("invalid translator row (empty)");
        }

        let standard = WorkCalendar::standard();
        let work_start = opt_field(&rec, 2)
            .map(parse_time)
            .transpose()
            .with_context(|| format!("invalid work_start for handle {handle}"))?
            .unwrap_or(standard.work_start);
        let work_end = opt_field(&rec, 3)
            .map(parse_time)
            .transpose()
            .with_context(|| format!("invalid work_end for handle {handle}"))?
            .unwrap_or(standard.work_end);
        let lunch = match opt_field(&rec, 4) {
            Some(raw) if raw.eq_ignore_ascii_case("none") => None,
            Some(raw) => Some(
                parse_time_range(raw)
                    .with_context(|| format!("invalid lunch for handle {handle}"))?,
            ),
            None => standard.lunch(),
        };
        let daily_capacity = opt_field(&rec, 5)
            .map(|raw| raw.parse::<f64>())
            .transpose()
            .with_context(|| format!("invalid daily_capacity for handle {handle}"))?
            .unwrap_or(standard.daily_capacity_hours);

        let calendar = WorkCalendar::new(work_start, work_end, lunch, daily_capacity)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid calendar for handle {handle}"))?;
        out.push(Translator::new(handle, display, calendar));
    }
    Ok(out)
}

/// Import de blocages depuis CSV : header `handle,date,range,reason`.
/// `range` vaut `full` pour un jour entier ou `14:00-16:00` pour un
/// intervalle. Les handles sont résolus contre l'agenda fourni.
pub fn import_blockages_csv<P: AsRef<Path>>(
    path: P,
    agenda: &Agenda,
) -> anyhow::Result<Vec<Blockage>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let translator = agenda
            .find_translator_by_handle(handle)
            .with_context(|| format!("unknown translator handle: {handle}"))?;
        let date = rec.get(1).context("missing date")?.trim();
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid date for handle {handle}"))?;
        let range = rec.get(2).map(str::trim).unwrap_or("full");
        let reason = rec.get(3).map(str::trim).unwrap_or("").to_string();

        let blockage = if range.is_empty() || range.eq_ignore_ascii_case("full") {
            Blockage::full_day(translator.id.clone(), date, reason)
        } else {
            let (start, end) = parse_time_range(range)
                .with_context(|| format!("invalid range for handle {handle}"))?;
            Blockage::partial(translator.id.clone(), date, start, end, reason)
                .map_err(anyhow::Error::msg)?
        };
        out.push(blockage);
    }
    Ok(out)
}

fn opt_field<'a>(rec: &'a csv::StringRecord, idx: usize) -> Option<&'a str> {
    rec.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Heure au format `9:00`, `09:00` ou `09:00:00`.
pub fn parse_time(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("invalid time: {raw}"))
}

/// Intervalle `HH:MM-HH:MM`.
pub fn parse_time_range(raw: &str) -> anyhow::Result<(NaiveTime, NaiveTime)> {
    let Some((start_raw, end_raw)) = raw.split_once('-') else {
        bail!("expected HH:MM-HH:MM, got: {raw}");
    };
    let start = parse_time(start_raw.trim())?;
    let end = parse_time(end_raw.trim())?;
    if end <= start {
        bail!("range end must be after start: {raw}");
    }
    Ok((start, end))
}
