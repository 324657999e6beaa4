use crate::model::TimeRange;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Calendrier de travail d'un traducteur : fenêtre de travail, pause
/// déjeuner optionnelle et capacité quotidienne. Les samedis et dimanches
/// sont chômés.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    #[serde(default)]
    pub lunch_start: Option<NaiveTime>,
    #[serde(default)]
    pub lunch_end: Option<NaiveTime>,
    /// Peut différer de `work_end − work_start − déjeuner` si configurée
    /// explicitement.
    pub daily_capacity_hours: f64,
}

/// Fenêtre de travail résolue pour une date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub lunch: Option<(NaiveTime, NaiveTime)>,
}

impl WorkCalendar {
    /// Crée un calendrier en validant l'ordre des bornes et l'inclusion
    /// de la pause déjeuner dans la fenêtre de travail.
    pub fn new(
        work_start: NaiveTime,
        work_end: NaiveTime,
        lunch: Option<(NaiveTime, NaiveTime)>,
        daily_capacity_hours: f64,
    ) -> Result<Self, String> {
        if work_end <= work_start {
            return Err("work_end must be strictly after work_start".to_string());
        }
        if daily_capacity_hours <= 0.0 {
            return Err("daily_capacity_hours must be strictly positive".to_string());
        }
        if let Some((ls, le)) = lunch {
            if le <= ls {
                return Err("lunch_end must be strictly after lunch_start".to_string());
            }
            if ls < work_start || le > work_end {
                return Err("lunch window must lie within the work window".to_string());
            }
        }
        Ok(Self {
            work_start,
            work_end,
            lunch_start: lunch.map(|(s, _)| s),
            lunch_end: lunch.map(|(_, e)| e),
            daily_capacity_hours,
        })
    }

    /// Calendrier par défaut : 9h–17h, déjeuner 12h–13h, 7 h/jour.
    pub fn standard() -> Self {
        Self {
            work_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            work_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            lunch_start: NaiveTime::from_hms_opt(12, 0, 0),
            lunch_end: NaiveTime::from_hms_opt(13, 0, 0),
            daily_capacity_hours: 7.0,
        }
    }

    /// Jour ouvré ? Faux le week-end. Un blocage jour entier ne change pas
    /// la réponse : il consomme de la capacité mais le jour reste ouvré.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Fenêtre de travail du jour (identique pour tous les jours ouvrés).
    pub fn window(&self) -> WorkWindow {
        WorkWindow {
            start: self.work_start,
            end: self.work_end,
            lunch: self.lunch(),
        }
    }

    pub fn lunch(&self) -> Option<(NaiveTime, NaiveTime)> {
        match (self.lunch_start, self.lunch_end) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }

    /// Capacité restante un jour donné, `reserved_hours` étant la somme des
    /// réservations (tâches + blocages) déjà posées. Jamais négative : une
    /// sursouscription est un conflit détecté ailleurs, pas empêchée ici.
    pub fn free_capacity(&self, date: NaiveDate, reserved_hours: f64) -> f64 {
        if !self.is_working_day(date) {
            return 0.0;
        }
        (self.daily_capacity_hours - reserved_hours).max(0.0)
    }

    /// Heures utiles d'un intervalle : intersection avec la fenêtre de
    /// travail, déjeuner déduit. Sert à dériver les heures d'un blocage.
    pub fn working_hours_in(&self, range: &TimeRange) -> f64 {
        let start = range.start.max(self.work_start);
        let end = range.end.min(self.work_end);
        if end <= start {
            return 0.0;
        }
        let mut minutes = (end - start).num_minutes();
        if let Some((ls, le)) = self.lunch() {
            let ov_start = start.max(ls);
            let ov_end = end.min(le);
            if ov_end > ov_start {
                minutes -= (ov_end - ov_start).num_minutes();
            }
        }
        minutes.max(0) as f64 / 60.0
    }
}
