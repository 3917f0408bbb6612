//! Finestre di validità della vaccinazione antirabbica
//!
//! Una vaccinazione somministrata il giorno `A` con validità di `N` anni scade il giorno
//! `A + N anni` (incluso). La prima vaccinazione diventa valida dopo 21 giorni; un richiamo
//! fatto mentre la vaccinazione precedente è ancora valida è valido da subito.

use crate::entities::Record;
use chrono::{Days, Months, NaiveDate};
use serde::Serialize;

/// Giorni di attesa dopo una vaccinazione primaria
pub const PRIMARY_WAIT_DAYS: u64 = 21;

/// Vaccinazione antirabbica estratta da un record firmato
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RabiesVaccination {
    pub record_id: i32,
    pub administered_on: NaiveDate,
    pub validity_years: u32,
}

impl RabiesVaccination {
    /// Solo i record di vaccinazione antirabbica firmati contano
    pub fn from_record(record: &Record) -> Option<Self> {
        if !record.is_rabies_vaccination() || !record.is_signed() {
            return None;
        }
        let years = u32::try_from(record.validity_years?).ok()?;
        Some(Self {
            record_id: record.record_id,
            administered_on: record.visit_date,
            validity_years: years,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RabiesWindow {
    pub record_id: i32,
    pub administered_on: NaiveDate,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub booster: bool,
}

impl RabiesWindow {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_until
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RabiesStatus {
    NotVaccinated,
    NotYetValid {
        record_id: i32,
        valid_from: NaiveDate,
    },
    Valid {
        record_id: i32,
        valid_from: NaiveDate,
        valid_until: NaiveDate,
    },
    Expired {
        record_id: i32,
        expired_on: NaiveDate,
    },
}

fn expiry(administered_on: NaiveDate, years: u32) -> NaiveDate {
    administered_on
        .checked_add_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MAX)
}

/// Calcola le finestre in ordine cronologico, ognuna rispetto alla precedente
pub fn compute_windows(vaccinations: &[RabiesVaccination]) -> Vec<RabiesWindow> {
    let mut sorted = vaccinations.to_vec();
    sorted.sort_by_key(|v| (v.administered_on, v.record_id));

    let mut windows: Vec<RabiesWindow> = Vec::with_capacity(sorted.len());
    for vaccination in sorted {
        let booster = windows
            .last()
            .is_some_and(|previous| previous.covers(vaccination.administered_on));
        let valid_from = if booster {
            vaccination.administered_on
        } else {
            vaccination
                .administered_on
                .checked_add_days(Days::new(PRIMARY_WAIT_DAYS))
                .unwrap_or(NaiveDate::MAX)
        };
        windows.push(RabiesWindow {
            record_id: vaccination.record_id,
            administered_on: vaccination.administered_on,
            valid_from,
            valid_until: expiry(vaccination.administered_on, vaccination.validity_years),
            booster,
        });
    }
    windows
}

/// Finestre costruite direttamente dai record del pet
pub fn windows_from_records(records: &[Record]) -> Vec<RabiesWindow> {
    let vaccinations: Vec<RabiesVaccination> = records
        .iter()
        .filter_map(RabiesVaccination::from_record)
        .collect();
    compute_windows(&vaccinations)
}

/// La finestra che copre `date`; se più di una, quella che scade più tardi
pub fn window_covering(windows: &[RabiesWindow], date: NaiveDate) -> Option<&RabiesWindow> {
    windows
        .iter()
        .filter(|w| w.covers(date))
        .max_by_key(|w| w.valid_until)
}

/// Stato della copertura antirabbica al giorno `date`.
/// Le vaccinazioni somministrate dopo `date` sono ignorate.
pub fn status_on(windows: &[RabiesWindow], date: NaiveDate) -> RabiesStatus {
    if let Some(window) = window_covering(windows, date) {
        return RabiesStatus::Valid {
            record_id: window.record_id,
            valid_from: window.valid_from,
            valid_until: window.valid_until,
        };
    }

    let administered: Vec<&RabiesWindow> = windows
        .iter()
        .filter(|w| w.administered_on <= date)
        .collect();

    if let Some(pending) = administered.iter().find(|w| w.valid_from > date) {
        return RabiesStatus::NotYetValid {
            record_id: pending.record_id,
            valid_from: pending.valid_from,
        };
    }

    match administered.iter().max_by_key(|w| w.valid_until) {
        Some(last) => RabiesStatus::Expired {
            record_id: last.record_id,
            expired_on: last.valid_until,
        },
        None => RabiesStatus::NotVaccinated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vaccination(record_id: i32, on: NaiveDate, years: u32) -> RabiesVaccination {
        RabiesVaccination {
            record_id,
            administered_on: on,
            validity_years: years,
        }
    }

    #[test]
    fn test_primary_vaccination_waits_21_days() {
        let windows = compute_windows(&[vaccination(1, date(2025, 3, 1), 3)]);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].valid_from, date(2025, 3, 22));
        assert_eq!(windows[0].valid_until, date(2028, 3, 1));
        assert!(!windows[0].booster);
    }

    #[test]
    fn test_booster_within_validity_is_immediate() {
        let windows = compute_windows(&[
            vaccination(2, date(2026, 2, 20), 1),
            vaccination(1, date(2025, 3, 1), 1),
        ]);
        assert_eq!(windows[0].record_id, 1);
        assert!(windows[1].booster);
        assert_eq!(windows[1].valid_from, date(2026, 2, 20));
        assert_eq!(windows[1].valid_until, date(2027, 2, 20));
    }

    #[test]
    fn test_second_shot_during_wait_is_not_a_booster() {
        let windows = compute_windows(&[
            vaccination(1, date(2025, 3, 1), 1),
            vaccination(2, date(2025, 3, 5), 1),
        ]);
        assert!(!windows[1].booster);
        assert_eq!(windows[1].valid_from, date(2025, 3, 26));

        // cinque giorni dopo la prima vaccinazione il pet non è ancora coperto
        assert_eq!(
            status_on(&windows, date(2025, 3, 6)),
            RabiesStatus::NotYetValid {
                record_id: 1,
                valid_from: date(2025, 3, 22)
            }
        );
        assert!(matches!(
            status_on(&windows, date(2025, 3, 22)),
            RabiesStatus::Valid { record_id: 1, .. }
        ));
    }

    #[test]
    fn test_lapsed_booster_restarts_wait() {
        let windows = compute_windows(&[
            vaccination(1, date(2024, 1, 10), 1),
            vaccination(2, date(2025, 2, 1), 1),
        ]);
        assert!(!windows[1].booster);
        assert_eq!(windows[1].valid_from, date(2025, 2, 22));
    }

    #[test]
    fn test_leap_day_expiry_is_clamped() {
        let windows = compute_windows(&[vaccination(1, date(2024, 2, 29), 1)]);
        assert_eq!(windows[0].valid_until, date(2025, 2, 28));
    }

    #[test]
    fn test_status_transitions() {
        let windows = compute_windows(&[vaccination(7, date(2025, 3, 1), 1)]);

        assert_eq!(status_on(&windows, date(2025, 2, 1)), RabiesStatus::NotVaccinated);
        assert_eq!(
            status_on(&windows, date(2025, 3, 10)),
            RabiesStatus::NotYetValid {
                record_id: 7,
                valid_from: date(2025, 3, 22)
            }
        );
        assert_eq!(
            status_on(&windows, date(2025, 3, 22)),
            RabiesStatus::Valid {
                record_id: 7,
                valid_from: date(2025, 3, 22),
                valid_until: date(2026, 3, 1)
            }
        );
        assert_eq!(
            status_on(&windows, date(2026, 3, 2)),
            RabiesStatus::Expired {
                record_id: 7,
                expired_on: date(2026, 3, 1)
            }
        );
    }

    #[test]
    fn test_status_with_no_windows() {
        assert_eq!(status_on(&[], date(2025, 1, 1)), RabiesStatus::NotVaccinated);
    }

    #[test]
    fn test_covering_window_prefers_latest_expiry() {
        let windows = compute_windows(&[
            vaccination(1, date(2025, 1, 1), 1),
            vaccination(2, date(2025, 6, 1), 3),
        ]);
        let covering = window_covering(&windows, date(2025, 7, 1)).unwrap();
        assert_eq!(covering.record_id, 2);
    }
}
