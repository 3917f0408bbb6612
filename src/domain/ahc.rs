//! Idoneità al rilascio di un Animal Health Certificate (AHC)
//!
//! Tutti i requisiti vengono valutati e ogni violazione viene riportata, così il vet
//! vede in un colpo solo cosa manca.

use super::rabies::{RabiesWindow, window_covering};
use crate::entities::Pet;
use chrono::{Days, Months, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Giorni massimi tra rilascio del certificato e viaggio
pub const ISSUE_TO_TRAVEL_MAX_DAYS: u64 = 10;
/// Età minima del pet al momento della vaccinazione antirabbica
pub const MIN_AGE_AT_VACCINATION_WEEKS: u64 = 12;
/// Validità per gli spostamenti successivi all'ingresso
pub const ONWARD_TRAVEL_MONTHS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ineligibility {
    MissingMicrochip,
    MicrochipAfterVaccination {
        implanted_on: Option<NaiveDate>,
        vaccinated_on: NaiveDate,
    },
    TooYoungAtVaccination {
        age_in_days: i64,
    },
    NoRabiesVaccination,
    RabiesNotYetValid {
        valid_from: NaiveDate,
    },
    RabiesExpired {
        expired_on: NaiveDate,
    },
    TravelOutsideIssueWindow {
        issue_date: NaiveDate,
        travel_date: NaiveDate,
    },
    IssueDateInPast {
        issue_date: NaiveDate,
        today: NaiveDate,
    },
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::MissingMicrochip => write!(f, "pet has no microchip"),
            Ineligibility::MicrochipAfterVaccination {
                implanted_on: Some(implanted_on),
                vaccinated_on,
            } => write!(
                f,
                "microchip implanted on {implanted_on}, after rabies vaccination on {vaccinated_on}"
            ),
            Ineligibility::MicrochipAfterVaccination {
                implanted_on: None,
                vaccinated_on,
            } => write!(
                f,
                "microchip implant date unknown, cannot prove it precedes vaccination on {vaccinated_on}"
            ),
            Ineligibility::TooYoungAtVaccination { age_in_days } => write!(
                f,
                "pet was {age_in_days} days old at vaccination, minimum is {} weeks",
                MIN_AGE_AT_VACCINATION_WEEKS
            ),
            Ineligibility::NoRabiesVaccination => write!(f, "no signed rabies vaccination on file"),
            Ineligibility::RabiesNotYetValid { valid_from } => {
                write!(f, "rabies vaccination only valid from {valid_from}")
            }
            Ineligibility::RabiesExpired { expired_on } => {
                write!(f, "rabies vaccination expired on {expired_on}")
            }
            Ineligibility::TravelOutsideIssueWindow {
                issue_date,
                travel_date,
            } => write!(
                f,
                "travel date {travel_date} must be within {} days after issue date {issue_date}",
                ISSUE_TO_TRAVEL_MAX_DAYS
            ),
            Ineligibility::IssueDateInPast { issue_date, today } => {
                write!(f, "issue date {issue_date} is before today ({today})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AhcAssessment {
    pub eligible: bool,
    pub issue_date: NaiveDate,
    pub travel_date: NaiveDate,
    pub reasons: Vec<Ineligibility>,
    /// Vaccinazione su cui si basa il certificato
    pub rabies: Option<RabiesWindow>,
    pub entry_valid_until: Option<NaiveDate>,
    pub onward_valid_until: Option<NaiveDate>,
}

impl AhcAssessment {
    /// Motivi in forma leggibile, separati da "; "
    pub fn reasons_summary(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Sceglie la vaccinazione di riferimento: quella che copre la data del viaggio,
/// altrimenti l'ultima somministrata entro quella data, altrimenti la prima futura.
fn reference_window(windows: &[RabiesWindow], travel_date: NaiveDate) -> Option<&RabiesWindow> {
    window_covering(windows, travel_date)
        .or_else(|| {
            windows
                .iter()
                .filter(|w| w.administered_on <= travel_date)
                .max_by_key(|w| w.administered_on)
        })
        .or_else(|| windows.iter().min_by_key(|w| w.administered_on))
}

pub fn assess(
    pet: &Pet,
    windows: &[RabiesWindow],
    issue_date: NaiveDate,
    travel_date: NaiveDate,
    today: NaiveDate,
) -> AhcAssessment {
    let mut reasons = Vec::new();

    if pet.microchip_number.is_none() {
        reasons.push(Ineligibility::MissingMicrochip);
    }

    let rabies = reference_window(windows, travel_date).copied();
    match rabies {
        None => reasons.push(Ineligibility::NoRabiesVaccination),
        Some(window) => {
            if pet.microchip_number.is_some() {
                let chipped_before = pet
                    .microchip_implanted_on
                    .is_some_and(|implanted| implanted <= window.administered_on);
                if !chipped_before {
                    reasons.push(Ineligibility::MicrochipAfterVaccination {
                        implanted_on: pet.microchip_implanted_on,
                        vaccinated_on: window.administered_on,
                    });
                }
            }

            let min_age = pet
                .date_of_birth
                .checked_add_days(Days::new(MIN_AGE_AT_VACCINATION_WEEKS * 7))
                .unwrap_or(NaiveDate::MAX);
            if window.administered_on < min_age {
                reasons.push(Ineligibility::TooYoungAtVaccination {
                    age_in_days: (window.administered_on - pet.date_of_birth).num_days(),
                });
            }

            if travel_date < window.valid_from {
                reasons.push(Ineligibility::RabiesNotYetValid {
                    valid_from: window.valid_from,
                });
            } else if travel_date > window.valid_until {
                reasons.push(Ineligibility::RabiesExpired {
                    expired_on: window.valid_until,
                });
            }
        }
    }

    let entry_limit = issue_date
        .checked_add_days(Days::new(ISSUE_TO_TRAVEL_MAX_DAYS))
        .unwrap_or(NaiveDate::MAX);
    if travel_date < issue_date || travel_date > entry_limit {
        reasons.push(Ineligibility::TravelOutsideIssueWindow {
            issue_date,
            travel_date,
        });
    }

    if issue_date < today {
        reasons.push(Ineligibility::IssueDateInPast { issue_date, today });
    }

    let eligible = reasons.is_empty();
    let (entry_valid_until, onward_valid_until) = match (eligible, rabies) {
        (true, Some(window)) => {
            let onward = travel_date
                .checked_add_months(Months::new(ONWARD_TRAVEL_MONTHS))
                .unwrap_or(NaiveDate::MAX)
                .min(window.valid_until);
            (Some(entry_limit), Some(onward))
        }
        _ => (None, None),
    };

    AhcAssessment {
        eligible,
        issue_date,
        travel_date,
        reasons,
        rabies,
        entry_valid_until,
        onward_valid_until,
    }
}
