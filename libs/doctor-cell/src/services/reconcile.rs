//! Pure schedule reconciliation.
//!
//! The editor keeps two books: `current`, everything the user sees and edits,
//! and `confirmed`, what the server last acknowledged. Every change goes through
//! [`reduce`]; deciding what a save sends is [`plan_save`]. Nothing here performs I/O.

use chrono::NaiveDate;

use shared_models::error::AppError;

use crate::models::{DaySummary, NewScheduleRecord, ScheduleBook, ScheduleDate, TimeRange};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleState {
    pub current: ScheduleBook,
    pub confirmed: ScheduleBook,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleAction {
    /// Replace both books with a freshly fetched schedule.
    Load(ScheduleBook),
    Add {
        date: ScheduleDate,
        range: TimeRange,
    },
    Remove { date: ScheduleDate, index: usize },
    /// The server accepted `ranges` for `date`.
    Confirm {
        date: ScheduleDate,
        ranges: Vec<TimeRange>,
    },
    /// The server deleted the schedule for `date`.
    Forget { date: ScheduleDate },
    /// Drop the working copy, keeping the confirmed baseline.
    ClearCurrent,
}

/// Apply `action` to `state`. Rejected actions leave the input untouched.
pub fn reduce(state: &ScheduleState, action: ScheduleAction) -> Result<ScheduleState, AppError> {
    let mut next = state.clone();

    match action {
        ScheduleAction::Load(book) => {
            next.current = book.clone();
            next.confirmed = book;
        }
        ScheduleAction::Add { date, range } => {
            if next.current.ranges(&date).contains(&range) {
                return Err(AppError::Validation(format!(
                    "Time range {} already exists on {}",
                    range, date
                )));
            }
            next.current.push(date, range);
        }
        ScheduleAction::Remove { date, index } => {
            if next.current.remove_at(&date, index).is_none() {
                return Err(AppError::Validation(format!(
                    "No time range at position {} on {}",
                    index, date
                )));
            }
        }
        ScheduleAction::Confirm { date, ranges } => {
            next.current.set(date, ranges.clone());
            next.confirmed.set(date, ranges);
        }
        ScheduleAction::Forget { date } => {
            next.current.remove_date(&date);
            next.confirmed.remove_date(&date);
        }
        ScheduleAction::ClearCurrent => {
            next.current = ScheduleBook::new();
        }
    }

    Ok(next)
}

/// Ranges in `current` with no textually equal counterpart in `confirmed`.
pub fn new_ranges(current: &[TimeRange], confirmed: &[TimeRange]) -> Vec<TimeRange> {
    current
        .iter()
        .filter(|range| !confirmed.contains(range))
        .cloned()
        .collect()
}

/// Full list a save sends for `date`: confirmed ranges followed by the new ones.
pub fn outgoing_ranges(state: &ScheduleState, date: &ScheduleDate) -> Vec<TimeRange> {
    let confirmed = state.confirmed.ranges(date);
    let mut outgoing = confirmed.to_vec();
    outgoing.extend(new_ranges(state.current.ranges(date), confirmed));
    outgoing
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavePlan {
    Create {
        date: ScheduleDate,
        ranges: Vec<TimeRange>,
    },
    Update {
        date: ScheduleDate,
        ranges: Vec<TimeRange>,
    },
}

impl SavePlan {
    pub fn date(&self) -> ScheduleDate {
        match self {
            SavePlan::Create { date, .. } | SavePlan::Update { date, .. } => *date,
        }
    }

    pub fn ranges(&self) -> &[TimeRange] {
        match self {
            SavePlan::Create { ranges, .. } | SavePlan::Update { ranges, .. } => ranges,
        }
    }

    /// `HH:mm-HH:mm` strings as the API stores them.
    pub fn wire_times(&self) -> Vec<String> {
        self.ranges().iter().map(TimeRange::to_wire).collect()
    }

    pub fn records(&self) -> Vec<NewScheduleRecord> {
        vec![NewScheduleRecord::new(&self.date(), self.ranges())]
    }
}

/// Decide what saving `date` should send. Only that one date is reconciled.
pub fn plan_save(state: &ScheduleState, date: Option<&ScheduleDate>) -> Result<SavePlan, AppError> {
    if state.current.is_empty() {
        return Err(AppError::Validation(
            "Please choose at least one date and time range".to_string(),
        ));
    }

    let date = date.ok_or_else(|| {
        AppError::Validation("Please select the date to save".to_string())
    })?;

    let ranges = outgoing_ranges(state, date);
    if ranges.is_empty() {
        return Err(AppError::Validation(format!("No new schedule to save for {}", date)));
    }

    if state.confirmed.contains(date) {
        Ok(SavePlan::Update {
            date: *date,
            ranges,
        })
    } else {
        Ok(SavePlan::Create {
            date: *date,
            ranges,
        })
    }
}

/// Dates on or after `today`, latest first.
pub fn upcoming(book: &ScheduleBook, today: NaiveDate) -> Vec<DaySummary> {
    let mut days: Vec<DaySummary> = book
        .iter()
        .filter(|(date, _)| date.date() >= today)
        .map(|(date, ranges)| DaySummary {
            date: *date,
            ranges: ranges.clone(),
        })
        .collect();

    days.sort_by(|a, b| b.date.cmp(&a.date));
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn day(d: u32) -> ScheduleDate {
        ScheduleDate::from_ymd(2024, 5, d).unwrap()
    }

    fn range(start: &str, end: &str) -> TimeRange {
        TimeRange::new(start, end)
    }

    type Days = [(ScheduleDate, Vec<TimeRange>)];

    fn state_with(current: &Days, confirmed: &Days) -> ScheduleState {
        ScheduleState {
            current: current.iter().cloned().collect(),
            confirmed: confirmed.iter().cloned().collect(),
        }
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let state = state_with(&[(day(2), vec![range("08:00", "10:00")])], &[]);

        let duplicate = ScheduleAction::Add {
            date: day(2),
            range: range("08:00", "10:00"),
        };
        let result = reduce(&state, duplicate);
        assert_matches!(result, Err(AppError::Validation(_)));
        assert_eq!(state.current.ranges(&day(2)).len(), 1);

        let later = ScheduleAction::Add {
            date: day(2),
            range: range("10:00", "12:00"),
        };
        let next = reduce(&state, later).unwrap();
        assert_eq!(next.current.ranges(&day(2)).len(), 2);
    }

    #[test]
    fn test_add_creates_missing_date() {
        let next = reduce(
            &ScheduleState::default(),
            ScheduleAction::Add {
                date: day(6),
                range: range("14:00", "15:00"),
            },
        )
        .unwrap();
        assert_eq!(next.current.ranges(&day(6)), &[range("14:00", "15:00")]);
        assert!(next.confirmed.is_empty());
    }

    #[test]
    fn test_removing_last_range_drops_date() {
        let saved = [(day(2), vec![range("08:00", "10:00")])];
        let state = state_with(&saved, &saved);

        let remove = ScheduleAction::Remove {
            date: day(2),
            index: 0,
        };
        let next = reduce(&state, remove).unwrap();
        assert!(!next.current.contains(&day(2)));
        // Removal is local until the next save
        assert!(next.confirmed.contains(&day(2)));

        assert_matches!(
            reduce(
                &state,
                ScheduleAction::Remove {
                    date: day(9),
                    index: 0
                }
            ),
            Err(AppError::Validation(_))
        );
    }

    #[test]
    fn test_save_diff_does_not_repeat_confirmed_ranges() {
        let a = range("08:00", "10:00");
        let b = range("13:00", "15:00");
        let state = state_with(
            &[(day(2), vec![a.clone(), b.clone()])],
            &[(day(2), vec![a.clone()])],
        );

        let plan = plan_save(&state, Some(&day(2))).unwrap();
        assert_eq!(
            plan,
            SavePlan::Update {
                date: day(2),
                ranges: vec![a, b]
            }
        );
        assert_eq!(plan.wire_times(), vec!["08:00-10:00", "13:00-15:00"]);
    }

    #[test]
    fn test_save_unknown_date_is_create() {
        let state = state_with(
            &[(day(3), vec![range("08:00", "09:00")])],
            &[(day(2), vec![range("08:00", "09:00")])],
        );

        let plan = plan_save(&state, Some(&day(3))).unwrap();
        assert_matches!(plan, SavePlan::Create { .. });
        assert_eq!(plan.records()[0].date, "03-05-2024");
    }

    #[test]
    fn test_save_keeps_confirmed_ranges_removed_locally() {
        let a = range("08:00", "10:00");
        let b = range("13:00", "15:00");
        let state = state_with(&[(day(2), vec![b.clone()])], &[(day(2), vec![a.clone()])]);

        let plan = plan_save(&state, Some(&day(2))).unwrap();
        assert_eq!(plan.ranges(), &[a, b]);
    }

    #[test]
    fn test_save_validation() {
        assert_matches!(
            plan_save(&ScheduleState::default(), Some(&day(2))),
            Err(AppError::Validation(_))
        );

        let state = state_with(&[(day(2), vec![range("08:00", "09:00")])], &[]);
        assert_matches!(plan_save(&state, None), Err(AppError::Validation(_)));
        assert_matches!(
            plan_save(&state, Some(&day(5))),
            Err(AppError::Validation(msg)) if msg.contains("05-05-2024")
        );
    }

    #[test]
    fn test_confirm_syncs_both_books() {
        let ranges = vec![range("08:00", "09:00"), range("10:00", "11:00")];
        let confirm = ScheduleAction::Confirm {
            date: day(4),
            ranges: ranges.clone(),
        };
        let next = reduce(&ScheduleState::default(), confirm).unwrap();
        assert_eq!(next.current.ranges(&day(4)), ranges.as_slice());
        assert_eq!(next.confirmed.ranges(&day(4)), ranges.as_slice());
    }

    #[test]
    fn test_forget_and_clear() {
        let state = state_with(
            &[(day(2), vec![range("08:00", "09:00")]), (day(3), vec![range("08:00", "09:00")])],
            &[(day(2), vec![range("08:00", "09:00")])],
        );

        let forgotten = reduce(&state, ScheduleAction::Forget { date: day(2) }).unwrap();
        assert!(!forgotten.current.contains(&day(2)));
        assert!(forgotten.confirmed.is_empty());
        assert!(forgotten.current.contains(&day(3)));

        let cleared = reduce(&state, ScheduleAction::ClearCurrent).unwrap();
        assert!(cleared.current.is_empty());
        assert_eq!(cleared.confirmed, state.confirmed);
    }

    #[test]
    fn test_upcoming_filters_past_and_sorts_descending() {
        let book: ScheduleBook = vec![
            (ScheduleDate::from_ymd(2024, 4, 30).unwrap(), vec![range("08:00", "09:00")]),
            (day(1), vec![range("08:00", "09:00")]),
            (ScheduleDate::from_ymd(2024, 6, 2).unwrap(), vec![range("08:00", "09:00")]),
            (day(20), vec![range("08:00", "09:00")]),
        ]
        .into_iter()
        .collect();

        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let dates: Vec<String> = upcoming(&book, today).iter().map(|d| d.date.key()).collect();
        assert_eq!(dates, vec!["02-06-2024", "20-05-2024", "01-05-2024"]);
    }
}
