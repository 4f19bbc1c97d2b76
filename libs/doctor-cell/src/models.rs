use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use shared_models::auth::AuthState;
use shared_models::error::AppError;
use shared_utils::time::{format_date_key, parse_date_key, TIME_OF_DAY_FORMAT};

/// Opaque identifier of the signed-in doctor whose schedule is being edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier of the signed-in user, if anyone is signed in.
    pub fn from_auth(auth: &AuthState) -> Option<Self> {
        auth.user_id().map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Calendar day a schedule belongs to. Travels as `DD-MM-YYYY`, orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleDate(NaiveDate);

impl ScheduleDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn key(&self) -> String {
        format_date_key(self.0)
    }
}

impl fmt::Display for ScheduleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for ScheduleDate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_date_key(s)
            .map(Self)
            .ok_or_else(|| AppError::Validation(format!("Invalid schedule date: {}", s)))
    }
}

impl TryFrom<String> for ScheduleDate {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScheduleDate> for String {
    fn from(date: ScheduleDate) -> Self {
        date.key()
    }
}

impl From<NaiveDate> for ScheduleDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// A `(start, end)` availability slot as formatted `HH:mm` strings.
///
/// Equality is plain string equality: `09:00` and `9:00` are different ranges.
/// Ordering of `start` and `end` is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse the wire form `HH:mm-HH:mm`.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.split_once('-') {
            Some((start, end)) if !start.trim().is_empty() && !end.trim().is_empty() => {
                Ok(Self::new(start.trim(), end.trim()))
            }
            _ => Err(AppError::Validation(format!("Invalid time range: {}", raw))),
        }
    }

    pub fn to_wire(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }

    /// `Some(true)` when both ends parse and start precedes end.
    pub fn is_ordered(&self) -> Option<bool> {
        let start = NaiveTime::parse_from_str(&self.start, TIME_OF_DAY_FORMAT).ok()?;
        let end = NaiveTime::parse_from_str(&self.end, TIME_OF_DAY_FORMAT).ok()?;
        Some(start < end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl TryFrom<String> for TimeRange {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.to_wire()
    }
}

/// Date-keyed time ranges. A date present in the book always has at least one range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleBook {
    days: BTreeMap<ScheduleDate, Vec<TimeRange>>,
}

impl ScheduleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn contains(&self, date: &ScheduleDate) -> bool {
        self.days.contains_key(date)
    }

    /// Ranges for `date`, empty when the date has none.
    pub fn ranges(&self, date: &ScheduleDate) -> &[TimeRange] {
        self.days.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the ranges for `date`. An empty list drops the date.
    pub fn set(&mut self, date: ScheduleDate, ranges: Vec<TimeRange>) {
        if ranges.is_empty() {
            self.days.remove(&date);
        } else {
            self.days.insert(date, ranges);
        }
    }

    pub fn push(&mut self, date: ScheduleDate, range: TimeRange) {
        self.days.entry(date).or_default().push(range);
    }

    /// Remove the range at `index`, dropping the date once it has no ranges left.
    pub fn remove_at(&mut self, date: &ScheduleDate, index: usize) -> Option<TimeRange> {
        let ranges = self.days.get_mut(date)?;
        if index >= ranges.len() {
            return None;
        }
        let removed = ranges.remove(index);
        if ranges.is_empty() {
            self.days.remove(date);
        }
        Some(removed)
    }

    pub fn remove_date(&mut self, date: &ScheduleDate) -> Option<Vec<TimeRange>> {
        self.days.remove(date)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ScheduleDate, &Vec<TimeRange>)> {
        self.days.iter()
    }

    /// Rebuild a book from fetched records. Unparseable entries are skipped,
    /// a repeated date keeps its last record.
    pub fn from_records(records: &[FetchedSchedule]) -> Self {
        let mut book = Self::new();

        for record in records {
            let date = match record.date.parse::<ScheduleDate>() {
                Ok(date) => date,
                Err(e) => {
                    warn!("Skipping fetched schedule {:?}: {}", record.id, e);
                    continue;
                }
            };

            let ranges = record
                .time
                .iter()
                .filter_map(|raw| match TimeRange::parse(raw) {
                    Ok(range) => Some(range),
                    Err(e) => {
                        warn!("Skipping time slot on {}: {}", record.date, e);
                        None
                    }
                })
                .collect();

            book.set(date, ranges);
        }

        book
    }
}

impl FromIterator<(ScheduleDate, Vec<TimeRange>)> for ScheduleBook {
    fn from_iter<I: IntoIterator<Item = (ScheduleDate, Vec<TimeRange>)>>(iter: I) -> Self {
        let mut book = Self::new();
        for (date, ranges) in iter {
            book.set(date, ranges);
        }
        book
    }
}

/// Persistence identifier of a stored schedule. Accepts string or numeric ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawScheduleId")]
pub struct ScheduleId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScheduleId {
    Text(String),
    Number(i64),
}

impl From<RawScheduleId> for ScheduleId {
    fn from(raw: RawScheduleId) -> Self {
        match raw {
            RawScheduleId::Text(text) => Self(text),
            RawScheduleId::Number(number) => Self(number.to_string()),
        }
    }
}

impl ScheduleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A schedule as stored remotely: one record per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedSchedule {
    #[serde(default)]
    pub id: Option<ScheduleId>,
    pub date: String,
    #[serde(default)]
    pub time: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScheduleRecord {
    pub date: String,
    pub time: Vec<String>,
}

impl NewScheduleRecord {
    pub fn new(date: &ScheduleDate, ranges: &[TimeRange]) -> Self {
        Self {
            date: date.key(),
            time: ranges.iter().map(TimeRange::to_wire).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateScheduleRequest {
    pub time: Vec<String>,
}

/// Status wrapper some endpoints answer with instead of a bare payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope {
    #[serde(default)]
    pub is_success: Option<bool>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// Turn an explicit `isSuccess: false` into an error.
    pub fn check(&self) -> Result<(), AppError> {
        if self.is_success != Some(false) {
            return Ok(());
        }

        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "request was not successful".to_string());

        Err(match self.status_code {
            Some(404) => AppError::NotFound(message),
            Some(401) | Some(403) => AppError::Auth(message),
            Some(code) => AppError::ExternalService(format!("API error ({}): {}", code, message)),
            None => AppError::ExternalService(message),
        })
    }
}

/// Decode a schedule listing that may be a bare array or an envelope around one.
pub fn decode_schedule_list(body: Value) -> Result<Vec<FetchedSchedule>, AppError> {
    match body {
        Value::Array(_) => Ok(serde_json::from_value(body)?),
        Value::Object(_) => {
            let envelope: ApiEnvelope = serde_json::from_value(body)?;
            envelope.check()?;
            match envelope.data {
                Some(data @ Value::Array(_)) => Ok(serde_json::from_value(data)?),
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(other) => Err(AppError::Internal(format!(
                    "Unexpected schedule payload: {}",
                    other
                ))),
            }
        }
        Value::Null => Ok(Vec::new()),
        other => Err(AppError::Internal(format!("Unexpected schedule payload: {}", other))),
    }
}

/// One line of the upcoming-schedule summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: ScheduleDate,
    pub ranges: Vec<TimeRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient message surfaced to the user after an editor action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
