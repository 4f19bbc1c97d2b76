use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::time::{system_clock, time_of_day_in, today_in, Clock, TIME_OF_DAY_FORMAT};

use crate::models::{
    DaySummary, EmployeeId, FetchedSchedule, Notice, ScheduleBook, ScheduleDate, ScheduleId,
    TimeRange,
};
use crate::services::reconcile::{self, SavePlan, ScheduleAction, ScheduleState};
use crate::services::schedule::{ScheduleApi, ScheduleService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Closed,
    Loading,
    Idle,
    Saving,
}

/// How an asynchronous editor action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorOutcome {
    /// Schedules loaded (or none exist yet); the editor is editable.
    Ready,
    /// Save reached the server; the caller may close the editor.
    Completed,
    Deleted,
    Cancelled,
    /// Nothing was sent: a selection was missing or invalid.
    Rejected,
    /// The remote call failed; local state is unchanged.
    Failed,
    /// The session was closed before the result arrived; it was discarded.
    Abandoned,
}

/// Time range being picked, not yet added to the schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl CandidateRange {
    /// Picked instants read as wall-clock times in `tz`.
    pub fn from_instants<Z: TimeZone>(
        start: Option<DateTime<Z>>,
        end: Option<DateTime<Z>>,
        tz: Tz,
    ) -> Self {
        Self {
            start: start.map(|instant| time_of_day_in(&instant, tz)),
            end: end.map(|instant| time_of_day_in(&instant, tz)),
        }
    }

    pub fn from_wall_times(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        Self {
            start: start.map(|t| t.format(TIME_OF_DAY_FORMAT).to_string()),
            end: end.map(|t| t.format(TIME_OF_DAY_FORMAT).to_string()),
        }
    }

    pub fn complete(&self) -> Option<TimeRange> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some(TimeRange::new(start.clone(), end.clone())),
            _ => None,
        }
    }
}

/// A pending delete the user still has to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub schedule_id: ScheduleId,
    pub date: ScheduleDate,
    pub prompt: String,
}

/// Work-schedule editor for one signed-in doctor.
///
/// Local edits only touch the working copy; the server is reconciled per date on
/// [`ScheduleEditor::save`]. Every remote result is applied only while the
/// session token is still live, so closing the editor mid-request discards it.
pub struct ScheduleEditor {
    api: Arc<dyn ScheduleApi>,
    clock: Arc<dyn Clock>,
    tz: Tz,
    phase: EditorPhase,
    employee_id: Option<EmployeeId>,
    active_date: Option<ScheduleDate>,
    candidate: Option<CandidateRange>,
    state: ScheduleState,
    fetched: Vec<FetchedSchedule>,
    notices: Vec<Notice>,
    session: CancellationToken,
}

impl ScheduleEditor {
    pub fn new(api: Arc<dyn ScheduleApi>, config: &AppConfig) -> Result<Self, AppError> {
        let tz = config.clinic_tz().map_err(AppError::Config)?;

        Ok(Self {
            api,
            clock: system_clock(),
            tz,
            phase: EditorPhase::Closed,
            employee_id: None,
            active_date: None,
            candidate: None,
            state: ScheduleState::default(),
            fetched: Vec::new(),
            notices: Vec::new(),
            session: CancellationToken::new(),
        })
    }

    /// Editor talking to the REST schedule API named in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(Arc::new(ScheduleService::new(config)), config)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn active_date(&self) -> Option<ScheduleDate> {
        self.active_date
    }

    pub fn candidate(&self) -> Option<&CandidateRange> {
        self.candidate.as_ref()
    }

    pub fn fetched_records(&self) -> &[FetchedSchedule] {
        &self.fetched
    }

    /// Token of the current session. Cancelling it abandons any in-flight request.
    pub fn session_token(&self) -> CancellationToken {
        self.session.clone()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn today(&self) -> NaiveDate {
        today_in(self.clock.as_ref(), self.tz)
    }

    /// Days before today (clinic time) cannot be picked.
    pub fn is_date_selectable(&self, date: &ScheduleDate) -> bool {
        date.date() >= self.today()
    }

    /// Ranges of the active date, as listed under the time picker.
    pub fn pending_ranges(&self) -> &[TimeRange] {
        match &self.active_date {
            Some(date) => self.state.current.ranges(date),
            None => &[],
        }
    }

    /// Upcoming days of the working copy, latest first.
    pub fn summary(&self) -> Vec<DaySummary> {
        reconcile::upcoming(&self.state.current, self.today())
    }

    /// Load every schedule of `employee_id` and make the editor editable.
    pub async fn open(&mut self, employee_id: EmployeeId) -> EditorOutcome {
        if self.session.is_cancelled() {
            self.session = CancellationToken::new();
        }

        info!("Opening schedule editor for doctor {}", employee_id);
        self.phase = EditorPhase::Loading;
        self.employee_id = Some(employee_id.clone());
        self.active_date = None;
        self.candidate = None;
        self.state = ScheduleState::default();
        self.fetched.clear();

        let api = Arc::clone(&self.api);
        let Some(result) = self.guarded(api.get_schedules(&employee_id)).await else {
            return self.abandon("load");
        };

        let (book, records) = match result {
            Ok(records) => (ScheduleBook::from_records(&records), records),
            Err(e) if e.is_not_found() => {
                info!("Doctor {} has no schedule yet", employee_id);
                self.notices.push(Notice::info("You have not created a work schedule yet"));
                (ScheduleBook::new(), Vec::new())
            }
            Err(e) => {
                error!("Failed to load schedules for {}: {}", employee_id, e);
                self.notices
                    .push(Notice::error(format!("Failed to load work schedule: {}", e)));
                self.employee_id = None;
                self.phase = EditorPhase::Closed;
                return EditorOutcome::Failed;
            }
        };

        debug!("Loaded {} scheduled days", book.len());
        match reconcile::reduce(&self.state, ScheduleAction::Load(book)) {
            Ok(next) => self.state = next,
            Err(e) => warn!("Could not load fetched schedules: {}", e),
        }
        self.fetched = records;

        self.phase = EditorPhase::Idle;
        EditorOutcome::Ready
    }

    /// Make `date` active, dropping any half-picked time range.
    pub fn select_date(&mut self, date: ScheduleDate) -> Result<(), AppError> {
        self.ensure_idle()?;

        if !self.is_date_selectable(&date) {
            return Err(self.reject(AppError::Validation(format!(
                "{} is in the past and cannot be scheduled",
                date
            ))));
        }

        self.active_date = Some(date);
        self.candidate = None;
        Ok(())
    }

    /// Record picked instants as the candidate range, in clinic wall-clock time.
    pub fn select_time_range<Z: TimeZone>(
        &mut self,
        start: Option<DateTime<Z>>,
        end: Option<DateTime<Z>>,
    ) -> Result<(), AppError> {
        self.ensure_idle()?;

        self.candidate = Some(CandidateRange::from_instants(start, end, self.tz));
        Ok(())
    }

    /// Record already-local wall-clock times as the candidate range.
    pub fn select_wall_times(
        &mut self,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Result<(), AppError> {
        self.ensure_idle()?;

        self.candidate = Some(CandidateRange::from_wall_times(start, end));
        Ok(())
    }

    /// Append the candidate range to the active date.
    pub fn add_range(&mut self) -> Result<(), AppError> {
        self.ensure_idle()?;

        let Some(range) = self.candidate.as_ref().and_then(CandidateRange::complete) else {
            return Err(self.reject(AppError::Validation(
                "Please select a valid time range".to_string(),
            )));
        };

        let Some(date) = self.active_date else {
            return Err(self.reject(AppError::Validation(
                "Please select a date first".to_string(),
            )));
        };

        match reconcile::reduce(&self.state, ScheduleAction::Add { date, range }) {
            Ok(next) => {
                self.state = next;
                self.candidate = None;
                Ok(())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Drop one range from the working copy. Nothing is sent until the next save.
    pub fn remove_range(&mut self, date: ScheduleDate, index: usize) -> Result<(), AppError> {
        self.ensure_idle()?;

        match reconcile::reduce(&self.state, ScheduleAction::Remove { date, index }) {
            Ok(next) => {
                self.state = next;
                Ok(())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Push the active date to the server, creating or updating its schedule.
    pub async fn save(&mut self) -> EditorOutcome {
        if self.ensure_idle().is_err() {
            return EditorOutcome::Rejected;
        }

        let plan = match reconcile::plan_save(&self.state, self.active_date.as_ref()) {
            Ok(plan) => plan,
            Err(e) => {
                self.reject(e);
                return EditorOutcome::Rejected;
            }
        };

        let Some(employee_id) = self.employee_id.clone() else {
            self.reject(AppError::Validation(
                "No signed-in doctor for this schedule".to_string(),
            ));
            return EditorOutcome::Rejected;
        };

        self.phase = EditorPhase::Saving;
        debug!("Saving schedule plan {:?}", plan);

        let api = Arc::clone(&self.api);
        let call = async {
            match &plan {
                SavePlan::Create { .. } => {
                    api.create_schedules(&employee_id, &plan.records()).await
                }
                SavePlan::Update { date, .. } => {
                    api.update_schedule(&employee_id, date, &plan.wire_times()).await
                }
            }
        };

        let Some(result) = self.guarded(call).await else {
            return self.abandon("save");
        };

        self.phase = EditorPhase::Idle;

        if let Err(e) = result {
            error!("Failed to save schedule {}: {}", plan.date(), e);
            self.notices.push(Notice::error(format!("Failed to save work schedule: {}", e)));
            return EditorOutcome::Failed;
        }

        let date = plan.date();
        let confirm = ScheduleAction::Confirm {
            date,
            ranges: plan.ranges().to_vec(),
        };
        match reconcile::reduce(&self.state, confirm) {
            Ok(next) => self.state = next,
            Err(e) => warn!("Could not record saved schedule {}: {}", date, e),
        }

        self.active_date = None;
        self.candidate = None;
        info!("Saved schedule {} for doctor {}", date, employee_id);
        self.notices.push(Notice::success("Work schedule saved"));
        EditorOutcome::Completed
    }

    /// Find the stored schedule of the active date and ask for confirmation.
    pub fn request_delete(&mut self) -> Option<DeleteConfirmation> {
        if self.ensure_idle().is_err() {
            return None;
        }

        let Some(date) = self.active_date else {
            self.notices.push(Notice::error("Please select the date to delete"));
            return None;
        };

        let key = date.key();
        let schedule_id = self
            .fetched
            .iter()
            .find(|record| record.date == key)
            .and_then(|record| record.id.clone());

        match schedule_id {
            Some(schedule_id) => Some(DeleteConfirmation {
                schedule_id,
                date,
                prompt: format!("Are you sure you want to delete the schedule for {}?", key),
            }),
            None => {
                warn!("No stored schedule for {}", key);
                self.notices.push(Notice::error("No saved work schedule found to delete"));
                None
            }
        }
    }

    /// Delete the confirmed schedule remotely, then forget it locally.
    pub async fn confirm_delete(&mut self, confirmation: DeleteConfirmation) -> EditorOutcome {
        if self.ensure_idle().is_err() {
            return EditorOutcome::Rejected;
        }

        let Some(employee_id) = self.employee_id.clone() else {
            self.reject(AppError::Validation(
                "No signed-in doctor for this schedule".to_string(),
            ));
            return EditorOutcome::Rejected;
        };

        self.phase = EditorPhase::Saving;

        let api = Arc::clone(&self.api);
        let Some(result) = self
            .guarded(api.delete_schedule(&confirmation.schedule_id, &employee_id))
            .await
        else {
            return self.abandon("delete");
        };

        self.phase = EditorPhase::Idle;

        if let Err(e) = result {
            error!("Failed to delete schedule {}: {}", confirmation.schedule_id, e);
            self.notices.push(Notice::error(format!("Failed to delete work schedule: {}", e)));
            return EditorOutcome::Failed;
        }

        let forget = ScheduleAction::Forget {
            date: confirmation.date,
        };
        match reconcile::reduce(&self.state, forget) {
            Ok(next) => self.state = next,
            Err(e) => warn!(
                "Could not forget deleted schedule {}: {}",
                confirmation.date, e
            ),
        }
        self.fetched
            .retain(|record| record.id.as_ref() != Some(&confirmation.schedule_id));

        info!("Deleted schedule {} for doctor {}", confirmation.date, employee_id);
        self.notices.push(Notice::success("Work schedule deleted"));
        EditorOutcome::Deleted
    }

    /// Discard the working copy and close. The confirmed baseline is kept until the next open.
    pub fn cancel(&mut self) -> EditorOutcome {
        self.active_date = None;
        self.candidate = None;
        match reconcile::reduce(&self.state, ScheduleAction::ClearCurrent) {
            Ok(next) => self.state = next,
            Err(e) => warn!("Could not clear working schedule: {}", e),
        }
        self.close();
        EditorOutcome::Cancelled
    }

    /// Close the session; results of requests still in flight are dropped.
    pub fn close(&mut self) {
        self.session.cancel();
        self.session = CancellationToken::new();
        self.phase = EditorPhase::Closed;
        self.active_date = None;
        self.candidate = None;
    }

    async fn guarded<T>(&self, call: impl Future<Output = T>) -> Option<T> {
        let token = self.session.clone();
        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            value = call => (!token.is_cancelled()).then_some(value),
        }
    }

    fn abandon(&mut self, action: &str) -> EditorOutcome {
        debug!("Discarding {} result, editor session was closed", action);
        self.session = CancellationToken::new();
        self.phase = EditorPhase::Closed;
        EditorOutcome::Abandoned
    }

    fn ensure_idle(&mut self) -> Result<(), AppError> {
        if self.phase == EditorPhase::Idle {
            return Ok(());
        }

        let message = match self.phase {
            EditorPhase::Closed => "The schedule editor is not open",
            _ => "Please wait for the current request to finish",
        };
        Err(self.reject(AppError::Validation(message.to_string())))
    }

    fn reject(&mut self, err: AppError) -> AppError {
        warn!("Schedule editor rejected action: {}", err);
        self.notices.push(Notice::warning(err.message()));
        err
    }
}
