pub mod editor;
pub mod reconcile;
pub mod schedule;

pub use editor::{CandidateRange, DeleteConfirmation, EditorOutcome, EditorPhase, ScheduleEditor};
pub use reconcile::{ScheduleAction, ScheduleState, SavePlan};
pub use schedule::{ScheduleApi, ScheduleService};
