pub mod feedback;
pub mod identity;
pub mod session;
pub mod voice;

/// Navigation directives the call controller issues to the runtime.
///
/// This enum is the primary API for decoupling the controller's
/// termination handling from whatever actually performs the navigation
/// (a router in a UI shell, or a test harness reading the channel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Return to the application home destination.
    Home,
    /// Open the feedback view for a completed interview.
    InterviewFeedback {
        interview_id: String,
        feedback_id: String,
    },
}
