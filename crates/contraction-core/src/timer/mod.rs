mod session;

pub use session::{SessionController, SessionState, StopOutcome};
