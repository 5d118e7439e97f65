pub mod naming;
pub mod overlay;
pub mod session;

pub use session::{run, Clock, Ctx, LocalClock, Outcome, Progress, Report, Retry, Session};
