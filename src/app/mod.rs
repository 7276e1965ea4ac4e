pub mod session;

pub use session::{Command, MapSession, Outcome, DEFAULT_COUNTRY};
