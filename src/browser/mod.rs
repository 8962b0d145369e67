pub mod chrome_session;
pub mod connection;
pub mod driver;
#[cfg(test)]
pub(crate) mod fake;
pub mod launch;

pub use chrome_session::ChromeSession;
pub use connection::connect_to_browser;
pub use driver::{SessionDriver, SessionState, WindowSet};
pub use launch::launch_browser;
