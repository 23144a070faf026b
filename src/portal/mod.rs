//! LinzNetz customer portal automation.
//!
//! The portal has no API; consumption data is only reachable by logging in,
//! clicking through to the consumption page and exporting a CSV per meter
//! location. [`Session`] drives that flow through a [`Driver`].

pub mod chromium;
pub mod download;
pub mod driver;
pub mod export;
pub mod navigation;
pub mod roster;
pub mod selectors;
pub mod session;
pub mod watcher;

pub use chromium::LaunchOptions;
pub use driver::Driver;
pub use export::{ExportRequest, PortalDate};
pub use roster::{Installation, MeterPointId};
pub use session::{Credentials, Session, SessionOptions};
