#![deny(warnings)]
pub mod belief;
pub mod history;
pub mod model;
pub mod simulate;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "recon"
    }

    pub const fn codename() -> &'static str {
        "Hypothesis Tracker"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
