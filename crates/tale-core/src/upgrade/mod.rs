mod marker;
mod upgrade_report;
mod upgrade_step;
mod upgrader;

pub use marker::UpgradeMarker;
pub use upgrade_report::UpgradeReport;
pub use upgrade_step::UpgradeStep;
pub use upgrader::Upgrader;

/// Paths under the installation that are replaced only when the release
/// ships its own copy. Everything else in `resources` (the properties file
/// included) is left alone.
pub const PRESERVED_SUBPATHS: [&str; 4] = [
    "resources/static",
    "resources/templates/admin",
    "resources/templates/comm",
    "resources/templates/install.html",
];
