//! Polydraw: headless host for Polygon Drawer.
//!
//! The map UI drives this process over newline-delimited JSON on
//! stdin/stdout. It owns everything that is not rendering:
//!
//! - **Place search**: dual-source geocoding via [`polydraw_search`], with
//!   only the latest query allowed to publish results
//! - **Drawing**: persistence of the current GeoJSON FeatureCollection and
//!   export of its polygons
//! - **Area**: geodesic polygon area and its display label
//! - **Messages**: English and Dutch user-facing strings

pub mod area;
pub mod config;
pub mod drawing;
pub mod error;
pub mod host;
pub mod messages;
pub mod paths;

pub use config::PolydrawConfig;
pub use error::{PolydrawError, Result};
pub use host::handler::PolydrawHost;
pub use messages::Locale;
