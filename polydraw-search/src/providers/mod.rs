//! Geocoding provider implementations.
//!
//! Each module provides a struct implementing
//! [`crate::provider::GeocodingProvider`] that queries one remote API and
//! normalises its JSON into [`crate::SearchResult`].

pub mod mapbox;
pub mod nominatim;

pub use mapbox::MapboxProvider;
pub use nominatim::NominatimProvider;
