//! User-facing strings in English and Dutch.

use serde::{Deserialize, Serialize};

/// UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Nl,
}

impl Locale {
    /// Parse a language tag such as `"nl"`, `"nl-NL"` or `"en_GB"`.
    /// Unknown languages fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let lang = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "nl" => Self::Nl,
            _ => Self::En,
        }
    }

    /// Two-letter tag, also sent to the geocoders as the result language.
    pub fn tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Nl => "nl",
        }
    }

    pub fn text(self, message: Message) -> &'static str {
        use Message::*;
        match (self, message) {
            (Self::En, NoLocationsFound) => "No locations found",
            (Self::Nl, NoLocationsFound) => "Geen locaties gevonden",
            (Self::En, TapDrawToStart) => "Tap Draw to start",
            (Self::Nl, TapDrawToStart) => "Tik op Tekenen om te beginnen",
            (Self::En, CompletePolygon) => "Complete your polygon",
            (Self::Nl, CompletePolygon) => "Maak je polygoon af",
            (Self::En, AreaLabel) => "Area",
            (Self::Nl, AreaLabel) => "Oppervlakte",
            (Self::En, PolygonsLabel) => "polygons",
            (Self::Nl, PolygonsLabel) => "polygonen",
            (Self::En, NothingToClear) => "Nothing to clear",
            (Self::Nl, NothingToClear) => "Niets om te wissen",
            (Self::En, Cleared) => "Cleared",
            (Self::Nl, Cleared) => "Gewist",
            (Self::En, NoPolygonsToCopy) => "No polygons to copy",
            (Self::Nl, NoPolygonsToCopy) => "Geen polygonen om te kopiëren",
            (Self::En, LocationFound) => "Location found",
            (Self::Nl, LocationFound) => "Locatie gevonden",
            (Self::En, LocationUnavailable) => "Location unavailable",
            (Self::Nl, LocationUnavailable) => "Locatie niet beschikbaar",
            (Self::En, LocationTimeout) => "Location timeout",
            (Self::Nl, LocationTimeout) => "Locatie bepalen duurde te lang",
            (Self::En, LocationNotSupported) => "Location not supported",
            (Self::Nl, LocationNotSupported) => "Locatie wordt niet ondersteund",
            (Self::En, LocationError) => "Location error",
            (Self::Nl, LocationError) => "Locatiefout",
            (Self::En, CloseTabManually) => "You can now close this tab manually.",
            (Self::Nl, CloseTabManually) => "Je kunt dit tabblad nu handmatig sluiten.",
            (Self::En, CloseTab) => "Close Tab",
            (Self::Nl, CloseTab) => "Tabblad sluiten",
        }
    }
}

/// Message identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    NoLocationsFound,
    TapDrawToStart,
    CompletePolygon,
    AreaLabel,
    PolygonsLabel,
    NothingToClear,
    Cleared,
    NoPolygonsToCopy,
    LocationFound,
    LocationUnavailable,
    LocationTimeout,
    LocationNotSupported,
    LocationError,
    /// Shown once the return-to-form countdown ends and the tab stays open.
    CloseTabManually,
    CloseTab,
}
