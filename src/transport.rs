use std::fmt;

use serde::{Deserialize, Serialize};

/// Grams of CO2 per kilometre used for any mode outside the known table.
pub const DEFAULT_FACTOR: f64 = 5.0;

/// A way of travelling, as submitted on the form.
///
/// Values outside the known set are kept verbatim as [`TransportMode::Unlisted`]
/// and are charged [`DEFAULT_FACTOR`] rather than being refused.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum TransportMode {
    Car,
    Bus,
    Plane,
    Ferry,
    BikeOrWalk,
    Motorcycle,
    Train,
    Other,
    Unlisted(String),
}

impl TransportMode {
    /// Every known mode, in the order the form and charts list them.
    pub const KNOWN: [TransportMode; 8] = [
        TransportMode::Car,
        TransportMode::Bus,
        TransportMode::Plane,
        TransportMode::Ferry,
        TransportMode::BikeOrWalk,
        TransportMode::Motorcycle,
        TransportMode::Train,
        TransportMode::Other,
    ];

    pub fn as_str(&self) -> &str {
        use TransportMode::*;

        match self {
            Car => "car",
            Bus => "bus",
            Plane => "plane",
            Ferry => "ferry",
            BikeOrWalk => "bike/walk",
            Motorcycle => "motorcycle",
            Train => "train",
            Other => "other",
            Unlisted(raw) => raw,
        }
    }

    /// Grams of CO2 emitted per kilometre.
    pub fn factor(&self) -> f64 {
        use TransportMode::*;

        match self {
            Car => 96.6,
            Bus => 67.0,
            Plane => 43.0,
            Ferry => 59.0,
            BikeOrWalk => 0.0,
            Motorcycle => 80.5,
            Train => 21.0,
            Other => 50.0,
            Unlisted(_) => DEFAULT_FACTOR,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TransportMode::Unlisted(_))
    }

    /// Returns the name with its first letter in upper case, for tables.
    pub fn display_name(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();

        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<&str> for TransportMode {
    fn from(raw: &str) -> Self {
        TransportMode::KNOWN
            .iter()
            .find(|mode| mode.as_str() == raw)
            .cloned()
            .unwrap_or_else(|| TransportMode::Unlisted(raw.to_owned()))
    }
}

impl From<String> for TransportMode {
    fn from(raw: String) -> Self {
        TransportMode::from(raw.as_str())
    }
}

impl From<TransportMode> for String {
    fn from(mode: TransportMode) -> Self {
        match mode {
            TransportMode::Unlisted(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the fixed efficiency table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModeFactor {
    pub mode: TransportMode,
    pub grams_per_km: f64,
}

/// The factors of every known mode, including those that emit nothing.
pub fn efficiency_table() -> Vec<ModeFactor> {
    TransportMode::KNOWN
        .iter()
        .map(|mode| ModeFactor {
            mode: mode.clone(),
            grams_per_km: mode.factor(),
        })
        .collect()
}
