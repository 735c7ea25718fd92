use std::fmt;

use serde::{Deserialize, Serialize};

/// The value the form submits for participants travelling from abroad.
pub const FOREIGN_SENTINEL: &str = "Not applicable (foreign)";

/// The label shown in reports for participants travelling from abroad.
pub const FOREIGN_LABEL: &str = "Foreign";

/// Brazilian states offered on the form, followed by the foreign option.
pub const ORIGINS: [&str; 28] = [
    "Acre",
    "Alagoas",
    "Amapá",
    "Amazonas",
    "Bahia",
    "Ceará",
    "Distrito Federal",
    "Espírito Santo",
    "Goiás",
    "Maranhão",
    "Mato Grosso",
    "Mato Grosso do Sul",
    "Minas Gerais",
    "Pará",
    "Paraíba",
    "Paraná",
    "Pernambuco",
    "Piauí",
    "Rio de Janeiro",
    "Rio Grande do Norte",
    "Rio Grande do Sul",
    "Rondônia",
    "Roraima",
    "Santa Catarina",
    "São Paulo",
    "Sergipe",
    "Tocantins",
    FOREIGN_SENTINEL,
];

/// The role a participant had at the event. Anything not on the list
/// becomes [`ParticipantType::Other`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ParticipantType {
    Sailor,
    Coach,
    AthleteCompanion,
    RaceCommittee,
    ServiceProvider,
    Organization,
    Other,
}

impl ParticipantType {
    pub const ALL: [ParticipantType; 7] = [
        ParticipantType::Sailor,
        ParticipantType::Coach,
        ParticipantType::AthleteCompanion,
        ParticipantType::RaceCommittee,
        ParticipantType::ServiceProvider,
        ParticipantType::Organization,
        ParticipantType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        use ParticipantType::*;

        match self {
            Sailor => "Sailor",
            Coach => "Coach",
            AthleteCompanion => "Athlete companion",
            RaceCommittee => "Race committee",
            ServiceProvider => "Service provider",
            Organization => "Organization",
            Other => "Other",
        }
    }
}

impl From<&str> for ParticipantType {
    fn from(raw: &str) -> Self {
        ParticipantType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == raw)
            .unwrap_or(ParticipantType::Other)
    }
}

impl From<String> for ParticipantType {
    fn from(raw: String) -> Self {
        ParticipantType::from(raw.as_str())
    }
}

impl From<ParticipantType> for String {
    fn from(kind: ParticipantType) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a participant travelled from. Free text is accepted as a region.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Origin {
    Region(String),
    Foreign,
}

impl Origin {
    pub fn as_str(&self) -> &str {
        match self {
            Origin::Region(region) => region,
            Origin::Foreign => FOREIGN_SENTINEL,
        }
    }

    pub fn display_label(&self) -> &str {
        match self {
            Origin::Region(region) => region,
            Origin::Foreign => FOREIGN_LABEL,
        }
    }
}

impl From<&str> for Origin {
    fn from(raw: &str) -> Self {
        if raw == FOREIGN_SENTINEL {
            Origin::Foreign
        } else {
            Origin::Region(raw.to_owned())
        }
    }
}

impl From<String> for Origin {
    fn from(raw: String) -> Self {
        Origin::from(raw.as_str())
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Region(region) => region,
            Origin::Foreign => FOREIGN_SENTINEL.to_owned(),
        }
    }
}
