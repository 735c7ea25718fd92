//! Composes the per-submission report.
//!
//! A [`Report`] is an ordered list of typed sections derived from a single
//! [`StoredRecord`] and nothing else, so composing the same record twice
//! yields the same report. Turning it into a document is left to
//! [`crate::render`].

use serde::Serialize;

use crate::emission::Emission;
use crate::submission::StoredRecord;

pub const TITLE: &str = "Every Trip Counts: Your CO2 Impact at the Event";

/// Grams of CO2 a tree absorbs in a year.
pub const TREE_GRAMS_PER_YEAR: f64 = 21_000.0;

/// Grams of CO2 attributed to one hour of a 60 W LED bulb.
pub const LED_BULB_GRAMS_PER_HOUR: f64 = 450.0;

/// Average daily emission of a Brazilian resident, in grams. Quoted for
/// comparison only.
pub const NATIONAL_DAILY_GRAMS: u32 = 12_000;

pub const EQUIVALENCE_NOTE: &str =
    "* Based on the Brazilian average of 4.4 tonnes of CO2 per capita per year";

pub const RECOMMENDATIONS: [&str; 7] = [
    "Choose accommodation close to the venue, reducing the need for motorized transport",
    "For short distances, walk or cycle: active, sustainable ways of getting around that are also good for your health and well-being",
    "Prefer public or shared transport whenever possible",
    "Organize car pools with other participants, making better use of vehicles and reducing the number of individual trips",
    "Plan your trips ahead to avoid heavy traffic and the extra fuel it burns",
    "Prefer electric or hybrid vehicles when available, to minimize the environmental impact of your trips",
    "Offset your emissions by joining reforestation programmes or other recognized environmental initiatives",
];

pub const FOOTER: [&str; 2] = [
    "CO2 Emission Calculator - Sustainable Sporting Events",
    "Report generated automatically - Together for a greener planet!",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// The document title, used for file metadata.
    pub title: String,
    pub sections: Vec<Section>,
}

impl Report {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    /// The emission table, which every composed report has.
    pub fn emission_table(&self) -> Option<&EmissionTable> {
        self.sections.iter().find_map(|section| match &section.content {
            Content::Emissions(table) => Some(table),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: Option<&'static str>,
    pub content: Content,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    Participant,
    Emissions,
    Equivalences,
    Recommendations,
    Footer,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text {
        lines: Vec<String>,
    },
    KeyValue {
        pairs: Vec<(String, String)>,
        note: Option<&'static str>,
    },
    Emissions(EmissionTable),
}

/// The breakdown of a submission, one row per leg.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmissionTable {
    pub rows: Vec<EmissionRow>,
    pub total: Emission,
}

impl EmissionTable {
    pub const HEADER: [&'static str; 4] = ["Leg", "Transport", "Distance", "Emission (gCO2)"];
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmissionRow {
    pub leg: &'static str,
    pub transport: String,
    pub distance: String,
    pub emission: Emission,
}

/// Everyday comparisons for a total emission.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Equivalences {
    pub trees_per_year: f64,
    pub led_bulb_hours: f64,
}

impl Equivalences {
    pub fn for_total(total: Emission) -> Self {
        Equivalences {
            trees_per_year: total.grams() / TREE_GRAMS_PER_YEAR,
            led_bulb_hours: total.grams() / LED_BULB_GRAMS_PER_HOUR,
        }
    }
}

/// Builds the full report of a stored submission.
pub fn compose(record: &StoredRecord) -> Report {
    Report {
        title: document_title(record),
        sections: vec![
            Section {
                kind: SectionKind::Header,
                heading: None,
                content: Content::Text {
                    lines: vec![TITLE.to_owned()],
                },
            },
            participant_section(record),
            emissions_section(record),
            equivalences_section(record.emission_total),
            Section {
                kind: SectionKind::Recommendations,
                heading: Some("RECOMMENDATIONS TO REDUCE EMISSIONS"),
                content: Content::Text {
                    lines: RECOMMENDATIONS.iter().map(|r| (*r).to_owned()).collect(),
                },
            },
            Section {
                kind: SectionKind::Footer,
                heading: None,
                content: Content::Text {
                    lines: FOOTER.iter().map(|l| (*l).to_owned()).collect(),
                },
            },
        ],
    }
}

pub fn document_title(record: &StoredRecord) -> String {
    format!("CO2 Emission - {}", record.input.email)
}

pub fn format_timestamp(record: &StoredRecord) -> String {
    record.created_at.format(TIMESTAMP_FORMAT)
}

fn participant_section(record: &StoredRecord) -> Section {
    let input = &record.input;

    let pairs = vec![
        ("Origin:", input.origin.display_label().to_owned()),
        ("Participant type:", input.participant_type.to_string()),
        ("Email:", input.email.clone()),
        ("Date of calculation:", format_timestamp(record)),
    ];

    Section {
        kind: SectionKind::Participant,
        heading: Some("PARTICIPANT DETAILS"),
        content: Content::KeyValue {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect(),
            note: None,
        },
    }
}

fn emissions_section(record: &StoredRecord) -> Section {
    let input = &record.input;

    let principal = EmissionRow {
        leg: "To the event city",
        transport: input.principal_mode.display_name(),
        distance: format!("{} km", input.principal_distance),
        emission: record.principal_emission(),
    };

    let local = EmissionRow {
        leg: "Local travel",
        transport: input.local_mode.display_name(),
        distance: format!(
            "{} km/day × {} days",
            input.local_distance, input.event_days
        ),
        emission: record.local_emission(),
    };

    Section {
        kind: SectionKind::Emissions,
        heading: Some("EMISSION SUMMARY"),
        content: Content::Emissions(EmissionTable {
            rows: vec![principal, local],
            total: record.emission_total,
        }),
    }
}

fn equivalences_section(total: Emission) -> Section {
    let equivalences = Equivalences::for_total(total);

    let pairs = vec![
        (
            "Trees needed to absorb it in 1 year",
            format!("{:.2} trees", equivalences.trees_per_year),
        ),
        (
            "Hours of an LED bulb (60W)",
            format!("{:.1} hours", equivalences.led_bulb_hours),
        ),
        (
            "Average Brazilian daily emission*",
            format!("≈ {} gCO2", group_thousands(NATIONAL_DAILY_GRAMS)),
        ),
    ];

    Section {
        kind: SectionKind::Equivalences,
        heading: Some("ENVIRONMENTAL IMPACT - EQUIVALENCES"),
        content: Content::KeyValue {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect(),
            note: Some(EQUIVALENCE_NOTE),
        },
    }
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}

/// The single-page variant used when the full report cannot be rendered.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MinimalReport {
    pub title: &'static str,
    pub email: String,
    pub participant_type: String,
    pub total: Emission,
}

impl MinimalReport {
    pub fn from_record(record: &StoredRecord) -> Self {
        MinimalReport {
            title: TITLE,
            email: record.input.email.clone(),
            participant_type: record.input.participant_type.to_string(),
            total: record.emission_total,
        }
    }
}
