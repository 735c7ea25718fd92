use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::BackendError;
use crate::submission::SubmissionInput;
use crate::transport::TransportMode;

/// A mass of CO2, held as an exact number of hundredths of a gram so that
/// sums and differences never drift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Emission(i64);

/// The largest emission a single leg may have: ten thousand tonnes.
pub const MAX_LEG_GRAMS: f64 = 1e10;

impl Emission {
    pub const ZERO: Emission = Emission(0);

    /// Rounds to the nearest hundredth of a gram.
    pub fn from_grams(grams: f64) -> Self {
        Emission((grams * 100.0).round() as i64)
    }

    pub fn from_centigrams(centigrams: i64) -> Self {
        Emission(centigrams)
    }

    pub fn centigrams(self) -> i64 {
        self.0
    }

    pub fn grams(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_add(self, other: Emission) -> Option<Emission> {
        self.0.checked_add(other.0).map(Emission)
    }

    pub fn checked_sub(self, other: Emission) -> Option<Emission> {
        self.0.checked_sub(other.0).map(Emission)
    }
}

impl Add for Emission {
    type Output = Emission;

    fn add(self, other: Emission) -> Emission {
        Emission(self.0.saturating_add(other.0))
    }
}

impl Sub for Emission {
    type Output = Emission;

    fn sub(self, other: Emission) -> Emission {
        Emission(self.0.saturating_sub(other.0))
    }
}

impl Sum for Emission {
    fn sum<I: Iterator<Item = Emission>>(iter: I) -> Emission {
        iter.fold(Emission::ZERO, Add::add)
    }
}

/// Formats as grams with exactly two decimals.
impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();

        write!(f, "{}{}.{:02}", sign, magnitude / 100, magnitude % 100)
    }
}

impl Serialize for Emission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.grams())
    }
}

impl<'de> Deserialize<'de> for Emission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let grams = f64::deserialize(deserializer)?;
        Ok(Emission::from_grams(grams))
    }
}

/// The emissions of one submission, split by leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EmissionBreakdown {
    pub principal: Emission,
    pub local: Emission,
    pub total: Emission,
}

/// Computes the emissions of the journey to the event and of the daily
/// travel during it.
pub fn compute(input: &SubmissionInput) -> Result<EmissionBreakdown, BackendError> {
    check_distance("principal_distance", input.principal_distance)?;
    check_distance("local_distance", input.local_distance)?;
    check_days(input.event_days)?;

    let principal_grams = input.principal_mode.factor() * input.principal_distance;
    check_leg("principal_distance", principal_grams)?;

    let local_grams =
        input.local_mode.factor() * input.local_distance * f64::from(input.event_days);
    check_leg("local_distance", local_grams)?;

    let principal = principal_emission(&input.principal_mode, input.principal_distance);
    let local = local_emission(&input.local_mode, input.local_distance, input.event_days);
    let total = principal
        .checked_add(local)
        .ok_or_else(|| BackendError::invalid("principal_distance", "is too large"))?;

    Ok(EmissionBreakdown {
        principal,
        local,
        total,
    })
}

pub fn principal_emission(mode: &TransportMode, distance: f64) -> Emission {
    Emission::from_grams(mode.factor() * distance)
}

pub fn local_emission(mode: &TransportMode, distance_per_day: f64, days: u32) -> Emission {
    Emission::from_grams(mode.factor() * distance_per_day * f64::from(days))
}

pub(crate) fn check_distance(field: &'static str, distance: f64) -> Result<(), BackendError> {
    if !distance.is_finite() {
        return Err(BackendError::invalid(field, "must be a finite number"));
    }

    if distance < 0.0 {
        return Err(BackendError::invalid(field, "must not be negative"));
    }

    Ok(())
}

fn check_leg(field: &'static str, grams: f64) -> Result<(), BackendError> {
    if grams > MAX_LEG_GRAMS {
        return Err(BackendError::invalid(field, "is too large"));
    }

    Ok(())
}

pub(crate) fn check_days(days: u32) -> Result<(), BackendError> {
    if days < 1 {
        return Err(BackendError::invalid("event_days", "must be at least 1"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::survey::{Origin, ParticipantType};

    fn input(
        principal_mode: &str,
        principal_distance: f64,
        local_mode: &str,
        local_distance: f64,
        event_days: u32,
    ) -> SubmissionInput {
        SubmissionInput {
            email: "sailor@example.com".to_owned(),
            origin: Origin::from("Bahia"),
            participant_type: ParticipantType::Sailor,
            principal_mode: TransportMode::from(principal_mode),
            principal_distance,
            local_mode: TransportMode::from(local_mode),
            local_distance,
            event_days,
        }
    }

    #[test]
    fn car_with_walking_locally() {
        let breakdown = compute(&input("car", 100.0, "bike/walk", 2.0, 3)).unwrap();

        assert_eq!(breakdown.principal.grams(), 9660.0);
        assert_eq!(breakdown.local, Emission::ZERO);
        assert_eq!(breakdown.total.grams(), 9660.0);
    }

    #[test]
    fn plane_with_bus_locally() {
        let breakdown = compute(&input("plane", 500.0, "bus", 5.0, 4)).unwrap();

        assert_eq!(breakdown.principal.grams(), 21500.0);
        assert_eq!(breakdown.local.grams(), 1340.0);
        assert_eq!(breakdown.total.grams(), 22840.0);
    }

    #[test]
    fn unknown_modes_fall_back_to_default_factor() {
        let breakdown = compute(&input("helicopter", 10.0, "helicopter", 10.0, 1)).unwrap();

        assert_eq!(breakdown.principal.grams(), 50.0);
        assert_eq!(breakdown.local.grams(), 50.0);
        assert_eq!(breakdown.total.grams(), 100.0);
    }

    #[test]
    fn zero_days_is_refused() {
        let error = compute(&input("car", 10.0, "car", 1.0, 0)).unwrap_err();

        assert!(matches!(error, BackendError::InvalidInput { field: "event_days", .. }));
    }

    #[test]
    fn negative_distances_are_refused() {
        let error = compute(&input("car", -1.0, "car", 1.0, 1)).unwrap_err();
        assert!(matches!(error, BackendError::InvalidInput { field: "principal_distance", .. }));

        let error = compute(&input("car", 1.0, "car", -0.5, 1)).unwrap_err();
        assert!(matches!(error, BackendError::InvalidInput { field: "local_distance", .. }));
    }

    #[test]
    fn non_finite_distances_are_refused() {
        assert!(compute(&input("car", f64::NAN, "car", 1.0, 1)).is_err());
        assert!(compute(&input("car", 1.0, "car", f64::INFINITY, 1)).is_err());
    }

    #[test]
    fn huge_distances_are_refused() {
        let error = compute(&input("car", 1e300, "car", 1e300, 1)).unwrap_err();
        assert!(matches!(error, BackendError::InvalidInput { field: "principal_distance", .. }));

        let error = compute(&input("car", 1.0, "plane", 1e9, 365)).unwrap_err();
        assert!(matches!(error, BackendError::InvalidInput { field: "local_distance", .. }));
    }

    #[test]
    fn legs_at_the_limit_still_add_up() {
        let breakdown = compute(&input("plane", 1e8, "car", 1e8, 1)).unwrap();

        assert_eq!(breakdown.principal + breakdown.local, breakdown.total);
        assert_eq!(breakdown.total.grams(), 4.3e9 + 9.66e9);
    }

    #[test]
    fn arithmetic_saturates_instead_of_wrapping() {
        let largest = Emission::from_centigrams(i64::MAX);

        assert_eq!(largest.checked_add(Emission::from_centigrams(1)), None);
        assert_eq!(largest + Emission::from_centigrams(1), largest);
        assert_eq!(Emission::from_centigrams(i64::MIN).checked_sub(Emission::from_centigrams(1)), None);
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Emission::from_grams(9660.0).to_string(), "9660.00");
        assert_eq!(Emission::from_grams(0.5).to_string(), "0.50");
        assert_eq!(Emission::from_centigrams(-5).to_string(), "-0.05");
        assert_eq!(Emission::from_grams(80.5 * 3.3).to_string(), "265.65");
    }

    fn any_mode() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("car".to_owned()),
            Just("bus".to_owned()),
            Just("plane".to_owned()),
            Just("ferry".to_owned()),
            Just("bike/walk".to_owned()),
            Just("motorcycle".to_owned()),
            Just("train".to_owned()),
            Just("other".to_owned()),
            "[a-z]{1,12}",
        ]
    }

    proptest! {
        #[test]
        fn legs_always_sum_to_total(
            principal_mode in any_mode(),
            principal_distance in 0.0..100_000.0f64,
            local_mode in any_mode(),
            local_distance in 0.0..1_000.0f64,
            event_days in 1u32..60,
        ) {
            let breakdown = compute(&input(&principal_mode, principal_distance, &local_mode, local_distance, event_days)).unwrap();

            prop_assert_eq!(breakdown.principal + breakdown.local, breakdown.total);
            prop_assert!(breakdown.principal >= Emission::ZERO);
            prop_assert!(breakdown.local >= Emission::ZERO);
        }

        #[test]
        fn unlisted_modes_never_fail(mode in "[A-Z][a-z]{0,10}", distance in 0.0..10_000.0f64) {
            let breakdown = compute(&input(&mode, distance, &mode, 0.0, 1)).unwrap();

            prop_assert_eq!(breakdown.principal, Emission::from_grams(5.0 * distance));
        }
    }
}
