use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Geographic position, persisted as a `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.lat, value.lng]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃‍♂️",
            WorkoutKind::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific input and its derived metric. The derived value is computed
/// once at construction and never recomputed afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutMetrics {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

/// One logged workout session. Immutable after construction; `id` is the
/// sole join key between the repository, the summary list, the map markers
/// and the persisted form.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: String,
    created_at: DateTime<Utc>,
    coordinate: Coordinate,
    distance_km: f64,
    duration_min: f64,
    label: String,
    metrics: WorkoutMetrics,
}

impl Workout {
    /// Creates a running workout, stamping a fresh identity.
    pub fn running(
        coordinate: Coordinate,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Result<Self, ValidationError> {
        let created_at = Utc::now();
        Self::running_at(
            generate_id(created_at),
            created_at,
            coordinate,
            distance_km,
            duration_min,
            cadence_spm,
        )
    }

    /// Creates a cycling workout, stamping a fresh identity.
    pub fn cycling(
        coordinate: Coordinate,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Result<Self, ValidationError> {
        let created_at = Utc::now();
        Self::cycling_at(
            generate_id(created_at),
            created_at,
            coordinate,
            distance_km,
            duration_min,
            elevation_gain_m,
        )
    }

    /// Rebuilds a running workout around an existing identity, recomputing
    /// every derived field. Used when decoding persisted data.
    pub fn running_at(
        id: String,
        created_at: DateTime<Utc>,
        coordinate: Coordinate,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Result<Self, ValidationError> {
        require_positive("distance", distance_km)?;
        require_positive("duration", duration_min)?;
        require_positive("cadence", cadence_spm)?;

        Ok(Self {
            label: label_for(WorkoutKind::Running, created_at),
            id,
            created_at,
            coordinate,
            distance_km,
            duration_min,
            metrics: WorkoutMetrics::Running {
                cadence_spm,
                pace_min_per_km: duration_min / distance_km,
            },
        })
    }

    /// Rebuilds a cycling workout around an existing identity. Elevation
    /// gain must be finite but may be negative or zero.
    pub fn cycling_at(
        id: String,
        created_at: DateTime<Utc>,
        coordinate: Coordinate,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Result<Self, ValidationError> {
        require_positive("distance", distance_km)?;
        require_positive("duration", duration_min)?;
        require_finite("elevation gain", elevation_gain_m)?;

        Ok(Self {
            label: label_for(WorkoutKind::Cycling, created_at),
            id,
            created_at,
            coordinate,
            distance_km,
            duration_min,
            metrics: WorkoutMetrics::Cycling {
                elevation_gain_m,
                speed_km_per_h: distance_km / (duration_min / 60.0),
            },
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn metrics(&self) -> &WorkoutMetrics {
        &self.metrics
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.metrics {
            WorkoutMetrics::Running { .. } => WorkoutKind::Running,
            WorkoutMetrics::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// Last ten digits of the creation timestamp in microseconds. Derived from
/// the clock rather than a counter, so identities never repeat after a
/// reload.
fn generate_id(created_at: DateTime<Utc>) -> String {
    let micros = created_at.timestamp_micros().to_string();
    let start = micros.len().saturating_sub(10);
    micros[start..].to_string()
}

fn label_for(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    format!(
        "{} on {} {}",
        kind.title(),
        MONTHS[created_at.month0() as usize],
        created_at.day()
    )
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(())
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn april_14() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn running_pace_is_duration_over_distance() {
        let workout =
            Workout::running(Coordinate::new(56.17, 10.19), 10.0, 50.0, 178.0).unwrap();
        match workout.metrics() {
            WorkoutMetrics::Running {
                pace_min_per_km, ..
            } => assert_eq!(*pace_min_per_km, 5.0),
            _ => panic!("expected running metrics"),
        }
    }

    #[test]
    fn cycling_speed_is_distance_over_hours() {
        let workout =
            Workout::cycling(Coordinate::new(56.17, 10.19), 20.0, 60.0, 120.0).unwrap();
        match workout.metrics() {
            WorkoutMetrics::Cycling { speed_km_per_h, .. } => assert_eq!(*speed_km_per_h, 20.0),
            _ => panic!("expected cycling metrics"),
        }
    }

    #[test]
    fn label_is_derived_from_the_stored_timestamp() {
        let workout = Workout::running_at(
            "1713087000".into(),
            april_14(),
            Coordinate::new(0.0, 0.0),
            10.0,
            50.0,
            178.0,
        )
        .unwrap();
        assert_eq!(workout.label(), "Running on April 14");

        let workout = Workout::cycling_at(
            "1713087001".into(),
            april_14(),
            Coordinate::new(0.0, 0.0),
            20.0,
            60.0,
            -15.0,
        )
        .unwrap();
        assert_eq!(workout.label(), "Cycling on April 14");
    }

    #[test]
    fn rejects_non_positive_and_non_finite_inputs() {
        let coordinate = Coordinate::new(0.0, 0.0);

        assert!(matches!(
            Workout::running(coordinate, -5.0, 50.0, 178.0),
            Err(ValidationError::NotPositive { field: "distance" })
        ));
        assert!(matches!(
            Workout::running(coordinate, 10.0, 0.0, 178.0),
            Err(ValidationError::NotPositive { field: "duration" })
        ));
        assert!(matches!(
            Workout::running(coordinate, 10.0, 50.0, f64::NAN),
            Err(ValidationError::NotFinite { field: "cadence" })
        ));
        assert!(matches!(
            Workout::cycling(coordinate, -5.0, 60.0, 120.0),
            Err(ValidationError::NotPositive { field: "distance" })
        ));
        assert!(matches!(
            Workout::cycling(coordinate, 20.0, 60.0, f64::INFINITY),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn cycling_elevation_may_be_negative() {
        let workout = Workout::cycling(Coordinate::new(0.0, 0.0), 20.0, 60.0, -40.0).unwrap();
        assert!(matches!(
            workout.metrics(),
            WorkoutMetrics::Cycling {
                elevation_gain_m, ..
            } if *elevation_gain_m == -40.0
        ));
    }

    #[test]
    fn generated_id_keeps_ten_digits() {
        let id = generate_id(april_14());
        assert_eq!(id.len(), 10);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }
}
