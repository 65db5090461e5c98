use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workout::{Coordinate, Workout, WorkoutMetrics};

/// Key of the single persisted value.
pub const STORAGE_KEY: &str = "workouts";

/// String key-value storage, the shape of the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Flat persisted form of a workout. Derived fields (pace, speed, label) are
/// deliberately absent; they are recomputed on load and never trusted from
/// raw data.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWorkout {
    id: String,
    created_at: DateTime<Utc>,
    coords: Coordinate,
    distance: f64,
    duration: f64,
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation_gain: Option<f64>,
}

impl From<&Workout> for StoredWorkout {
    fn from(workout: &Workout) -> Self {
        let (cadence, elevation_gain) = match workout.metrics() {
            WorkoutMetrics::Running { cadence_spm, .. } => (Some(*cadence_spm), None),
            WorkoutMetrics::Cycling {
                elevation_gain_m, ..
            } => (None, Some(*elevation_gain_m)),
        };

        Self {
            id: workout.id().to_string(),
            created_at: workout.created_at(),
            coords: workout.coordinate(),
            distance: workout.distance_km(),
            duration: workout.duration_min(),
            kind: workout.kind().as_str().to_string(),
            cadence,
            elevation_gain,
        }
    }
}

/// Serialize/deserialize boundary between the repository and the persisted
/// key-value entry.
pub struct PersistenceCodec<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PersistenceCodec<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Overwrites the persisted value with the full collection.
    pub fn save(&self, workouts: &[Workout]) {
        let stored: Vec<StoredWorkout> = workouts.iter().map(StoredWorkout::from).collect();
        let json = serde_json::to_string(&stored).unwrap();
        self.store.set(STORAGE_KEY, &json);
    }

    /// Reconstructs the typed collection. An absent or unparseable value
    /// yields an empty collection, and individual malformed entries are
    /// skipped; corrupt storage never surfaces as an error.
    pub fn load(&self) -> Vec<Workout> {
        let Some(raw) = self.store.get(STORAGE_KEY) else {
            return Vec::new();
        };

        let Ok(entries) = serde_json::from_str::<Vec<serde_json::Value>>(&raw) else {
            return Vec::new();
        };

        entries.into_iter().filter_map(decode_entry).collect()
    }

    pub fn clear(&self) {
        self.store.remove(STORAGE_KEY);
    }
}

/// Tagged-variant decode of one entry. Returns `None` for entries that fail
/// to parse, carry an unknown kind, lack the kind's metric field, or fail
/// re-validation.
fn decode_entry(value: serde_json::Value) -> Option<Workout> {
    let stored: StoredWorkout = serde_json::from_value(value).ok()?;

    match stored.kind.as_str() {
        "running" => Workout::running_at(
            stored.id,
            stored.created_at,
            stored.coords,
            stored.distance,
            stored.duration,
            stored.cadence?,
        )
        .ok(),
        "cycling" => Workout::cycling_at(
            stored.id,
            stored.created_at,
            stored.coords,
            stored.distance,
            stored.duration,
            stored.elevation_gain?,
        )
        .ok(),
        _ => None,
    }
}
