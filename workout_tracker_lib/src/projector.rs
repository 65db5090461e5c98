use std::collections::HashMap;

use crate::workout::{Coordinate, Workout, WorkoutKind, WorkoutMetrics};

/// Map service consumed by the projector. Implemented over Leaflet in the
/// frontend and over an in-memory fake in tests.
pub trait MapService {
    type Marker;

    fn render_at(&self, coordinate: Coordinate, zoom: f64);
    fn place_marker(&self, coordinate: Coordinate, kind: WorkoutKind, popup_html: &str)
        -> Self::Marker;
    fn remove_marker(&self, marker: Self::Marker);
    fn pan_to(&self, coordinate: Coordinate, zoom: f64);
}

/// Summary-list sink. `append` receives ready-made markup tagged with the
/// workout id and returns a handle used for later removal.
pub trait SummaryList {
    type Entry;

    fn append(&self, id: &str, html: &str) -> Self::Entry;
    fn remove(&self, entry: Self::Entry);
}

struct Projection<Marker, Entry> {
    coordinate: Coordinate,
    summary: Option<Entry>,
    marker: Option<Marker>,
}

/// Keeps the two renderings of the repository addressable by workout id.
/// The map sink attaches late (geolocation gates it); everything marker
/// related silently defers or no-ops until then.
pub struct ViewProjector<M: MapService, L: SummaryList> {
    map: Option<M>,
    list: L,
    entries: HashMap<String, Projection<M::Marker, L::Entry>>,
}

impl<M: MapService, L: SummaryList> ViewProjector<M, L> {
    pub fn new(list: L) -> Self {
        Self {
            map: None,
            list,
            entries: HashMap::new(),
        }
    }

    pub fn attach_map(&mut self, map: M) {
        self.map = Some(map);
    }

    pub fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    /// Renders the workout into the summary list and records the handle.
    pub fn render_summary(&mut self, workout: &Workout) {
        let entry = self.list.append(workout.id(), &summary_html(workout));
        self.slot(workout).summary = Some(entry);
    }

    /// Places a map marker for the workout. Deferred silently while the map
    /// is not attached yet.
    pub fn place_marker(&mut self, workout: &Workout) {
        let marker = match &self.map {
            Some(map) => map.place_marker(workout.coordinate(), workout.kind(), &popup_html(workout)),
            None => return,
        };
        self.slot(workout).marker = Some(marker);
    }

    /// Removes both renderings for the id. Unknown ids, a missing map and
    /// never-placed markers are all tolerated.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let Some(projection) = self.entries.remove(id) else {
            return false;
        };

        if let Some(entry) = projection.summary {
            self.list.remove(entry);
        }
        if let (Some(marker), Some(map)) = (projection.marker, &self.map) {
            map.remove_marker(marker);
        }
        true
    }

    /// Pans the map to the workout's coordinate. No-op when the id or the
    /// map is unavailable.
    pub fn focus(&self, id: &str, zoom: f64) {
        if let (Some(projection), Some(map)) = (self.entries.get(id), &self.map) {
            map.pan_to(projection.coordinate, zoom);
        }
    }

    pub fn clear(&mut self) {
        let ids: Vec<String> = self.entries.keys().cloned().collect();
        for id in ids {
            self.remove_by_id(&id);
        }
    }

    fn slot(&mut self, workout: &Workout) -> &mut Projection<M::Marker, L::Entry> {
        self.entries
            .entry(workout.id().to_string())
            .or_insert_with(|| Projection {
                coordinate: workout.coordinate(),
                summary: None,
                marker: None,
            })
    }
}

fn popup_html(workout: &Workout) -> String {
    format!("{} {}", workout.kind().icon(), workout.label())
}

/// Summary-list markup for one workout, tagged with its id.
fn summary_html(workout: &Workout) -> String {
    let kind = workout.kind();
    let mut html = format!(
        "<li class=\"workout workout--{kind}\" data-id=\"{id}\">\
         <h2 class=\"workout__title\">{label}\
         <button class=\"workout__delete\">✕</button></h2>\
         <div class=\"workout__details\">\
         <span class=\"workout__icon\">{icon}</span>\
         <span class=\"workout__value\">{distance}</span>\
         <span class=\"workout__unit\">km</span></div>\
         <div class=\"workout__details\">\
         <span class=\"workout__icon\">⏱</span>\
         <span class=\"workout__value\">{duration}</span>\
         <span class=\"workout__unit\">min</span></div>",
        kind = kind,
        id = workout.id(),
        label = workout.label(),
        icon = kind.icon(),
        distance = workout.distance_km(),
        duration = workout.duration_min(),
    );

    match workout.metrics() {
        WorkoutMetrics::Running {
            cadence_spm,
            pace_min_per_km,
        } => {
            html.push_str(&format!(
                "<div class=\"workout__details\">\
                 <span class=\"workout__icon\">⚡️</span>\
                 <span class=\"workout__value\">{pace_min_per_km:.1}</span>\
                 <span class=\"workout__unit\">min/km</span></div>\
                 <div class=\"workout__details\">\
                 <span class=\"workout__icon\">🦶🏼</span>\
                 <span class=\"workout__value\">{cadence_spm}</span>\
                 <span class=\"workout__unit\">spm</span></div>"
            ));
        }
        WorkoutMetrics::Cycling {
            elevation_gain_m,
            speed_km_per_h,
        } => {
            html.push_str(&format!(
                "<div class=\"workout__details\">\
                 <span class=\"workout__icon\">⚡️</span>\
                 <span class=\"workout__value\">{speed_km_per_h:.1}</span>\
                 <span class=\"workout__unit\">km/h</span></div>\
                 <div class=\"workout__details\">\
                 <span class=\"workout__icon\">⛰</span>\
                 <span class=\"workout__value\">{elevation_gain_m}</span>\
                 <span class=\"workout__unit\">m</span></div>"
            ));
        }
    }

    html.push_str("</li>");
    html
}
