use crate::codec::{KeyValueStore, PersistenceCodec};
use crate::error::SessionError;
use crate::projector::{MapService, SummaryList, ViewProjector};
use crate::repository::WorkoutRepository;
use crate::workout::{Coordinate, Workout};

/// Zoom used when the map first renders and when focusing a workout.
pub const INITIAL_ZOOM: f64 = 13.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    AwaitingLocation,
    Ready,
}

/// Raw form input for one workout, parsed but not yet validated.
#[derive(Debug, Clone, Copy)]
pub enum WorkoutDraft {
    Running {
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    },
    Cycling {
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    },
}

/// Orchestrates the session lifecycle: load on startup, creation after a
/// map click, deletion, and focus. Every mutating operation leaves the
/// repository, both projections and the persisted value consistent; on
/// failure none of them change.
pub struct SessionController<M: MapService, L: SummaryList, S: KeyValueStore> {
    repository: WorkoutRepository,
    codec: PersistenceCodec<S>,
    projector: ViewProjector<M, L>,
    state: MapState,
    selected: Option<Coordinate>,
}

impl<M: MapService, L: SummaryList, S: KeyValueStore> SessionController<M, L, S> {
    /// Builds the controller and runs the load flow: persisted workouts go
    /// into the repository and the summary list right away, while their
    /// markers wait for the map.
    pub fn new(codec: PersistenceCodec<S>, projector: ViewProjector<M, L>) -> Self {
        let mut controller = Self {
            repository: WorkoutRepository::new(),
            codec,
            projector,
            state: MapState::AwaitingLocation,
            selected: None,
        };

        for workout in controller.codec.load() {
            controller.projector.render_summary(&workout);
            controller.repository.add(workout);
        }

        controller
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn workouts(&self) -> &[Workout] {
        self.repository.all()
    }

    pub fn has_workouts(&self) -> bool {
        !self.repository.is_empty()
    }

    /// The one-shot location request resolved: render the map there, attach
    /// it, and project a marker for every stored workout. A failed request
    /// never calls this, leaving creation disabled for the session.
    pub fn location_resolved(&mut self, map: M, position: Coordinate) {
        map.render_at(position, INITIAL_ZOOM);
        self.projector.attach_map(map);

        for workout in self.repository.all() {
            self.projector.place_marker(workout);
        }

        self.state = MapState::Ready;
    }

    /// Remembers the clicked coordinate for the next submission. Returns
    /// `false` (and captures nothing) while the map is not ready.
    pub fn map_clicked(&mut self, position: Coordinate) -> bool {
        if self.state != MapState::Ready {
            return false;
        }
        self.selected = Some(position);
        true
    }

    /// Creation flow. On validation failure nothing is mutated and the
    /// selected coordinate stays armed so the user can resubmit.
    pub fn submit(&mut self, draft: WorkoutDraft) -> Result<(), SessionError> {
        let coordinate = self.selected.ok_or(SessionError::LocationUnavailable)?;

        let workout = match draft {
            WorkoutDraft::Running {
                distance_km,
                duration_min,
                cadence_spm,
            } => Workout::running(coordinate, distance_km, duration_min, cadence_spm)?,
            WorkoutDraft::Cycling {
                distance_km,
                duration_min,
                elevation_gain_m,
            } => Workout::cycling(coordinate, distance_km, duration_min, elevation_gain_m)?,
        };

        self.selected = None;
        self.projector.place_marker(&workout);
        self.projector.render_summary(&workout);
        self.repository.add(workout);
        self.codec.save(self.repository.all());
        Ok(())
    }

    /// Deletes one workout from all three stores. Unknown ids are a silent
    /// no-op.
    pub fn delete(&mut self, id: &str) {
        if self.repository.remove_by_id(id).is_none() {
            return;
        }
        self.projector.remove_by_id(id);
        self.codec.save(self.repository.all());
    }

    /// Empties the persisted value, the repository and both projections.
    pub fn delete_all(&mut self) {
        self.codec.clear();
        self.repository.clear();
        self.projector.clear();
    }

    /// Pans the map to the workout. Silent no-op for unknown ids or while
    /// the map is not ready.
    pub fn focus(&self, id: &str) {
        self.projector.focus(id, INITIAL_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::codec::tests::MemoryStore;
    use crate::codec::STORAGE_KEY;
    use crate::projector::tests::{FakeList, FakeMap};

    struct Harness {
        controller: SessionController<Rc<FakeMap>, Rc<FakeList>, MemoryStore>,
        store: MemoryStore,
        map: Rc<FakeMap>,
        list: Rc<FakeList>,
    }

    fn harness(store: MemoryStore) -> Harness {
        let list = Rc::new(FakeList::default());
        let map = Rc::new(FakeMap::default());
        let controller = SessionController::new(
            PersistenceCodec::new(store.clone()),
            ViewProjector::new(list.clone()),
        );
        Harness {
            controller,
            store,
            map,
            list,
        }
    }

    fn ready(h: &mut Harness) {
        h.controller
            .location_resolved(h.map.clone(), Coordinate::new(56.17, 10.19));
    }

    fn running_draft(distance_km: f64) -> WorkoutDraft {
        WorkoutDraft::Running {
            distance_km,
            duration_min: 50.0,
            cadence_spm: 178.0,
        }
    }

    #[test]
    fn creation_updates_all_four_stores() {
        let mut h = harness(MemoryStore::default());
        ready(&mut h);

        assert!(h.controller.map_clicked(Coordinate::new(56.2, 10.2)));
        h.controller.submit(running_draft(10.0)).unwrap();

        assert_eq!(h.controller.workouts().len(), 1);
        assert_eq!(h.map.live_markers.borrow().len(), 1);
        assert_eq!(h.list.live.borrow().len(), 1);
        assert!(h.store.raw(STORAGE_KEY).unwrap().contains("running"));
    }

    #[test]
    fn clicks_are_ignored_until_the_map_is_ready() {
        let mut h = harness(MemoryStore::default());

        assert_eq!(h.controller.state(), MapState::AwaitingLocation);
        assert!(!h.controller.map_clicked(Coordinate::new(56.2, 10.2)));
        assert!(matches!(
            h.controller.submit(running_draft(10.0)),
            Err(SessionError::LocationUnavailable)
        ));

        ready(&mut h);
        assert_eq!(h.controller.state(), MapState::Ready);
        assert!(h.controller.map_clicked(Coordinate::new(56.2, 10.2)));
    }

    #[test]
    fn validation_failure_mutates_nothing_and_keeps_the_click() {
        let mut h = harness(MemoryStore::default());
        ready(&mut h);
        h.controller.map_clicked(Coordinate::new(56.2, 10.2));

        let result = h.controller.submit(running_draft(-5.0));
        assert!(matches!(result, Err(SessionError::Validation(_))));
        assert!(h.controller.workouts().is_empty());
        assert!(h.map.live_markers.borrow().is_empty());
        assert!(h.list.live.borrow().is_empty());
        assert!(h.store.raw(STORAGE_KEY).is_none());

        // the clicked coordinate survives a rejected submission
        h.controller.submit(running_draft(10.0)).unwrap();
        assert_eq!(h.controller.workouts().len(), 1);
    }

    #[test]
    fn identity_survives_a_reload_and_deletion_still_works() {
        let store = MemoryStore::default();

        let mut h = harness(store.clone());
        ready(&mut h);
        h.controller.map_clicked(Coordinate::new(56.2, 10.2));
        h.controller.submit(running_draft(10.0)).unwrap();
        h.controller.map_clicked(Coordinate::new(56.3, 10.3));
        h.controller.submit(running_draft(12.0)).unwrap();

        let target = h.controller.workouts()[0].id().to_string();
        let survivor = h.controller.workouts()[1].id().to_string();

        // fresh session over the same store, as after a browser reload
        let mut h = harness(store);
        assert_eq!(h.controller.workouts().len(), 2);
        assert_eq!(h.list.live.borrow().len(), 2);
        assert!(h.map.live_markers.borrow().is_empty());

        ready(&mut h);
        assert_eq!(h.map.live_markers.borrow().len(), 2);

        h.controller.delete(&target);
        assert_eq!(h.controller.workouts().len(), 1);
        assert_eq!(h.controller.workouts()[0].id(), survivor);
        assert_eq!(h.map.live_markers.borrow().len(), 1);
        assert_eq!(*h.list.live.borrow(), vec![survivor.clone()]);
        assert!(!h.store.raw(STORAGE_KEY).unwrap().contains(&target));
    }

    #[test]
    fn deleting_an_unknown_id_changes_nothing() {
        let mut h = harness(MemoryStore::default());
        ready(&mut h);
        h.controller.map_clicked(Coordinate::new(56.2, 10.2));
        h.controller.submit(running_draft(10.0)).unwrap();
        let before = h.store.raw(STORAGE_KEY);

        h.controller.delete("0000000000");
        assert_eq!(h.controller.workouts().len(), 1);
        assert_eq!(h.store.raw(STORAGE_KEY), before);
    }

    #[test]
    fn delete_all_empties_every_store() {
        let mut h = harness(MemoryStore::default());
        ready(&mut h);
        h.controller.map_clicked(Coordinate::new(56.2, 10.2));
        h.controller.submit(running_draft(10.0)).unwrap();
        h.controller.map_clicked(Coordinate::new(56.3, 10.3));
        h.controller
            .submit(WorkoutDraft::Cycling {
                distance_km: 20.0,
                duration_min: 60.0,
                elevation_gain_m: -15.0,
            })
            .unwrap();

        h.controller.delete_all();
        assert!(h.controller.workouts().is_empty());
        assert!(!h.controller.has_workouts());
        assert!(h.map.live_markers.borrow().is_empty());
        assert!(h.list.live.borrow().is_empty());
        assert!(h.store.raw(STORAGE_KEY).is_none());
    }

    #[test]
    fn stored_workouts_are_listed_and_deletable_without_a_map() {
        let store = MemoryStore::default();

        let mut h = harness(store.clone());
        ready(&mut h);
        h.controller.map_clicked(Coordinate::new(56.2, 10.2));
        h.controller.submit(running_draft(10.0)).unwrap();
        let id = h.controller.workouts()[0].id().to_string();

        // reload where geolocation never resolves
        let mut h = harness(store);
        assert_eq!(h.controller.state(), MapState::AwaitingLocation);
        assert_eq!(h.list.live.borrow().len(), 1);

        h.controller.focus(&id); // no map attached, must not panic
        h.controller.delete(&id);
        assert!(h.controller.workouts().is_empty());
        assert!(h.list.live.borrow().is_empty());
    }
}
