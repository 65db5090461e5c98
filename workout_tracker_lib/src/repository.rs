use crate::workout::Workout;

/// The canonical ordered collection of workouts. Projections and persisted
/// state are always derived from it, never from each other. Order is
/// insertion order and carries no other meaning.
#[derive(Debug, Default)]
pub struct WorkoutRepository {
    workouts: Vec<Workout>,
}

impl WorkoutRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|workout| workout.id() == id)
    }

    /// Removes the matching workout, keeping the order of the remainder.
    /// Returns `None` when the id is unknown.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Workout> {
        let index = self.workouts.iter().position(|workout| workout.id() == id)?;
        Some(self.workouts.remove(index))
    }

    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }
}
