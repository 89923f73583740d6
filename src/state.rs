// src/state.rs
use crate::repository::{Entity, Repository, Store};

#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// A repository for `E` that joins `default_joins` into every read.
    pub fn repository<E: Entity>(&self, default_joins: &[&'static str]) -> Repository<E, S> {
        Repository::new(self.store.clone(), default_joins)
    }
}
