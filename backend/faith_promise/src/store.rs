//! Form state store: field values, the touched set, and change observers.
//!
//! Pure data holder; validation is driven by the controller after each
//! mutation.

use std::collections::BTreeSet;

use tracing::trace;

use crate::form::{Field, FieldUpdate, FormData};

/// What changed in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    FieldChanged(Field),
    Touched(Field),
    Reset,
}

pub type Observer = Box<dyn FnMut(StoreEvent, &FormData) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct FormStateStore {
    data: FormData,
    touched: BTreeSet<Field>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl FormStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn touched(&self) -> &BTreeSet<Field> {
        &self.touched
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    /// Overwrite exactly one field.
    pub fn set_field(&mut self, update: FieldUpdate) {
        let field = update.field();
        update.apply(&mut self.data);
        trace!("store: {field} changed");
        self.notify(StoreEvent::FieldChanged(field));
    }

    /// Add `field` to the touched set. Observers only hear about the first
    /// touch.
    pub fn mark_touched(&mut self, field: Field) {
        if self.touched.insert(field) {
            self.notify(StoreEvent::Touched(field));
        }
    }

    /// Replace the data with the empty form and clear the touched set.
    pub fn reset(&mut self) {
        self.data = FormData::default();
        self.touched.clear();
        self.notify(StoreEvent::Reset);
    }

    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(event, &self.data);
        }
    }
}

impl std::fmt::Debug for FormStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormStateStore")
            .field("data", &self.data)
            .field("touched", &self.touched)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::form::{CanonicalAmount, PaymentMethod};

    fn recording(store: &mut FormStateStore) -> (SubscriptionId, Arc<Mutex<Vec<StoreEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(Box::new(move |event, _| sink.lock().unwrap().push(event)));
        (id, seen)
    }

    #[test]
    fn set_field_leaves_other_fields_alone() {
        let mut store = FormStateStore::new();
        store.set_field(FieldUpdate::FullName("Budi".into()));
        store.set_field(FieldUpdate::PaymentMethod(Some(PaymentMethod::Cash)));
        store.set_field(FieldUpdate::FaithPromise(CanonicalAmount::from_input("1.000")));

        let data = store.data();
        assert_eq!(data.full_name, "Budi");
        assert_eq!(data.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(data.faith_promise.as_str(), "1000");
        assert_eq!(data.proof_of_transfer, None);
    }

    #[test]
    fn mark_touched_is_idempotent() {
        let mut store = FormStateStore::new();
        let (_, seen) = recording(&mut store);
        store.mark_touched(Field::FullName);
        store.mark_touched(Field::FullName);
        assert_eq!(store.touched().len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![StoreEvent::Touched(Field::FullName)]);
    }

    #[test]
    fn reset_restores_empty_instance() {
        let mut store = FormStateStore::new();
        store.set_field(FieldUpdate::FullName("Budi".into()));
        store.mark_touched(Field::FullName);
        store.reset();
        assert_eq!(*store.data(), FormData::default());
        assert!(store.touched().is_empty());
    }

    #[test]
    fn observers_see_post_mutation_snapshot() {
        let mut store = FormStateStore::new();
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&names);
        store.subscribe(Box::new(move |_, data| {
            sink.lock().unwrap().push(data.full_name.clone())
        }));
        store.set_field(FieldUpdate::FullName("A".into()));
        store.set_field(FieldUpdate::FullName("AB".into()));
        store.reset();
        assert_eq!(*names.lock().unwrap(), vec!["A", "AB", ""]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = FormStateStore::new();
        let (id, seen) = recording(&mut store);
        store.set_field(FieldUpdate::FullName("A".into()));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.reset();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![StoreEvent::FieldChanged(Field::FullName)]
        );
    }
}
