use ahash::AHashMap;

use crate::error::{Error, Result};
use crate::types::{DeviceId, PlayerSlot, Target};

/// A registered controller: identity, open session and player slot.
#[derive(Debug)]
pub struct ControllerRecord<D> {
    id: DeviceId,
    device: D,
    slot: PlayerSlot,
}

impl<D> ControllerRecord<D> {
    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub(crate) fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

/// Owner of every open controller session, keyed by device identity.
///
/// Records are only added or removed by the poll path. Everything else gets
/// shared access, or mutable access to the devices of an existing record set.
#[derive(Debug)]
pub struct Registry<D> {
    records: AHashMap<DeviceId, ControllerRecord<D>>,
}

impl<D> Default for Registry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Registry<D> {
    pub fn new() -> Self {
        Self {
            records: AHashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, id: DeviceId, device: D, slot: PlayerSlot) -> Result<()> {
        if self.records.contains_key(&id) {
            return Err(Error::AlreadyRegistered(id));
        }
        self.records.insert(id, ControllerRecord { id, device, slot });
        Ok(())
    }

    /// Removes the record and closes its session. Unknown ids are a no-op.
    pub(crate) fn remove(&mut self, id: DeviceId) -> Option<ControllerRecord<D>> {
        self.records.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, id: DeviceId) -> Option<&ControllerRecord<D>> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.records.contains_key(&id)
    }

    /// Slot of the controller, `None` if it is not registered.
    pub fn slot_of(&self, id: DeviceId) -> Option<PlayerSlot> {
        self.get(id).map(ControllerRecord::slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControllerRecord<D>> {
        self.records.values()
    }

    pub fn slots(&self) -> impl Iterator<Item = PlayerSlot> + '_ {
        self.records.values().map(ControllerRecord::slot)
    }

    /// Records a command addressed to `target` reaches.
    pub(crate) fn targets_mut(
        &mut self,
        target: Target,
    ) -> impl Iterator<Item = &mut ControllerRecord<D>> {
        self.records
            .values_mut()
            .filter(move |record| target.addresses(record.slot))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: u8) -> PlayerSlot {
        PlayerSlot::new(n).unwrap()
    }

    #[test]
    fn insert_rejects_known_id() {
        let mut registry = Registry::new();
        registry.insert(10, "first", slot(1)).unwrap();
        let err = registry.insert(10, "second", slot(2)).unwrap_err();
        assert!(matches!(err, Error::AlreadyRegistered(10)));
        assert_eq!(registry.get(10).map(|r| *r.device()), Some("first"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = Registry::new();
        registry.insert(1, (), slot(1)).unwrap();
        assert!(registry.remove(1).is_some());
        assert!(registry.remove(1).is_none());
        assert!(registry.remove(42).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn lookup_reports_slot() {
        let mut registry = Registry::new();
        registry.insert(5, (), slot(3)).unwrap();
        assert_eq!(registry.slot_of(5), Some(slot(3)));
        assert_eq!(registry.slot_of(6), None);
        assert!(registry.contains(5));
    }

    #[test]
    fn targets_filter_by_slot() {
        let mut registry = Registry::new();
        registry.insert(1, (), slot(1)).unwrap();
        registry.insert(2, (), slot(2)).unwrap();
        registry.insert(3, (), PlayerSlot::UNASSIGNED).unwrap();

        assert_eq!(registry.targets_mut(Target::ALL).count(), 3);

        let ids: Vec<_> = registry.targets_mut(slot(2).into()).map(|r| r.id()).collect();
        assert_eq!(ids, vec![2]);

        assert_eq!(registry.targets_mut(slot(4).into()).count(), 0);
        assert_eq!(registry.targets_mut(Target::player(9)).count(), 0);
    }

    #[test]
    fn removal_drops_the_device() {
        use std::rc::Rc;

        let device = Rc::new(());
        let mut registry = Registry::new();
        registry.insert(1, Rc::clone(&device), slot(1)).unwrap();
        assert_eq!(Rc::strong_count(&device), 2);
        registry.remove(1);
        assert_eq!(Rc::strong_count(&device), 1);
    }
}
