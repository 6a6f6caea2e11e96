use crate::registry::Registry;
use crate::types::PlayerSlot;

/// Lowest player number in `1..=7` not held by a registered controller,
/// or [`PlayerSlot::UNASSIGNED`] when all seven are taken.
pub fn next_slot<D>(registry: &Registry<D>) -> PlayerSlot {
    let mut held = [false; PlayerSlot::MAX as usize + 1];
    for slot in registry.slots() {
        held[usize::from(slot.get())] = true;
    }

    (1..=PlayerSlot::MAX)
        .find(|&n| !held[usize::from(n)])
        .and_then(PlayerSlot::new)
        .unwrap_or(PlayerSlot::UNASSIGNED)
}
