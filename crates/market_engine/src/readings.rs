//! Indexed view over a snapshot's usable readings.

use std::collections::HashMap;

use common::{InstrumentId, InstrumentSnapshot};

/// Lookup of non-error readings by instrument id.
///
/// Errored entries are dropped at indexing time, so rule and pair
/// evaluation treat them exactly like absent instruments.
pub(crate) struct Readings<'a> {
    by_id: HashMap<InstrumentId, &'a InstrumentSnapshot>,
}

impl<'a> Readings<'a> {
    pub(crate) fn index(instruments: &'a [InstrumentSnapshot]) -> Self {
        let by_id = instruments
            .iter()
            .filter(|reading| reading.is_ok())
            .map(|reading| (reading.id, reading))
            .collect();
        Self { by_id }
    }

    pub(crate) fn get(&self, id: InstrumentId) -> Option<&'a InstrumentSnapshot> {
        self.by_id.get(&id).copied()
    }

    pub(crate) fn has_all(&self, ids: &[InstrumentId]) -> bool {
        ids.iter().all(|id| self.by_id.contains_key(id))
    }
}
