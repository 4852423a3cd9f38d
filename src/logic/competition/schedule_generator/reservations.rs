// Slots taken during one scheduling run: the ones the store already holds,
// and the ones claimed by this run before any of them is persisted.
use std::collections::{HashMap, HashSet};

use time::Date;

use crate::logic::{store::OccupiedSlot, time::TimeOfDay};

#[derive(Debug, Default)]
pub struct Reservations {
    days: HashMap<Date, HashSet<TimeOfDay>>,
    loaded: HashSet<Date>,  // Days whose stored matches have been read.
}

impl Reservations {
    pub fn is_loaded(&self, date: Date) -> bool {
        self.loaded.contains(&date)
    }

    // Record what the store holds for the day. Slots of other days are ignored.
    pub fn load(&mut self, date: Date, persisted: &[OccupiedSlot]) {
        let slots = self.days.entry(date).or_default();
        for slot in persisted.iter().filter(|s| s.date == date) {
            slots.insert(slot.time_slot);
        }
        self.loaded.insert(date);
    }

    // Claim the slot. Return false if it was already taken.
    pub fn claim(&mut self, date: Date, time_slot: TimeOfDay) -> bool {
        self.days.entry(date).or_default().insert(time_slot)
    }
}
