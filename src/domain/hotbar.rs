/// Inventory hotbar: a fixed row of optional item slots plus a selection.
///
/// Display state only. Items have no use or equip effect.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub name: String,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Item { name: name.into() }
    }
}

/// Edge-triggered selection request.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HotbarInput {
    Select(usize),
    Next,
    Prev,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hotbar {
    slots: Vec<Option<Item>>,
    selected: usize,
}

impl Hotbar {
    /// Fill slots left to right. Blank names leave the slot empty;
    /// names beyond `slot_count` are dropped.
    pub fn new<S: AsRef<str>>(slot_count: usize, names: &[S]) -> Self {
        let slot_count = slot_count.max(1);
        let mut slots: Vec<Option<Item>> = names
            .iter()
            .take(slot_count)
            .map(|n| {
                let n = n.as_ref().trim();
                (!n.is_empty()).then(|| Item::new(n))
            })
            .collect();
        slots.resize(slot_count, None);

        if names.len() > slot_count {
            tracing::warn!(
                dropped = names.len() - slot_count,
                slot_count,
                "hotbar has more items than slots"
            );
        }

        Hotbar { slots, selected: 0 }
    }

    pub fn slots(&self) -> &[Option<Item>] { &self.slots }
    pub fn selected(&self) -> usize { self.selected }

    pub fn selected_item(&self) -> Option<&Item> {
        self.slots[self.selected].as_ref()
    }

    /// Select a slot by index. Returns `false` (no change) when out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        self.selected = index;
        true
    }

    /// Apply an input; returns the newly selected slot when it changed.
    pub fn apply(&mut self, input: HotbarInput) -> Option<usize> {
        let before = self.selected;
        match input {
            HotbarInput::Select(i) => { self.select(i); }
            HotbarInput::Next => self.cycle(1),
            HotbarInput::Prev => self.cycle(-1),
        }
        (self.selected != before).then_some(self.selected)
    }

    /// Move the selection by `delta`, wrapping at both ends.
    pub fn cycle(&mut self, delta: i32) {
        let n = self.slots.len() as i64;
        self.selected = (self.selected as i64 + delta as i64).rem_euclid(n) as usize;
    }
}
