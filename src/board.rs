use super::*;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// What came off the board when a slot was emptied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub item: Item,
    /// Agents whose token on the slot was cleared along with the card.
    pub owners: Vec<AgentId>,
}

#[derive(Debug)]
struct Grid {
    slots: Vec<Option<Item>>,
    marks: Vec<BTreeSet<Slot>>,
}

/// Shared slot grid with per-agent token marks.
///
/// Only the arbiter places and removes cards; agents place and remove their
/// own tokens. Every mutation takes the write lock, so no two slot mutations
/// interleave, while reads from any number of agents may overlap.
/// Display notifications go out after the lock is released.
pub struct Board {
    grid: RwLock<Grid>,
    surface: Arc<dyn Surface>,
}

impl Board {
    pub fn new(slots: usize, agents: usize, surface: Arc<dyn Surface>) -> Self {
        Self {
            grid: RwLock::new(Grid {
                slots: vec![None; slots],
                marks: vec![BTreeSet::new(); agents],
            }),
            surface,
        }
    }
    /// Puts a card into an empty slot.
    pub fn place(&self, item: Item, slot: Slot) -> anyhow::Result<()> {
        {
            let mut grid = self.grid.write();
            anyhow::ensure!(slot < grid.slots.len(), "slot {} is off the board", slot);
            anyhow::ensure!(grid.slots[slot].is_none(), "slot {} is occupied", slot);
            anyhow::ensure!(
                !grid.slots.contains(&Some(item)),
                "card {} is already on the board",
                item
            );
            grid.slots[slot] = Some(item);
        }
        log::trace!("[board] card {} -> slot {}", item, slot);
        self.surface.place(item, slot);
        Ok(())
    }
    /// Empties a slot along with every token on it.
    /// Returns `None` when the slot held no card.
    pub fn remove(&self, slot: Slot) -> Option<Removal> {
        let removal = self.detach(slot)?;
        self.publish(slot, &removal);
        Some(removal)
    }
    /// Same as [`Board::remove`] but silent. The caller owes a
    /// [`Board::publish`] once it has released whatever else it holds.
    pub fn detach(&self, slot: Slot) -> Option<Removal> {
        let mut grid = self.grid.write();
        let item = grid.slots.get_mut(slot)?.take()?;
        let owners = grid
            .marks
            .iter_mut()
            .enumerate()
            .filter_map(|(agent, marks)| marks.remove(&slot).then_some(agent))
            .collect::<Vec<AgentId>>();
        log::trace!("[board] card {} <- slot {}", item, slot);
        Some(Removal { item, owners })
    }
    pub fn publish(&self, slot: Slot, removal: &Removal) {
        removal
            .owners
            .iter()
            .for_each(|&agent| self.surface.token(agent, slot, false));
        self.surface.clear(slot);
    }
    /// Places an agent's token. Fails on empty slots and on slots the agent
    /// already marked.
    pub fn mark(&self, agent: AgentId, slot: Slot) -> bool {
        let placed = {
            let mut grid = self.grid.write();
            let occupied = matches!(grid.slots.get(slot), Some(Some(_)));
            occupied
                && grid
                    .marks
                    .get_mut(agent)
                    .map(|marks| marks.insert(slot))
                    .unwrap_or(false)
        };
        if placed {
            self.surface.token(agent, slot, true);
        }
        placed
    }
    /// Removes an agent's token. Returns whether one was there.
    pub fn unmark(&self, agent: AgentId, slot: Slot) -> bool {
        let removed = self
            .grid
            .write()
            .marks
            .get_mut(agent)
            .map(|marks| marks.remove(&slot))
            .unwrap_or(false);
        if removed {
            self.surface.token(agent, slot, false);
        }
        removed
    }
    pub fn is_marked(&self, agent: AgentId, slot: Slot) -> bool {
        self.grid
            .read()
            .marks
            .get(agent)
            .map(|marks| marks.contains(&slot))
            .unwrap_or(false)
    }
    /// Slots an agent has marked, ascending.
    pub fn tokens(&self, agent: AgentId) -> Vec<Slot> {
        self.grid
            .read()
            .marks
            .get(agent)
            .map(|marks| marks.iter().copied().collect())
            .unwrap_or_default()
    }
    /// Removes every token of every agent.
    pub fn clear_marks(&self) {
        let stripped = self.strip_marks();
        self.publish_unmarks(&stripped);
    }
    /// Silent [`Board::clear_marks`], returning what was cleared.
    pub fn strip_marks(&self) -> Vec<(AgentId, Slot)> {
        self.grid
            .write()
            .marks
            .iter_mut()
            .enumerate()
            .flat_map(|(agent, marks)| {
                std::mem::take(marks)
                    .into_iter()
                    .map(move |slot| (agent, slot))
            })
            .collect()
    }
    pub fn publish_unmarks(&self, stripped: &[(AgentId, Slot)]) {
        stripped
            .iter()
            .for_each(|&(agent, slot)| self.surface.token(agent, slot, false));
    }
    /// Removes every token of one agent, returning how many there were.
    pub fn clear_marks_of(&self, agent: AgentId) -> usize {
        let cleared = self
            .grid
            .write()
            .marks
            .get_mut(agent)
            .map(std::mem::take)
            .unwrap_or_default();
        cleared
            .iter()
            .for_each(|&slot| self.surface.token(agent, slot, false));
        cleared.len()
    }
    /// Number of slots holding a card.
    pub fn count(&self) -> usize {
        self.grid.read().slots.iter().flatten().count()
    }
    pub fn item(&self, slot: Slot) -> Option<Item> {
        self.grid.read().slots.get(slot).copied().flatten()
    }
    /// Cards in the given slots, or `None` if any of them is empty.
    pub fn items(&self, slots: &[Slot]) -> Option<Vec<Item>> {
        let grid = self.grid.read();
        slots
            .iter()
            .map(|&slot| grid.slots.get(slot).copied().flatten())
            .collect()
    }
    /// Every card on the board, in slot order.
    pub fn cards(&self) -> Vec<Item> {
        self.grid.read().slots.iter().flatten().copied().collect()
    }
    pub fn snapshot(&self) -> Vec<Option<Item>> {
        self.grid.read().slots.clone()
    }
    pub fn empty_slots(&self) -> Vec<Slot> {
        self.grid
            .read()
            .slots
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_none())
            .map(|(slot, _)| slot)
            .collect()
    }
    pub fn filled_slots(&self) -> Vec<Slot> {
        self.grid
            .read()
            .slots
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_some())
            .map(|(slot, _)| slot)
            .collect()
    }
    /// Slot holding a card, if it is on the board.
    pub fn locate(&self, item: Item) -> Option<Slot> {
        self.grid
            .read()
            .slots
            .iter()
            .position(|&held| held == Some(item))
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board").field("grid", &*self.grid.read()).finish()
    }
}
