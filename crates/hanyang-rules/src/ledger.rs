//! Resource and worker ledger.
//!
//! Counters are unsigned, so "never negative" holds by construction.
//! Every decrement goes through a checked operation; an underflow
//! surfaces as `None`/`false` and the caller turns that into a
//! rejection or an invariant violation.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// The four fungible building materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Wood,
    Stone,
    Tile,
    Ink,
}

impl Resource {
    pub const ALL: [Resource; 4] = [Self::Wood, Self::Stone, Self::Tile, Self::Ink];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Tile => "tile",
            Self::Ink => "ink",
        };
        f.write_str(name)
    }
}

/// A vector of resource amounts. Used for holdings, costs and caps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    pub wood: u32,
    pub stone: u32,
    pub tile: u32,
    pub ink: u32,
}

impl Resources {
    pub const fn new(wood: u32, stone: u32, tile: u32, ink: u32) -> Self {
        Self {
            wood,
            stone,
            tile,
            ink,
        }
    }

    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Stone => self.stone,
            Resource::Tile => self.tile,
            Resource::Ink => self.ink,
        }
    }

    fn get_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Stone => &mut self.stone,
            Resource::Tile => &mut self.tile,
            Resource::Ink => &mut self.ink,
        }
    }

    /// Sum of all four, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        Resource::ALL
            .into_iter()
            .fold(0u32, |sum, r| sum.saturating_add(self.get(r)))
    }

    /// Component-wise `self >= cost`.
    pub fn covers(&self, cost: &Resources) -> bool {
        Resource::ALL.iter().all(|r| self.get(*r) >= cost.get(*r))
    }

    /// Component-wise subtraction, or `None` if any component would go
    /// below zero.
    pub fn checked_sub(&self, cost: &Resources) -> Option<Resources> {
        Some(Resources {
            wood: self.wood.checked_sub(cost.wood)?,
            stone: self.stone.checked_sub(cost.stone)?,
            tile: self.tile.checked_sub(cost.tile)?,
            ink: self.ink.checked_sub(cost.ink)?,
        })
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        let slot = self.get_mut(resource);
        *slot = slot.saturating_add(amount);
    }

    /// Adds `amount` of `resource`, clamped at `caps`. Returns how much
    /// was actually added.
    pub fn add_capped(&mut self, resource: Resource, amount: u32, caps: &Resources) -> u32 {
        let cap = caps.get(resource);
        let slot = self.get_mut(resource);
        let before = *slot;
        *slot = before.saturating_add(amount).min(cap.max(before));
        *slot - before
    }

    /// Returns the first resource that is above its cap, if any.
    pub fn first_over(&self, caps: &Resources) -> Option<Resource> {
        Resource::ALL
            .into_iter()
            .find(|r| self.get(*r) > caps.get(*r))
    }

    /// The resource with the smallest holding. Ties go to the earlier
    /// entry of [`Resource::ALL`].
    pub fn scarcest(&self) -> Resource {
        Resource::ALL
            .into_iter()
            .min_by_key(|r| self.get(*r))
            .unwrap_or(Resource::Wood)
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{wood:{}, stone:{}, tile:{}, ink:{}}}",
            self.wood, self.stone, self.tile, self.ink
        )
    }
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

/// Apprentices are temporary and get recalled; officials stay where
/// they are put for the rest of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    Apprentice,
    Official,
}

impl WorkerKind {
    pub const ALL: [WorkerKind; 2] = [Self::Apprentice, Self::Official];

    /// Officials are never recalled once committed.
    pub fn is_recallable(&self) -> bool {
        matches!(self, Self::Apprentice)
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apprentice => f.write_str("apprentice"),
            Self::Official => f.write_str("official"),
        }
    }
}

/// One worker pool. `available + placed == total` at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPool {
    pub total: u32,
    pub available: u32,
    pub placed: u32,
}

impl WorkerPool {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            available: total,
            placed: 0,
        }
    }

    /// Moves one worker from `available` to `placed`.
    pub fn try_place(&mut self) -> bool {
        if self.available == 0 {
            return false;
        }
        self.available -= 1;
        self.placed += 1;
        true
    }

    /// Moves `count` workers from `placed` back to `available`.
    pub fn try_release(&mut self, count: u32) -> bool {
        if self.placed < count {
            return false;
        }
        self.placed -= count;
        self.available += count;
        true
    }

    pub fn is_consistent(&self) -> bool {
        self.available.checked_add(self.placed) == Some(self.total)
    }
}

/// Both of a player's worker pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workers {
    pub apprentices: WorkerPool,
    pub officials: WorkerPool,
}

impl Workers {
    pub fn new(apprentices: u32, officials: u32) -> Self {
        Self {
            apprentices: WorkerPool::new(apprentices),
            officials: WorkerPool::new(officials),
        }
    }

    pub fn pool(&self, kind: WorkerKind) -> &WorkerPool {
        match kind {
            WorkerKind::Apprentice => &self.apprentices,
            WorkerKind::Official => &self.officials,
        }
    }

    pub fn pool_mut(&mut self, kind: WorkerKind) -> &mut WorkerPool {
        match kind {
            WorkerKind::Apprentice => &mut self.apprentices,
            WorkerKind::Official => &mut self.officials,
        }
    }

    pub fn all_placed(&self) -> bool {
        self.apprentices.available == 0 && self.officials.available == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_is_component_wise() {
        let held = Resources::new(3, 3, 2, 1);
        assert!(held.covers(&Resources::new(3, 3, 2, 1)));
        assert!(held.covers(&Resources::new(0, 0, 0, 0)));
        assert!(!held.covers(&Resources::new(0, 0, 0, 2)));
    }

    #[test]
    fn test_checked_sub_rejects_underflow() {
        let held = Resources::new(1, 2, 0, 0);
        assert_eq!(
            held.checked_sub(&Resources::new(1, 1, 0, 0)),
            Some(Resources::new(0, 1, 0, 0))
        );
        assert_eq!(held.checked_sub(&Resources::new(0, 0, 1, 0)), None);
    }

    #[test]
    fn test_add_capped_clamps_at_cap() {
        let caps = Resources::new(10, 10, 6, 4);
        let mut held = Resources::new(0, 0, 0, 3);
        assert_eq!(held.add_capped(Resource::Ink, 2, &caps), 1);
        assert_eq!(held.ink, 4);
        assert_eq!(held.add_capped(Resource::Wood, 2, &caps), 2);
        assert_eq!(held.wood, 2);
    }

    #[test]
    fn test_total_saturates() {
        assert_eq!(Resources::new(2, 2, 0, 1).total(), 5);
        assert_eq!(Resources::new(u32::MAX, 1, 0, 0).total(), u32::MAX);
    }

    #[test]
    fn test_scarcest_prefers_earlier_on_tie() {
        assert_eq!(Resources::new(2, 2, 0, 0).scarcest(), Resource::Tile);
        assert_eq!(Resources::new(1, 1, 1, 1).scarcest(), Resource::Wood);
    }

    #[test]
    fn test_worker_pool_place_and_release() {
        let mut pool = WorkerPool::new(2);
        assert!(pool.try_place());
        assert!(pool.try_place());
        assert!(!pool.try_place());
        assert_eq!((pool.available, pool.placed), (0, 2));
        assert!(pool.is_consistent());

        assert!(!pool.try_release(3));
        assert!(pool.try_release(2));
        assert_eq!((pool.available, pool.placed), (2, 0));
        assert!(pool.is_consistent());
    }

    #[test]
    fn test_worker_pool_detects_inconsistency() {
        let pool = WorkerPool {
            total: 3,
            available: 2,
            placed: 2,
        };
        assert!(!pool.is_consistent());
    }

    #[test]
    fn test_only_apprentices_are_recallable() {
        assert!(WorkerKind::Apprentice.is_recallable());
        assert!(!WorkerKind::Official.is_recallable());
    }
}
