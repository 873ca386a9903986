//! Master data: building tiles, blueprint cards, terrain layout.
//!
//! A [`Catalog`] is supplied when [`crate::Rules`] is built and is never
//! mutated afterwards. [`Catalog::reference`] carries the standard set
//! of 36 buildings and 24 blueprints.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RulesError;
use crate::board::TerrainLayout;
use crate::ledger::{Resource, Resources, WorkerKind};

/// Most worker slots a single building may carry.
pub const MAX_SLOTS_PER_TILE: u8 = 8;

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileCategory {
    Palace,
    Government,
    Religious,
    Commercial,
    Residential,
    Gate,
}

impl TileCategory {
    pub const ALL: [TileCategory; 6] = [
        Self::Palace,
        Self::Government,
        Self::Religious,
        Self::Commercial,
        Self::Residential,
        Self::Gate,
    ];

    /// The resource a worker on a building of this category collects.
    pub fn produces(&self) -> Option<Resource> {
        match self {
            Self::Government => Some(Resource::Ink),
            Self::Religious => Some(Resource::Tile),
            Self::Commercial => Some(Resource::Stone),
            Self::Residential => Some(Resource::Wood),
            Self::Palace | Self::Gate => None,
        }
    }
}

impl fmt::Display for TileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Palace => "palace",
            Self::Government => "government",
            Self::Religious => "religious",
            Self::Commercial => "commercial",
            Self::Residential => "residential",
            Self::Gate => "gate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub String);

impl From<&str> for TileId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `+points` for each orthogonally adjacent building of `category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyRule {
    pub category: TileCategory,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub id: TileId,
    pub category: TileCategory,
    pub name: String,
    pub cost: Resources,
    pub base_points: u32,
    /// Awarded in full for mountain-behind plus water-in-front.
    pub terrain_points: u32,
    pub adjacency: Vec<AdjacencyRule>,
    pub apprentice_slots: u8,
    pub official_slots: u8,
}

impl TileDefinition {
    pub fn slot_count(&self) -> u8 {
        self.apprentice_slots.saturating_add(self.official_slots)
    }

    /// Apprentice slots come first, then official slots.
    pub fn slot_kind(&self, slot: u8) -> Option<WorkerKind> {
        if slot < self.apprentice_slots {
            Some(WorkerKind::Apprentice)
        } else if slot < self.slot_count() {
            Some(WorkerKind::Official)
        } else {
            None
        }
    }

    pub fn slots_for(&self, kind: WorkerKind) -> std::ops::Range<u8> {
        match kind {
            WorkerKind::Apprentice => 0..self.apprentice_slots,
            WorkerKind::Official => self.apprentice_slots..self.slot_count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Blueprints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlueprintId(pub String);

impl From<&str> for BlueprintId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for BlueprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// End-of-game condition on a blueprint card. Evaluated by
/// [`crate::blueprint::is_satisfied`] against the owner's buildings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlueprintCondition {
    /// At least `min_count` own buildings orthogonally next to any palace.
    PalaceAdjacent { min_count: usize },
    /// Some palace has own buildings on at least `directions` sides.
    PalaceSurround { directions: usize },
    PalaceAdjacentCategory { category: TileCategory, min_count: usize },
    CategoryCount { category: TileCategory, min_count: usize },
    DiverseCategories { min_types: usize },
    RowCount { min_count: usize },
    ColumnCount { min_count: usize },
    /// A consecutive diagonal run, either direction.
    DiagonalRun { min_count: usize },
    Cluster2x2,
    CornerCount { min_count: usize },
    /// Own buildings inside the central 3×3.
    CenterCount { min_count: usize },
    TerrainBonusCount { min_count: usize },
    AllWorkersPlaced,
    ResourcesAtMost { max_total: u32 },
    /// Own buildings form one orthogonally connected group.
    AllConnected,
    TileCount { min_count: usize },
    BalancedCategories { categories: Vec<TileCategory>, min_each: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintDefinition {
    pub id: BlueprintId,
    pub name: String,
    pub condition: BlueprintCondition,
    pub bonus_points: u32,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Read-only master data for one ruleset.
#[derive(Debug, Clone)]
pub struct Catalog {
    tiles: Vec<TileDefinition>,
    blueprints: Vec<BlueprintDefinition>,
    layout: TerrainLayout,
    tile_index: HashMap<TileId, usize>,
    blueprint_index: HashMap<BlueprintId, usize>,
}

impl Catalog {
    /// Builds a catalog from externally supplied definitions.
    ///
    /// # Errors
    /// `InvalidConfig` on duplicate ids, an empty tile set, a layout
    /// with nowhere to build, or a building with no worker slots or
    /// more than [`MAX_SLOTS_PER_TILE`].
    pub fn new(
        tiles: Vec<TileDefinition>,
        blueprints: Vec<BlueprintDefinition>,
        layout: TerrainLayout,
    ) -> Result<Self, RulesError> {
        if tiles.is_empty() {
            return Err(RulesError::InvalidConfig("catalog has no tiles".into()));
        }
        if layout.buildable_cells() == 0 {
            return Err(RulesError::InvalidConfig("terrain layout has no buildable cell".into()));
        }
        let mut seen = HashSet::new();
        for tile in &tiles {
            if !seen.insert(&tile.id) {
                return Err(RulesError::InvalidConfig(format!("duplicate tile id {}", tile.id)));
            }
            let slots = u16::from(tile.apprentice_slots) + u16::from(tile.official_slots);
            if slots == 0 {
                let msg = format!("tile {} has no worker slots", tile.id);
                return Err(RulesError::InvalidConfig(msg));
            }
            if slots > u16::from(MAX_SLOTS_PER_TILE) {
                return Err(RulesError::InvalidConfig(format!(
                    "tile {} has {slots} worker slots, at most {MAX_SLOTS_PER_TILE} allowed",
                    tile.id
                )));
            }
        }
        let mut seen = HashSet::new();
        for bp in &blueprints {
            if !seen.insert(&bp.id) {
                return Err(RulesError::InvalidConfig(format!("duplicate blueprint id {}", bp.id)));
            }
        }
        Ok(Self::indexed(tiles, blueprints, layout))
    }

    fn indexed(
        tiles: Vec<TileDefinition>,
        blueprints: Vec<BlueprintDefinition>,
        layout: TerrainLayout,
    ) -> Self {
        let tile_index = tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        let blueprint_index = blueprints
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();
        Self {
            tiles,
            blueprints,
            layout,
            tile_index,
            blueprint_index,
        }
    }

    /// The standard 36 buildings, 24 blueprints and reference layout.
    pub fn reference() -> Self {
        Self::indexed(reference_tiles(), reference_blueprints(), TerrainLayout::reference())
    }

    pub fn tile(&self, id: &TileId) -> Option<&TileDefinition> {
        self.tile_index.get(id).and_then(|i| self.tiles.get(*i))
    }

    pub fn blueprint(&self, id: &BlueprintId) -> Option<&BlueprintDefinition> {
        self.blueprint_index.get(id).and_then(|i| self.blueprints.get(*i))
    }

    pub fn tiles(&self) -> &[TileDefinition] {
        &self.tiles
    }

    pub fn blueprints(&self) -> &[BlueprintDefinition] {
        &self.blueprints
    }

    pub fn layout(&self) -> &TerrainLayout {
        &self.layout
    }

    /// Category of a tile id, if known.
    pub fn category(&self, id: &TileId) -> Option<TileCategory> {
        self.tile(id).map(|t| t.category)
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

fn tile(
    id: &str,
    category: TileCategory,
    name: &str,
    [wood, stone, tile, ink]: [u32; 4],
    base_points: u32,
    terrain_points: u32,
    adjacency: &[(TileCategory, u32)],
) -> TileDefinition {
    TileDefinition {
        id: TileId::from(id),
        category,
        name: name.to_owned(),
        cost: Resources::new(wood, stone, tile, ink),
        base_points,
        terrain_points,
        adjacency: adjacency
            .iter()
            .map(|&(category, points)| AdjacencyRule { category, points })
            .collect(),
        apprentice_slots: if category == TileCategory::Gate { 1 } else { 2 },
        official_slots: 1,
    }
}

#[rustfmt::skip]
fn reference_tiles() -> Vec<TileDefinition> {
    use TileCategory::*;
    vec![
        tile("palace_1", Palace, "Gyeongbokgung Palace", [3, 3, 2, 1], 8, 4, &[(Government, 2)]),
        tile("palace_2", Palace, "Changdeokgung Palace", [3, 2, 2, 1], 7, 4, &[(Religious, 2)]),
        tile("palace_3", Palace, "Gyeonghuigung Palace", [2, 3, 2, 1], 6, 3, &[(Palace, 3)]),
        tile("palace_4", Palace, "Deoksugung Palace", [2, 2, 2, 1], 5, 3, &[(Commercial, 2)]),
        tile("government_1", Government, "State Council", [2, 2, 0, 1], 4, 2, &[(Palace, 2)]),
        tile(
            "government_2",
            Government,
            "Six Ministries Street",
            [2, 1, 0, 1],
            3,
            2,
            &[(Government, 1)],
        ),
        tile(
            "government_3",
            Government,
            "Office of Inspector General",
            [1, 2, 0, 1],
            3,
            1,
            &[(Palace, 1)],
        ),
        tile("government_4", Government, "Royal Academy", [2, 1, 1, 0], 4, 2, &[(Religious, 1)]),
        tile(
            "government_5",
            Government,
            "Capital Administration",
            [1, 1, 0, 1],
            2,
            1,
            &[(Residential, 1)],
        ),
        tile("government_6", Government, "Royal Secretariat", [1, 2, 0, 0], 2, 1, &[(Palace, 1)]),
        tile("religious_1", Religious, "Jongmyo Shrine", [2, 2, 1, 0], 5, 3, &[(Palace, 2)]),
        tile("religious_2", Religious, "Sajik Altar", [1, 2, 1, 0], 4, 2, &[(Government, 1)]),
        tile("religious_3", Religious, "Wongaksa Temple", [2, 1, 1, 0], 3, 2, &[(Religious, 1)]),
        tile(
            "religious_4",
            Religious,
            "Heungcheonsa Temple",
            [2, 1, 0, 0],
            2,
            1,
            &[(Residential, 1)],
        ),
        tile("religious_5", Religious, "Bongeunsa Temple", [1, 1, 1, 0], 2, 1, &[(Commercial, 1)]),
        tile("religious_6", Religious, "Confucian Shrine", [1, 2, 0, 0], 3, 2, &[(Government, 1)]),
        tile("commercial_1", Commercial, "Market Street", [1, 1, 0, 0], 2, 1, &[(Commercial, 1)]),
        tile("commercial_2", Commercial, "Ihyeon Market", [1, 1, 0, 0], 1, 1, &[(Residential, 1)]),
        tile("commercial_3", Commercial, "Chilpae Market", [2, 1, 0, 0], 2, 1, &[(Gate, 1)]),
        tile("commercial_4", Commercial, "Jongno Street", [1, 2, 0, 0], 3, 1, &[(Government, 1)]),
        tile("commercial_5", Commercial, "Unjongga", [1, 1, 0, 0], 1, 0, &[(Commercial, 1)]),
        tile("commercial_6", Commercial, "Baeogae", [1, 1, 0, 0], 1, 0, &[(Residential, 1)]),
        tile("commercial_7", Commercial, "Gwangtong Bridge", [2, 0, 0, 0], 2, 1, &[]),
        tile("commercial_8", Commercial, "Jeoja Street", [0, 2, 0, 0], 1, 0, &[(Commercial, 1)]),
        tile("residential_1", Residential, "Bukchon", [2, 0, 0, 0], 2, 2, &[(Palace, 1)]),
        tile("residential_2", Residential, "Namchon", [2, 0, 0, 0], 2, 1, &[(Government, 1)]),
        tile("residential_3", Residential, "Seochon", [1, 1, 0, 0], 1, 1, &[(Religious, 1)]),
        tile("residential_4", Residential, "Jungchon", [1, 0, 0, 0], 1, 0, &[(Commercial, 1)]),
        tile("residential_5", Residential, "Pimatgol", [1, 0, 0, 0], 0, 0, &[(Commercial, 1)]),
        tile("residential_6", Residential, "Cheonggyecheon Side", [1, 1, 0, 0], 1, 1, &[]),
        tile("residential_7", Residential, "Gahoe-dong", [2, 0, 0, 0], 1, 1, &[(Residential, 1)]),
        tile("residential_8", Residential, "Insa-dong", [1, 0, 0, 0], 1, 0, &[(Commercial, 1)]),
        tile("gate_1", Gate, "Sungnyemun Gate", [1, 3, 0, 0], 4, 2, &[(Commercial, 2)]),
        tile("gate_2", Gate, "Heunginjimun Gate", [1, 3, 0, 0], 4, 2, &[(Commercial, 2)]),
        tile("gate_3", Gate, "Donuimun Gate", [1, 2, 0, 0], 3, 1, &[(Residential, 1)]),
        tile("gate_4", Gate, "Sukjeongmun Gate", [1, 2, 0, 0], 3, 1, &[(Palace, 1)]),
    ]
}

fn blueprint(
    id: &str,
    name: &str,
    condition: BlueprintCondition,
    bonus_points: u32,
) -> BlueprintDefinition {
    BlueprintDefinition {
        id: BlueprintId::from(id),
        name: name.to_owned(),
        condition,
        bonus_points,
    }
}

#[rustfmt::skip]
fn reference_blueprints() -> Vec<BlueprintDefinition> {
    use BlueprintCondition::*;
    use TileCategory::*;
    vec![
        blueprint("palace_neighbor_1", "Palace Companion", PalaceAdjacent { min_count: 2 }, 4),
        blueprint("palace_neighbor_2", "Palace Guardian", PalaceAdjacent { min_count: 3 }, 6),
        blueprint("palace_neighbor_3", "Royal Steward", PalaceSurround { directions: 4 }, 10),
        blueprint(
            "palace_neighbor_4",
            "Inner Palace Designer",
            PalaceAdjacentCategory { category: Government, min_count: 2 },
            5,
        ),
        blueprint(
            "palace_neighbor_5",
            "Royal Merchant",
            PalaceAdjacentCategory { category: Commercial, min_count: 2 },
            5,
        ),
        blueprint(
            "palace_neighbor_6",
            "Temple Patron",
            PalaceAdjacentCategory { category: Religious, min_count: 1 },
            3,
        ),
        blueprint(
            "collection_commercial",
            "Commerce Tycoon",
            CategoryCount { category: Commercial, min_count: 4 },
            6,
        ),
        blueprint(
            "collection_residential",
            "Residential Developer",
            CategoryCount { category: Residential, min_count: 4 },
            6,
        ),
        blueprint(
            "collection_government",
            "Path of Officials",
            CategoryCount { category: Government, min_count: 3 },
            5,
        ),
        blueprint(
            "collection_religious",
            "Faith Guardian",
            CategoryCount { category: Religious, min_count: 3 },
            5,
        ),
        blueprint(
            "collection_diverse",
            "Jack of All Trades",
            DiverseCategories { min_types: 5 },
            7,
        ),
        blueprint(
            "collection_gate",
            "Gate Master",
            CategoryCount { category: Gate, min_count: 2 },
            4,
        ),
        blueprint("pattern_row", "Row Completion", RowCount { min_count: 4 }, 5),
        blueprint("pattern_column", "Column Completion", ColumnCount { min_count: 4 }, 5),
        blueprint("pattern_diagonal", "Diagonal Line", DiagonalRun { min_count: 3 }, 4),
        blueprint("pattern_cluster", "Dense District", Cluster2x2, 6),
        blueprint("pattern_corner", "Corner Control", CornerCount { min_count: 3 }, 5),
        blueprint("pattern_center", "Center Control", CenterCount { min_count: 5 }, 7),
        blueprint("special_fengshui", "Feng Shui Master", TerrainBonusCount { min_count: 3 }, 6),
        blueprint("special_workers", "Workforce Mobilization", AllWorkersPlaced, 5),
        blueprint("special_efficiency", "Resource Efficiency", ResourcesAtMost { max_total: 3 }, 4),
        blueprint("special_adjacent", "Connected Empire", AllConnected, 8),
        blueprint("special_first_builder", "Pioneer", TileCount { min_count: 6 }, 5),
        blueprint(
            "special_balance",
            "Balanced City",
            BalancedCategories {
                categories: vec![Government, Commercial, Residential],
                min_each: 2,
            },
            6,
        ),
    ]
}
