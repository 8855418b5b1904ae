mod data;
pub use data::{
    Data, EnemyKind, Monster, Settings, Spell, SpellEffect, SpellId,
    StatusKind, TargetType,
};

mod level;
pub use level::{Level, Room, TileKind};

pub mod mapgen;
pub use mapgen::{LevelProvider, RoomsAndCorridors};
