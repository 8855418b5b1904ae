//! Game logic layer machinery.

/// Asset key for the missiles fired by orbitals.
pub const ORBITAL_BOLT_ASSET: &str = "orbital-bolt";

mod action;
pub use action::Action;

mod actor;
pub use actor::{Body, Enemy, EnemyId, Movement, Player, StatusEffect};

mod ai;
pub use ai::plan;

mod assets;
pub use assets::{AssetTable, Assets, ResourceId};

mod input;
pub use input::Input;

mod msg;
pub use msg::Msg;

mod occupancy;
pub use occupancy::{Occupancy, Occupant};

mod phase;
pub use phase::TurnPhase;

pub mod power;
pub use power::{CastError, CastOutcome, Rejection};

pub mod prelude;

mod projectile;
pub use projectile::{
    Aim, OrbitalEvent, OrbitalMissile, OrbitalState, Payload, Projectile,
};

mod runtime;
pub use runtime::Runtime;

mod visibility;
pub use visibility::Visibility;
