pub use crate::{
    msg, Action, Enemy, EnemyId, Input, Msg, Runtime, TurnPhase,
};
pub use glam::{ivec2, vec2, IVec2, Vec2};
pub use util::{HashSet, IndexMap, VecExt, DIR_4, DIR_8};
