//! Game events for the presentation layer

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Event the presentation layer may want to show.
///
/// The runtime queues these up and the presentation drains them with
/// `Runtime::drain_msgs`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum Msg {
    /// Text message.
    Message(String),

    /// A projectile was launched between two visual positions.
    Fire(Vec2, Vec2),

    /// Actor at cell lost health.
    Hurt(IVec2, i32),

    /// Actor at cell dies.
    Death(IVec2),

    /// Splash damage centered on a cell with a radius.
    Explosion(IVec2, i32),

    /// Player entered a new dungeon depth.
    Descend(u32),
}

#[macro_export]
macro_rules! msg {
    ($r:expr, $($arg:tt)*) => {
        $r.send_msg($crate::Msg::Message(
            ::util::StrExt::capitalize(format!($($arg)*).as_str()),
        ))
    };
}
