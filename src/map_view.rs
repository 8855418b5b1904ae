use engine::prelude::*;
use world::TileKind;

/// Draw what the player can currently see as text.
///
/// Unseen cells are blank, dimly lit floor shows as `,`.
pub fn draw_map(r: &Runtime) -> String {
    let level = r.level();
    let mut grid: Vec<Vec<char>> = (0..level.height())
        .map(|_| vec![' '; level.width() as usize])
        .collect();

    let mut put = |p: IVec2, c: char| {
        if level.contains(p) {
            grid[p.y as usize][p.x as usize] = c;
        }
    };

    for p in level.positions() {
        let light = r.visibility().at(p);
        if light <= 0.0 {
            continue;
        }

        let c = match level.tile(p) {
            _ if p == level.end() => '>',
            TileKind::Floor if light < 1.0 => ',',
            TileKind::Floor => '.',
            TileKind::Wall => '#',
            TileKind::Void => ' ',
        };
        put(p, c);
    }

    for e in r.enemies() {
        let p = e.body().pos();
        if e.body().is_alive() && r.visibility().is_visible(p) {
            put(p, r.data().monster(e.kind()).icon);
        }
    }

    for m in r.projectiles() {
        put(m.pos().round().as_ivec2(), '*');
    }

    put(r.player().body().pos(), '@');

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status_line(r: &Runtime) -> String {
    let p = r.player();
    let mut ret = format!(
        "depth {}  turn {}  hp {}/{}  mp {}/{}  gold {}",
        r.depth(),
        r.turn(),
        p.body().health.max(0),
        p.body().max_health,
        p.mana,
        p.max_mana,
        p.gold
    );

    for s in p.body().statuses() {
        ret.push_str(&format!("  {:?}({})", s.kind, s.turns_left));
    }
    if r.phase() == TurnPhase::GameOver {
        ret.push_str("  DEAD");
    }
    ret
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engine::AssetTable;
    use pretty_assertions::assert_eq;
    use world::{Data, EnemyKind, Level};

    use super::*;

    #[test]
    fn draw_corridor() {
        let level = Level::from_ascii(
            "
            #######
            #<...>#
            #######",
        )
        .unwrap();
        let mut data = Data::default();
        data.settings.enemies_per_level = 0;
        let mut r =
            Runtime::new(Arc::new(data), vec![level], AssetTable::default(), 1)
                .unwrap();
        r.spawn_enemy(EnemyKind::Rat, ivec2(3, 1)).unwrap();

        let map = draw_map(&r);
        assert_eq!(map.lines().nth(1), Some("#@.r.>#"));
        assert!(status_line(&r).starts_with("depth 1  turn 0  hp 30/30"));
    }
}
