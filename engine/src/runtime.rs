use std::sync::Arc;

use anyhow::bail;
use rand::prelude::*;
use util::GameRng;
use world::{Data, EnemyKind, Level, LevelProvider, Monster, Settings};

use crate::{
    ai, prelude::*, Assets, Enemy, EnemyId, Occupancy, Occupant,
    OrbitalMissile, Player, Projectile, Visibility,
};

/// Main data container for a game session.
///
/// Owns the level and everything in it, and drives the turn loop through
/// `tick`.
pub struct Runtime {
    pub(crate) data: Arc<Data>,
    levels: Box<dyn LevelProvider>,
    pub(crate) assets: Box<dyn Assets>,
    pub(crate) rng: GameRng,
    pub(crate) level: Level,
    pub(crate) occupancy: Occupancy,
    pub(crate) visibility: Visibility,
    pub(crate) player: Player,
    /// Enemies in roster order, this is also the order they act in.
    pub(crate) enemies: IndexMap<EnemyId, Enemy>,
    next_enemy_id: u64,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) orbitals: Vec<OrbitalMissile>,
    pub(crate) phase: TurnPhase,
    /// Next roster position to consider in the enemy phase.
    cursor: usize,
    turn: u64,
    msgs: Vec<Msg>,
}

impl Runtime {
    /// Start a new session on the first level from the provider.
    pub fn new(
        data: Arc<Data>,
        levels: impl LevelProvider + 'static,
        assets: impl Assets + 'static,
        seed: u64,
    ) -> anyhow::Result<Self> {
        let visibility = Visibility::new(&data.settings);
        let player = Player::new(IVec2::ZERO, &data.settings);

        let mut ret = Runtime {
            data,
            levels: Box::new(levels),
            assets: Box::new(assets),
            rng: GameRng::seed_from_u64(seed),
            level: Default::default(),
            occupancy: Default::default(),
            visibility,
            player,
            enemies: Default::default(),
            next_enemy_id: 1,
            projectiles: Default::default(),
            orbitals: Default::default(),
            phase: Default::default(),
            cursor: 0,
            turn: 0,
            msgs: Default::default(),
        };

        ret.start_session()?;
        Ok(ret)
    }

    fn start_session(&mut self) -> anyhow::Result<()> {
        let level = self.levels.level(1)?;
        check_level(&level)?;

        self.player = Player::new(level.start(), &self.data.settings);
        self.turn = 0;
        self.enter_level(level);
        log::info!("new session started");
        Ok(())
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn settings(&self) -> &Settings {
        &self.data.settings
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn depth(&self) -> u32 {
        self.level.depth()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable access to player stats.
    ///
    /// Position is not exposed, moves go through the turn loop.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.values()
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    /// Living enemy at a cell.
    pub fn enemy_at(&self, p: IVec2) -> Option<&Enemy> {
        self.living_enemy_at(p).and_then(|id| self.enemies.get(&id))
    }

    pub(crate) fn living_enemy_at(&self, p: IVec2) -> Option<EnemyId> {
        self.occupancy.enemy_at(p).filter(|id| {
            self.enemies.get(id).is_some_and(|e| e.body.is_alive())
        })
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn orbitals(&self) -> &[OrbitalMissile] {
        &self.orbitals
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Number of completed turns in this session.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn send_msg(&mut self, msg: Msg) {
        self.msgs.push(msg);
    }

    /// Take all queued messages.
    pub fn drain_msgs(&mut self) -> impl Iterator<Item = Msg> + '_ {
        self.msgs.drain(..)
    }

    pub(crate) fn set_phase(&mut self, phase: TurnPhase) {
        if self.phase != phase {
            log::debug!("phase {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
    }

    /// Add an enemy to the roster.
    ///
    /// Returns `None` if the cell can't hold the enemy.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: IVec2) -> Option<EnemyId> {
        if !self.level.is_walkable(pos) {
            return None;
        }

        let id = EnemyId(self.next_enemy_id);
        if !self.occupancy.place(pos, Occupant::Enemy(id)) {
            return None;
        }
        self.next_enemy_id += 1;

        let stats = self.data.monster(kind);
        self.enemies.insert(id, Enemy::new(id, kind, &stats, pos));
        log::trace!("spawned {kind} {id} at {pos}");
        Some(id)
    }

    /// Update the game state by `dt` seconds.
    pub fn tick(&mut self, dt: f32, input: Option<Input>) {
        if self.phase == TurnPhase::GameOver {
            if input == Some(Input::Restart) {
                if let Err(e) = self.start_session() {
                    log::error!("restart failed: {e:#}");
                }
            }
            return;
        }

        self.player.body.update(dt);
        for e in self.enemies.values_mut() {
            e.body.update(dt);
        }
        self.update_orbitals(dt);
        self.update_projectiles(dt);

        match self.phase {
            TurnPhase::PlayerInput => {
                if let Some(input) = input {
                    self.player_input(input);
                }
            }
            TurnPhase::PlayerTargeting { spell, cursor } => {
                if let Some(input) = input {
                    self.targeting_input(spell, cursor, input);
                }
            }
            TurnPhase::PlayerAction => {
                if !self.player.body.is_moving() {
                    self.begin_enemy_phase();
                }
            }
            TurnPhase::ProjectileResolution => {
                if self.projectiles.iter().all(|p| !p.is_active()) {
                    self.begin_enemy_phase();
                }
            }
            TurnPhase::EnemyPlanning => self.run_enemies(),
            TurnPhase::GameOver => {}
        }
    }

    /// Clean up after the player's action and hand the turn to enemies.
    pub(crate) fn begin_enemy_phase(&mut self) {
        self.cleanup();
        if !self.player.body.is_alive() {
            self.game_over();
            return;
        }

        for e in self.enemies.values_mut() {
            e.has_acted = false;
        }
        self.cursor = 0;
        self.set_phase(TurnPhase::EnemyPlanning);
    }

    /// Let the next enemy in the roster act.
    ///
    /// At most one enemy starts an action per tick. The phase ends once
    /// every living enemy has acted and no one is still moving.
    fn run_enemies(&mut self) {
        while let Some((&id, enemy)) = self.enemies.get_index(self.cursor) {
            if !enemy.body.is_alive() || enemy.has_acted {
                self.cursor += 1;
                continue;
            }

            let action = ai::plan(
                enemy,
                &self.player.body,
                &self.level,
                &self.occupancy,
                &self.visibility,
                &mut self.rng,
            );

            if action == Action::None {
                // Still busy, try again next tick.
                break;
            }

            self.execute_enemy(id, action);
            if let Some(e) = self.enemies.get_mut(&id) {
                e.has_acted = true;
            }
            self.cursor += 1;
            break;
        }

        if self.cursor >= self.enemies.len()
            && self
                .enemies
                .values()
                .all(|e| !e.body.is_alive() || !e.body.is_moving())
        {
            self.end_turn();
        }
    }

    fn end_turn(&mut self) {
        self.cleanup();

        self.player.body.tick_statuses();
        for e in self.enemies.values_mut() {
            e.body.tick_statuses();
        }
        self.player.mana = (self.player.mana + self.data.settings.mana_regen)
            .min(self.player.max_mana);
        self.turn += 1;

        if self.player.body.is_alive() {
            self.set_phase(TurnPhase::PlayerInput);
        } else {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        log::info!("player died on depth {} after {} turns", self.depth(), self.turn);
        msg!(self, "you die");
        self.set_phase(TurnPhase::GameOver);
    }

    /// Remove dead enemies and spent projectiles.
    pub(crate) fn cleanup(&mut self) {
        let dead: Vec<EnemyId> = self
            .enemies
            .values()
            .filter(|e| !e.body.is_alive())
            .map(|e| e.id())
            .collect();

        for id in dead {
            let Some(e) = self.enemies.shift_remove(&id) else {
                continue;
            };
            let pos = e.body.pos();
            self.occupancy.clear(pos);
            self.player.gold += e.loot;
            self.send_msg(Msg::Death(pos));
            msg!(self, "the {} dies", e.kind());
            log::debug!("removed dead {} {id}", e.kind());
        }

        self.projectiles.retain(|p| p.is_active());
    }

    /// Deal damage to an enemy, dead enemies stay in place until cleanup.
    pub(crate) fn damage_enemy(&mut self, id: EnemyId, amount: i32) {
        let Some(e) = self.enemies.get_mut(&id) else {
            return;
        };
        if !e.body.is_alive() {
            return;
        }

        let lost = e.body.take_damage(amount);
        let (pos, kind) = (e.body.pos(), e.kind());
        self.send_msg(Msg::Hurt(pos, lost));
        msg!(self, "the {kind} takes {lost} damage");
    }

    /// Position of the closest living enemy the player can see.
    pub(crate) fn nearest_visible_enemy_cell(&self) -> Option<IVec2> {
        let pos = self.player.body.pos();
        self.enemies
            .values()
            .filter(|e| {
                e.body.is_alive() && self.visibility.is_visible(e.body.pos())
            })
            .map(|e| e.body.pos())
            .min_by_key(|p| (*p - pos).taxi_len())
    }

    /// Move on to the next dungeon level.
    pub(crate) fn descend(&mut self) {
        let depth = self.depth() + 1;
        let level = match self.levels.level(depth).and_then(|l| {
            check_level(&l)?;
            Ok(l)
        }) {
            Ok(level) => level,
            Err(e) => {
                log::error!("descend: can't make depth {depth}: {e:#}");
                msg!(self, "the way down is blocked");
                return;
            }
        };

        self.enter_level(level);
        log::info!("entered depth {depth}");
        self.send_msg(Msg::Descend(depth));
        msg!(self, "you descend to depth {depth}");
    }

    /// Replace the current level and populate it.
    fn enter_level(&mut self, level: Level) {
        self.level = level;
        self.enemies.clear();
        self.projectiles.clear();
        self.orbitals.clear();

        let start = self.level.start();
        self.occupancy = Occupancy::new(&self.level);
        self.player.body.teleport(start);
        self.occupancy.place(start, Occupant::Player);

        let data = self.data.clone();
        for id in data.spells_unlocked_at(self.level.depth()) {
            if self.player.learn(id) {
                if let Some(spell) = data.spell(id) {
                    msg!(self, "you know the {} spell", spell.name);
                }
            }
        }

        self.spawn_enemies();
        self.visibility.recompute(&self.level, start);
        self.cursor = 0;
        self.set_phase(TurnPhase::PlayerInput);
    }

    /// Spawn the level's enemies away from the player's entrance.
    fn spawn_enemies(&mut self) {
        let depth = self.level.depth();
        let count = (self.data.settings.enemies_per_level + depth)
            .saturating_sub(1) as usize;
        if self.data.settings.enemies_per_level == 0 || count == 0 {
            return;
        }

        let data = self.data.clone();
        let kinds: Vec<(EnemyKind, &Monster)> = data
            .bestiary
            .iter()
            .filter(|(_, m)| m.min_depth <= depth && m.spawn_weight() > 0.0)
            .map(|(&k, m)| (k, m))
            .collect();
        if kinds.is_empty() {
            log::warn!("spawn_enemies: no monsters for depth {depth}");
            return;
        }

        let start = self.level.start();
        let start_room = self.level.room_at(start).copied();
        let has_rooms = !self.level.rooms().is_empty();
        let mut spots: Vec<IVec2> = self
            .level
            .positions()
            .filter(|&p| {
                !self.occupancy.occupied(p)
                    && (p - start).chess_len() > 2
                    && start_room.map_or(true, |r| !r.contains(p))
                    && (!has_rooms || self.level.room_at(p).is_some())
            })
            .collect();
        spots.shuffle(&mut self.rng);

        for p in spots.into_iter().take(count) {
            let Ok(&(kind, _)) =
                kinds.choose_weighted(&mut self.rng, |(_, m)| m.spawn_weight())
            else {
                break;
            };
            self.spawn_enemy(kind, p);
        }
    }
}

/// Make sure a level has usable entry and exit cells.
fn check_level(level: &Level) -> anyhow::Result<()> {
    if !level.is_walkable(level.start()) {
        bail!("level start {} is not walkable", level.start());
    }
    if !level.is_walkable(level.end()) {
        bail!("level end {} is not walkable", level.end());
    }
    Ok(())
}
