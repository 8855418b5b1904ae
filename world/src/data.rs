use std::{fmt, path::Path};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use util::{Dice, IndexMap};

/// Static game data tables.
///
/// Loaded once and shared by every session that uses it. Nothing in here
/// changes during play.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Data {
    pub settings: Settings,
    pub bestiary: IndexMap<EnemyKind, Monster>,
    /// Master spell list, position in list is the spell's `SpellId`.
    pub spellbook: Vec<Spell>,
}

impl Default for Data {
    fn default() -> Self {
        Data {
            settings: Default::default(),
            bestiary: EnemyKind::iter().map(|k| (k, k.default_stats())).collect(),
            spellbook: default_spellbook(),
        }
    }
}

impl Data {
    /// Load data from an IDM file.
    ///
    /// Sections missing from the file keep their built-in defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Data> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let ret: Data = idm::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        ret.settings
            .validate()
            .with_context(|| format!("checking {}", path.display()))?;
        log::info!(
            "loaded {} monsters and {} spells from {}",
            ret.bestiary.len(),
            ret.spellbook.len(),
            path.display()
        );
        Ok(ret)
    }

    pub fn spell(&self, id: SpellId) -> Option<&Spell> {
        self.spellbook.get(id.0)
    }

    /// Look up type stats for a monster kind.
    ///
    /// Kinds missing from a loaded bestiary fall back to built-in stats.
    pub fn monster(&self, kind: EnemyKind) -> Monster {
        self.bestiary
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.default_stats())
    }

    /// Spells that become known when the player reaches the given depth.
    pub fn spells_unlocked_at(
        &self,
        depth: u32,
    ) -> impl Iterator<Item = SpellId> + '_ {
        self.spellbook
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.unlock_depth <= depth)
            .map(|(i, _)| SpellId(i))
    }
}

/// Largest light radius settings may ask for.
const MAX_LIGHT_RADIUS: f32 = 64.0;

/// Game-wide tunable settings.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Distance within which tiles are fully lit.
    pub bright_radius: f32,
    /// Distance at which light fades to darkness.
    pub dim_radius: f32,
    /// Seconds it takes an actor to animate a one tile step.
    pub move_duration: f32,
    /// Projectile speed in tiles per second.
    pub projectile_speed: f32,
    /// Seconds between orbital target scans.
    pub orbital_scan_interval: f32,
    /// Seconds an orbital hangs around before fizzling out.
    pub orbital_lifetime: f32,
    /// How far away orbitals will pick targets.
    pub orbital_range: f32,
    /// Horizontal distance between orbitals in formation.
    pub orbital_spacing: f32,
    /// How far above the player orbitals hover.
    pub orbital_height: f32,
    /// Mana regained at the end of each turn.
    pub mana_regen: i32,
    /// Enemies on the first level, one more per depth after that.
    pub enemies_per_level: u32,
    pub map_width: i32,
    pub map_height: i32,
    pub player_health: i32,
    pub player_mana: i32,
    pub player_melee: Dice,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bright_radius: 4.0,
            dim_radius: 9.0,
            move_duration: 0.15,
            projectile_speed: 12.0,
            orbital_scan_interval: 0.25,
            orbital_lifetime: 12.0,
            orbital_range: 6.0,
            orbital_spacing: 0.6,
            orbital_height: 0.8,
            mana_regen: 1,
            enemies_per_level: 3,
            map_width: 60,
            map_height: 36,
            player_health: 30,
            player_mana: 20,
            player_melee: Dice::new(1, 6, 1),
        }
    }
}

impl Settings {
    /// Load settings from an IDM file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Settings> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let ret: Settings = idm::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        ret.validate()
            .with_context(|| format!("checking {}", path.display()))?;
        Ok(ret)
    }

    /// Check for values the runtime can't work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.projectile_speed.is_finite() && self.projectile_speed > 0.0) {
            bail!("projectile-speed must be positive, got {}", self.projectile_speed);
        }
        if !(self.dim_radius > 0.0 && self.dim_radius <= MAX_LIGHT_RADIUS) {
            bail!(
                "dim-radius must be in (0, {MAX_LIGHT_RADIUS}], got {}",
                self.dim_radius
            );
        }
        if !(self.bright_radius >= 0.0 && self.bright_radius <= self.dim_radius) {
            bail!(
                "bright-radius must be between 0 and dim-radius, got {}",
                self.bright_radius
            );
        }
        if !(self.move_duration >= 0.0 && self.move_duration.is_finite()) {
            bail!("move-duration can't be negative, got {}", self.move_duration);
        }
        if !(self.orbital_scan_interval > 0.0) {
            bail!(
                "orbital-scan-interval must be positive, got {}",
                self.orbital_scan_interval
            );
        }
        if self.map_width < 3 || self.map_height < 3 {
            bail!("map must be at least 3x3, got {}x{}", self.map_width, self.map_height);
        }
        Ok(())
    }
}

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum EnemyKind {
    Rat,
    Goblin,
    Skeleton,
    Orc,
    Ogre,
}

impl EnemyKind {
    fn default_stats(self) -> Monster {
        use EnemyKind::*;
        let m = |name: &str, icon, health, damage, size, loot, rarity, min_depth| Monster {
            name: name.to_string(),
            icon,
            health,
            damage,
            size,
            loot,
            rarity,
            min_depth,
        };

        match self {
            Rat => m("rat", 'r', 4, Dice::new(1, 2, 0), 0.5, 1, 1, 1),
            Goblin => m("goblin", 'g', 8, Dice::new(1, 4, 0), 0.7, 3, 1, 1),
            Skeleton => m("skeleton", 's', 12, Dice::new(1, 6, 0), 0.8, 5, 2, 2),
            Orc => m("orc", 'o', 16, Dice::new(1, 6, 2), 0.9, 8, 2, 3),
            Ogre => m("ogre", 'O', 30, Dice::new(2, 6, 1), 1.2, 20, 4, 4),
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default_stats().name)
    }
}

/// Per-type monster stats.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Monster {
    pub name: String,
    pub icon: char,
    pub health: i32,
    pub damage: Dice,
    /// Visual size relative to a tile.
    pub size: f32,
    /// Gold dropped on death.
    pub loot: i32,
    /// Inverse spawn weight, zero never spawns.
    pub rarity: u32,
    /// Shallowest depth the monster appears at.
    pub min_depth: u32,
}

impl Monster {
    pub fn spawn_weight(&self) -> f64 {
        match self.rarity {
            0 => 0.0,
            r => 1.0 / r as f64,
        }
    }
}

/// Index of a spell in the master spell list.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
)]
pub struct SpellId(pub usize);

#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TargetType {
    /// Spell affects the caster, no targeting needed.
    #[default]
    #[serde(rename = "self")]
    Caster,
    /// Spell needs a living enemy on the target tile.
    Enemy,
    /// Spell is aimed at any tile.
    Tile,
    /// Spell is aimed at a tile and affects the area around it.
    Area,
}

#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SpellEffect {
    #[default]
    Damage,
    Heal,
    Buff,
    Debuff,
    ApplyShield,
    SummonOrbital,
    AreaDamage,
}

impl SpellEffect {
    /// Status effect the spell applies, if any.
    pub fn status(self) -> Option<StatusKind> {
        match self {
            SpellEffect::ApplyShield => Some(StatusKind::Shield),
            SpellEffect::Buff => Some(StatusKind::Empower),
            SpellEffect::Debuff => Some(StatusKind::Stun),
            SpellEffect::Damage
            | SpellEffect::Heal
            | SpellEffect::SummonOrbital
            | SpellEffect::AreaDamage => None,
        }
    }
}

/// Timed status effects on actors.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    /// Absorbs incoming damage up to magnitude.
    Shield,
    /// Adds magnitude to spell damage.
    Empower,
    /// Actor loses its turns.
    Stun,
}

/// Static spell definition.
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Spell {
    pub name: String,
    pub mana_cost: i32,
    /// Maximum taxicab distance to target.
    pub range: i32,
    pub target: TargetType,
    pub effect: SpellEffect,
    /// Damage or healing roll.
    pub damage: Dice,
    /// Splash radius of area spells.
    pub area_radius: i32,
    /// Duration of applied status effect in turns.
    pub duration: u32,
    /// Strength of applied status effect.
    pub magnitude: i32,
    /// Number of orbitals summoned.
    pub orbitals: u32,
    /// Depth at which the player learns the spell.
    pub unlock_depth: u32,
    /// Asset key of the spawned projectile or orbital.
    pub asset: String,
}

fn default_spellbook() -> Vec<Spell> {
    vec![
        Spell {
            name: "heal".into(),
            mana_cost: 5,
            target: TargetType::Caster,
            effect: SpellEffect::Heal,
            damage: Dice::new(2, 4, 2),
            unlock_depth: 1,
            ..Default::default()
        },
        Spell {
            name: "magic missile".into(),
            mana_cost: 3,
            range: 6,
            target: TargetType::Enemy,
            effect: SpellEffect::Damage,
            damage: Dice::new(1, 6, 2),
            unlock_depth: 1,
            asset: "bolt".into(),
            ..Default::default()
        },
        Spell {
            name: "orbital swarm".into(),
            mana_cost: 8,
            target: TargetType::Caster,
            effect: SpellEffect::SummonOrbital,
            damage: Dice::new(1, 4, 1),
            orbitals: 3,
            unlock_depth: 1,
            asset: "orbital".into(),
            ..Default::default()
        },
        Spell {
            name: "fireball".into(),
            mana_cost: 7,
            range: 7,
            target: TargetType::Area,
            effect: SpellEffect::AreaDamage,
            damage: Dice::new(2, 6, 0),
            area_radius: 1,
            unlock_depth: 2,
            asset: "fireball".into(),
            ..Default::default()
        },
        Spell {
            name: "stone skin".into(),
            mana_cost: 4,
            target: TargetType::Caster,
            effect: SpellEffect::ApplyShield,
            duration: 5,
            magnitude: 8,
            unlock_depth: 2,
            ..Default::default()
        },
        Spell {
            name: "empower".into(),
            mana_cost: 4,
            target: TargetType::Caster,
            effect: SpellEffect::Buff,
            duration: 4,
            magnitude: 2,
            unlock_depth: 3,
            ..Default::default()
        },
        Spell {
            name: "stun".into(),
            mana_cost: 3,
            range: 5,
            target: TargetType::Enemy,
            effect: SpellEffect::Debuff,
            duration: 2,
            unlock_depth: 3,
            ..Default::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn builtin_tables() {
        let data = Data::default();
        assert_eq!(data.bestiary.len(), EnemyKind::iter().count());
        assert_eq!(data.monster(EnemyKind::Goblin).icon, 'g');
        assert_eq!(EnemyKind::Ogre.to_string(), "ogre");

        let first: Vec<SpellId> = data.spells_unlocked_at(1).collect();
        assert_eq!(first, vec![SpellId(0), SpellId(1), SpellId(2)]);
        assert_eq!(data.spells_unlocked_at(3).count(), data.spellbook.len());
        assert!(data.spell(SpellId(99)).is_none());
    }

    #[test]
    fn missing_monster_falls_back_to_builtin() {
        let mut data = Data::default();
        data.bestiary.shift_remove(&EnemyKind::Rat);
        assert_eq!(data.monster(EnemyKind::Rat).name, "rat");
    }

    #[test]
    fn status_effects_follow_spell_effect() {
        assert_eq!(SpellEffect::ApplyShield.status(), Some(StatusKind::Shield));
        assert_eq!(SpellEffect::Debuff.status(), Some(StatusKind::Stun));
        assert_eq!(SpellEffect::Damage.status(), None);
    }

    #[test]
    fn settings_validation() {
        assert!(Settings::default().validate().is_ok());

        let stalled = Settings {
            projectile_speed: 0.0,
            ..Default::default()
        };
        assert!(stalled.validate().is_err());

        let floodlight = Settings {
            dim_radius: 1e6,
            ..Default::default()
        };
        assert!(floodlight.validate().is_err());

        let inverted = Settings {
            bright_radius: 5.0,
            dim_radius: 3.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let unscanned = Settings {
            orbital_scan_interval: f32::NAN,
            ..Default::default()
        };
        assert!(unscanned.validate().is_err());
    }

    #[test]
    fn load_rejects_bad_settings() {
        let path = std::env::temp_dir()
            .join(format!("delve-settings-{}.idm", std::process::id()));
        let text = idm::to_string(&Settings {
            projectile_speed: -1.0,
            ..Default::default()
        })
        .unwrap();
        std::fs::write(&path, text).unwrap();

        let err = Settings::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("projectile-speed"));
    }

    #[test]
    fn settings_idm_roundtrip() {
        let settings = Settings {
            dim_radius: 7.5,
            player_melee: Dice::new(2, 4, 0),
            ..Default::default()
        };
        let text = idm::to_string(&settings).unwrap();
        let parsed: Settings = idm::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
