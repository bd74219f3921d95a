//! Configuration schema and the validated tuning table.
//!
//! `GameConfig` mirrors the JSON configuration file. It is validated once,
//! before any session starts, into a `Tuning` indexed by the closed kind
//! enums, so the simulation never looks up a string key at run time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::GENERATOR_DROP_FRACTION;
use crate::enums::{AttackerKind, DefenderKind};
use crate::error::ConfigError;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameConfig {
    pub field: FieldConfig,
    #[serde(default)]
    pub plants: HashMap<String, PlantConfig>,
    #[serde(default)]
    pub zombies: HashMap<String, ZombieConfig>,
    pub game: GameSettingsConfig,
}

/// Field geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldConfig {
    pub rows: usize,
    pub columns: usize,
    pub cell_size: f64,
}

impl FieldConfig {
    /// Width of the playable field in field units.
    pub fn width(&self) -> f64 {
        self.columns as f64 * self.cell_size
    }

    /// Height of the playable field in field units.
    pub fn height(&self) -> f64 {
        self.rows as f64 * self.cell_size
    }
}

/// Per-defender tunables. Optional fields apply to specific behaviors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlantConfig {
    pub health: f64,
    pub cost: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoot_delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullets_per_spray: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet_damage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_generation_interval: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_drop_range: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_value: Option<u32>,
}

/// Per-attacker tunables.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZombieConfig {
    pub health: f64,
    pub speed: f64,
    pub damage: f64,
}

/// Global pacing and economy tunables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameSettingsConfig {
    #[serde(rename = "FPS")]
    pub fps: u32,
    pub zombie_spawn_min_delay: f64,
    pub sun_fall_interval: f64,
    pub sun_value: u32,
    pub sun_pickup_timeout: f64,
    pub difficulty_increase_interval: f64,
    pub initial_difficulty: u32,
    pub max_difficulty: u32,
    pub zombies_per_difficulty: u32,
    /// Starting balance; defaults to `sun_value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_sun_balance: Option<u32>,
}

/// Validated behavior of a defender type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefenderBehavior {
    /// Pure health sink.
    Blocker,
    /// Fires `barrels` projectiles per spray, the first immediately and the
    /// rest spaced by the follow-up delay.
    Shooter {
        shoot_delay: f64,
        barrels: u32,
        bullet_speed: f64,
        bullet_damage: f64,
    },
    Generator {
        interval: f64,
        drop_range: f64,
        sun_value: u32,
    },
}

/// Validated defender tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefenderStats {
    pub kind: DefenderKind,
    pub health: f64,
    pub cost: u32,
    pub behavior: DefenderBehavior,
}

/// Validated attacker tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackerStats {
    pub kind: AttackerKind,
    pub health: f64,
    pub speed: f64,
    pub damage: f64,
}

/// The validated, read-only tuning table consumed by the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    pub field: FieldConfig,
    pub fps: u32,
    pub zombie_spawn_min_delay: f64,
    pub sun_fall_interval: f64,
    pub sun_value: u32,
    pub sun_pickup_timeout: f64,
    pub difficulty_increase_interval: f64,
    pub initial_difficulty: u32,
    pub max_difficulty: u32,
    pub zombies_per_difficulty: u32,
    pub initial_sun_balance: u32,
    defenders: [DefenderStats; 4],
    attackers: [AttackerStats; 2],
}

impl Tuning {
    pub fn defender(&self, kind: DefenderKind) -> &DefenderStats {
        &self.defenders[kind.index()]
    }

    pub fn attacker(&self, kind: AttackerKind) -> &AttackerStats {
        &self.attackers[kind.index()]
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / self.fps as f64
    }

    pub fn cost(&self, kind: DefenderKind) -> u32 {
        self.defender(kind).cost
    }

    /// Replace the stats of one defender type. Used to build test fixtures
    /// from an already validated table.
    pub fn with_defender(mut self, stats: DefenderStats) -> Self {
        self.defenders[stats.kind.index()] = stats;
        self
    }

    /// Replace the stats of one attacker type.
    pub fn with_attacker(mut self, stats: AttackerStats) -> Self {
        self.attackers[stats.kind.index()] = stats;
        self
    }
}

impl GameConfig {
    /// Parse a configuration from JSON text. Does not validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse and validate in one step.
    pub fn tuning_from_json_str(json: &str) -> Result<Tuning, ConfigError> {
        Self::from_json_str(json)?.validate()
    }

    /// Validate every unit type and global value, producing the tuning table.
    pub fn validate(&self) -> Result<Tuning, ConfigError> {
        let field = self.field;
        if field.rows == 0 || field.columns == 0 {
            return Err(invalid("field must have at least one row and one column"));
        }
        positive("CellSize", field.cell_size)?;

        let game = &self.game;
        if game.fps == 0 {
            return Err(invalid("FPS must be greater than zero"));
        }
        non_negative("ZombieSpawnMinDelay", game.zombie_spawn_min_delay)?;
        positive("SunFallInterval", game.sun_fall_interval)?;
        positive("SunPickupTimeout", game.sun_pickup_timeout)?;
        positive("DifficultyIncreaseInterval", game.difficulty_increase_interval)?;
        if game.initial_difficulty > game.max_difficulty {
            return Err(invalid(format!(
                "InitialDifficulty {} exceeds MaxDifficulty {}",
                game.initial_difficulty, game.max_difficulty
            )));
        }

        let defenders = [
            self.defender_stats(DefenderKind::Shooter1)?,
            self.defender_stats(DefenderKind::Shooter2)?,
            self.defender_stats(DefenderKind::Shield)?,
            self.defender_stats(DefenderKind::Generator)?,
        ];
        let attackers = [
            self.attacker_stats(AttackerKind::ZombieBoy)?,
            self.attacker_stats(AttackerKind::ZombieGirl)?,
        ];

        Ok(Tuning {
            field,
            fps: game.fps,
            zombie_spawn_min_delay: game.zombie_spawn_min_delay,
            sun_fall_interval: game.sun_fall_interval,
            sun_value: game.sun_value,
            sun_pickup_timeout: game.sun_pickup_timeout,
            difficulty_increase_interval: game.difficulty_increase_interval,
            initial_difficulty: game.initial_difficulty,
            max_difficulty: game.max_difficulty,
            zombies_per_difficulty: game.zombies_per_difficulty,
            initial_sun_balance: game.initial_sun_balance.unwrap_or(game.sun_value),
            defenders,
            attackers,
        })
    }

    fn defender_stats(&self, kind: DefenderKind) -> Result<DefenderStats, ConfigError> {
        let unit = kind.config_key();
        let plant = self
            .plants
            .get(unit)
            .ok_or(ConfigError::MissingDefender(unit))?;
        positive(unit, plant.health)?;

        let behavior = match kind {
            DefenderKind::Shield => DefenderBehavior::Blocker,
            DefenderKind::Shooter1 | DefenderKind::Shooter2 => {
                let default_barrels = if kind == DefenderKind::Shooter2 { 2 } else { 1 };
                let barrels = plant.bullets_per_spray.unwrap_or(default_barrels);
                if barrels == 0 {
                    return Err(invalid(format!("{unit}: BulletsPerSpray must be at least 1")));
                }
                let shoot_delay = require(plant.shoot_delay, unit, "ShootDelay")?;
                let bullet_speed = require(plant.bullet_speed, unit, "BulletSpeed")?;
                let bullet_damage = require(plant.bullet_damage, unit, "BulletDamage")?;
                non_negative(unit, shoot_delay)?;
                positive(unit, bullet_speed)?;
                non_negative(unit, bullet_damage)?;
                DefenderBehavior::Shooter {
                    shoot_delay,
                    barrels,
                    bullet_speed,
                    bullet_damage,
                }
            }
            DefenderKind::Generator => {
                let interval = require(plant.sun_generation_interval, unit, "SunGenerationInterval")?;
                positive(unit, interval)?;
                let drop_range = plant
                    .sun_drop_range
                    .unwrap_or(self.field.cell_size * GENERATOR_DROP_FRACTION);
                non_negative(unit, drop_range)?;
                DefenderBehavior::Generator {
                    interval,
                    drop_range,
                    sun_value: plant.sun_value.unwrap_or(self.game.sun_value),
                }
            }
        };

        Ok(DefenderStats {
            kind,
            health: plant.health,
            cost: plant.cost,
            behavior,
        })
    }

    fn attacker_stats(&self, kind: AttackerKind) -> Result<AttackerStats, ConfigError> {
        let unit = kind.config_key();
        let zombie = self
            .zombies
            .get(unit)
            .ok_or(ConfigError::MissingAttacker(unit))?;
        positive(unit, zombie.health)?;
        non_negative(unit, zombie.speed)?;
        non_negative(unit, zombie.damage)?;
        Ok(AttackerStats {
            kind,
            health: zombie.health,
            speed: zombie.speed,
            damage: zombie.damage,
        })
    }

    /// Built-in default table: a 5x9 lawn at 60 FPS with 50 starting sun.
    pub fn standard() -> Self {
        let shooter = |health, cost, shoot_delay, bullets| PlantConfig {
            health,
            cost,
            shoot_delay: Some(shoot_delay),
            bullets_per_spray: Some(bullets),
            bullet_speed: Some(450.0),
            bullet_damage: Some(20.0),
            ..Default::default()
        };

        let plants = HashMap::from([
            ("Shooter1".to_string(), shooter(100.0, 25, 1.5, 1)),
            ("Shooter2".to_string(), shooter(120.0, 50, 2.0, 2)),
            (
                "Shield".to_string(),
                PlantConfig {
                    health: 400.0,
                    cost: 25,
                    ..Default::default()
                },
            ),
            (
                "Generator".to_string(),
                PlantConfig {
                    health: 80.0,
                    cost: 25,
                    sun_generation_interval: Some(10.0),
                    sun_drop_range: Some(37.5),
                    sun_value: Some(25),
                    ..Default::default()
                },
            ),
        ]);

        let zombies = HashMap::from([
            (
                "ZombieBoy".to_string(),
                ZombieConfig {
                    health: 100.0,
                    speed: 10.0,
                    damage: 20.0,
                },
            ),
            (
                "ZombieGirl".to_string(),
                ZombieConfig {
                    health: 80.0,
                    speed: 14.0,
                    damage: 15.0,
                },
            ),
        ]);

        Self {
            field: FieldConfig {
                rows: 5,
                columns: 9,
                cell_size: 150.0,
            },
            plants,
            zombies,
            game: GameSettingsConfig {
                fps: 60,
                zombie_spawn_min_delay: 5.0,
                sun_fall_interval: 8.0,
                sun_value: 25,
                sun_pickup_timeout: 10.0,
                difficulty_increase_interval: 30.0,
                initial_difficulty: 1,
                max_difficulty: 10,
                zombies_per_difficulty: 1,
                initial_sun_balance: Some(50),
            },
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn require<T>(value: Option<T>, unit: &'static str, field: &'static str) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingField { unit, field })
}

fn positive(name: &str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{name}: expected a positive value, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{name}: expected a non-negative value, got {value}")))
    }
}
