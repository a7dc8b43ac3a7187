use serde::Deserialize;

/// What a respawn resets besides position and the dead/traveling flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespawnPolicy {
    /// Velocity and animation carry over into the new life.
    #[default]
    KeepMotion,
    /// Velocity, jump memory and the animation frame are zeroed.
    ResetMotion,
}

/// Tunables of an entity's motion. Horizontal and vertical velocities are in
/// pixels per update; accelerations are scaled by `world_meter_in_pixels`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    pub acceleration: f64,
    /// Linear, per second
    pub deceleration: f64,
    /// Initial upward velocity of a jump
    pub jump_force: f64,
    pub max_velocity_x: f64,
    /// Meters per second squared
    pub gravity: f64,
    pub world_meter_in_pixels: f64,
    /// Grounded entities stand on multiples of this many pixels
    pub ground_snap: u32,
    pub respawn: RespawnPolicy,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            acceleration: 8.0,
            deceleration: 5.0,
            jump_force: 3.0,
            max_velocity_x: 4.5,
            gravity: 9.81,
            world_meter_in_pixels: 16.0,
            ground_snap: 8,
            respawn: RespawnPolicy::KeepMotion,
        }
    }
}

impl EntityConfig {
    /// Replaces negative values by their magnitude.
    pub fn sanitize(&mut self) {
        for v in [
            &mut self.acceleration,
            &mut self.deceleration,
            &mut self.jump_force,
            &mut self.max_velocity_x,
            &mut self.gravity,
            &mut self.world_meter_in_pixels,
        ] {
            *v = v.abs();
        }
    }
}
