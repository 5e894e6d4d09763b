//! Movement intent component.
//!
//! Intents represent the desired movement from player input or AI. The
//! controller reads them once per fixed step; no device polling happens here.

use bevy::prelude::*;

/// World-space frame that planar input is expressed in (typically a camera).
///
/// Each step the frame is flattened onto the plane perpendicular to the
/// character's current up axis.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct InputSpace {
    /// Direction of positive `movement.x`.
    pub right: Vec3,
    /// Direction of positive `movement.y`.
    pub forward: Vec3,
}

impl Default for InputSpace {
    fn default() -> Self {
        Self {
            right: Vec3::X,
            forward: Vec3::NEG_Z,
        }
    }
}

impl InputSpace {
    pub fn new(right: Vec3, forward: Vec3) -> Self {
        Self { right, forward }
    }

    /// Build an input space from a camera-like transform.
    ///
    /// Bevy cameras look down their local -Z, so forward is `-local_z`.
    pub fn from_transform(transform: &GlobalTransform) -> Self {
        Self {
            right: transform.right().as_vec3(),
            forward: transform.forward().as_vec3(),
        }
    }
}

/// Movement intent for a gravity-driven character.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_gravity_controller::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_movement(Vec2::new(0.0, 1.0));
/// assert!(intent.is_moving());
///
/// // Rising edge of the jump button latches a request.
/// intent.set_jump_pressed(true);
/// assert!(intent.has_jump_request());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Planar movement input (x = right, y = forward), at most unit length.
    pub movement: Vec2,
    /// Vertical input used while swimming (-1.0 = down, 1.0 = up).
    pub vertical: f32,
    /// Whether the climb action is held.
    pub climb: bool,
    /// Frame the planar input is expressed in. `None` uses world X / Z.
    pub input_space: Option<InputSpace>,
    /// Whether the jump action is currently held.
    pub jump_pressed: bool,
    /// Pending jump, latched on the rising edge of `jump_pressed`.
    pub(crate) jump_requested: bool,
}

impl MovementIntent {
    /// Create a new empty movement intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the planar input. Longer than unit vectors are clamped.
    pub fn set_movement(&mut self, movement: Vec2) {
        self.movement = movement.clamp_length_max(1.0);
    }

    /// Set the vertical swim input (-1.0 = down, 1.0 = up).
    pub fn set_vertical(&mut self, direction: f32) {
        self.vertical = direction.clamp(-1.0, 1.0);
    }

    /// Set whether the climb action is held.
    pub fn set_climb(&mut self, climb: bool) {
        self.climb = climb;
    }

    /// Set the input frame.
    pub fn set_input_space(&mut self, space: Option<InputSpace>) {
        self.input_space = space;
    }

    /// Set the jump button state.
    ///
    /// Call this every frame with the current state. A transition from
    /// `false` to `true` latches a jump request that stays pending until the
    /// next fixed step consumes it, so presses between steps are not lost.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        if pressed && !self.jump_pressed {
            self.jump_requested = true;
        }
        self.jump_pressed = pressed;
    }

    /// Latch a jump request directly (AI, scripted sequences).
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Whether a jump request is pending.
    pub fn has_jump_request(&self) -> bool {
        self.jump_requested
    }

    /// Take and clear the pending jump request.
    pub fn take_jump_request(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    /// Clear all movement input (the jump latch is kept).
    pub fn clear(&mut self) {
        self.movement = Vec2::ZERO;
        self.vertical = 0.0;
        self.climb = false;
    }

    /// Whether there is active planar input.
    pub fn is_moving(&self) -> bool {
        self.movement.length_squared() > 1e-6
    }

    /// Input as a 3D vector (x = right, y = up, z = forward), clamped to unit length.
    ///
    /// The vertical axis is only honored while swimming.
    pub fn player_input(&self, swimming: bool) -> Vec3 {
        let vertical = if swimming { self.vertical } else { 0.0 };
        Vec3::new(self.movement.x, vertical, self.movement.y).clamp_length_max(1.0)
    }
}
