use crate::constants::*;
use crate::input::HeldKeys;
use crate::types::{Rect, Vector2D, clamp_coordinate};
use rand::Rng;
use log::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsteroidSize {
    Small,
    Medium,
    Large,
}

impl AsteroidSize {
    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..3) {
            0 => AsteroidSize::Small,
            1 => AsteroidSize::Medium,
            _ => AsteroidSize::Large,
        }
    }

    /// Edge length of the (square) asteroid in world pixels.
    pub fn pixels(&self) -> f64 {
        match self {
            AsteroidSize::Small => ASTEROID_SIZE_SMALL,
            AsteroidSize::Medium => ASTEROID_SIZE_MEDIUM,
            AsteroidSize::Large => ASTEROID_SIZE_LARGE,
        }
    }

    /// Smaller rocks are harder to hit and pay more.
    pub fn score(&self) -> u32 {
        match self {
            AsteroidSize::Small => SCORE_SMALL_ASTEROID,
            AsteroidSize::Medium => SCORE_MEDIUM_ASTEROID,
            AsteroidSize::Large => SCORE_LARGE_ASTEROID,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Ship,
    ForwardShot,
    RearShot,
    BubbleShot,
    ShieldField,
    Asteroid(AsteroidSize),
}

impl EntityKind {
    /// Width and height of the collision box.
    pub fn extents(&self) -> (f64, f64) {
        match self {
            EntityKind::Ship => (SHIP_SIZE, SHIP_SIZE),
            EntityKind::ForwardShot | EntityKind::RearShot => (SHOT_WIDTH, SHOT_HEIGHT),
            EntityKind::BubbleShot => (BUBBLE_SIZE, BUBBLE_SIZE),
            EntityKind::ShieldField => (SHIELD_FIELD_SIZE, SHIELD_FIELD_SIZE),
            EntityKind::Asteroid(size) => (size.pixels(), size.pixels()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub kind: EntityKind,
    pub alive: bool,
}

impl Entity {
    pub fn new(kind: EntityKind, position: Vector2D, velocity: Vector2D) -> Self {
        Entity { position, velocity, kind, alive: true }
    }

    pub fn spawn_asteroid(rng: &mut impl Rng) -> Self {
        let size = AsteroidSize::random(rng);
        let position = Vector2D::new(
            rng.gen_range(0.0..=SCREEN_WIDTH),
            rng.gen_range(ASTEROID_SPAWN_MIN_Y..=ASTEROID_SPAWN_MAX_Y),
        );
        let velocity = Vector2D::new(
            rng.gen_range(-ASTEROID_MAX_DRIFT..=ASTEROID_MAX_DRIFT),
            rng.gen_range(ASTEROID_MIN_FALL_SPEED..=ASTEROID_MAX_FALL_SPEED),
        );
        debug!("Spawning {:?} asteroid at ({:.1}, {:.1})", size, position.x, position.y);
        Entity::new(EntityKind::Asteroid(size), position, velocity)
    }

    pub fn bounds(&self) -> Rect {
        let (width, height) = self.kind.extents();
        Rect::centered(self.position, width, height)
    }

    /// Advances one tick. The ship is only read here (and its shield flag
    /// cleared on expiry); ship movement happens in `Ship::update`.
    pub fn update(&mut self, ship: &mut Ship, now: f64) {
        match self.kind {
            EntityKind::Ship => {}
            EntityKind::ForwardShot => {
                self.position = self.position.add(self.velocity);
                if self.position.y <= 0.0 {
                    self.alive = false;
                }
            }
            EntityKind::BubbleShot => {
                self.position = self.position.add(self.velocity);
                if self.position.y < 0.0 {
                    self.alive = false;
                }
            }
            EntityKind::RearShot => {
                self.position = self.position.add(self.velocity);
                if self.position.y > SCREEN_HEIGHT {
                    self.alive = false;
                }
            }
            EntityKind::ShieldField => {
                self.position = ship.position();
                if now > ship.shield_expiry {
                    ship.shield_active = false;
                    self.alive = false;
                    info!("Shield expired at {:.2}s", now);
                }
            }
            EntityKind::Asteroid(_) => {
                self.position = self.position.add(self.velocity);
                if self.bounds().top() > SCREEN_HEIGHT {
                    self.alive = false;
                }
            }
        }
    }
}

pub struct Ship {
    pub body: Entity,
    pub speed: f64,
    pub shield_integrity: u32,
    pub shield_active: bool,
    pub shield_expiry: f64,
    pub last_shield_time: f64,
}

impl Ship {
    pub fn new(x: f64, y: f64) -> Self {
        Ship {
            body: Entity::new(EntityKind::Ship, Vector2D::new(x, y), Vector2D::new(0.0, 0.0)),
            speed: SHIP_SPEED,
            shield_integrity: MAX_SHIELD_INTEGRITY,
            shield_active: false,
            shield_expiry: 0.0,
            // Lets the first activation through at t = 0.
            last_shield_time: -SHIELD_COOLDOWN_SECS,
        }
    }

    pub fn position(&self) -> Vector2D {
        self.body.position
    }

    pub fn is_alive(&self) -> bool {
        self.body.alive
    }

    pub fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    pub fn update(&mut self, keys: &HeldKeys) {
        let mut position = self.body.position;
        if keys.left() {
            position.x -= self.speed;
        }
        if keys.right() {
            position.x += self.speed;
        }
        if keys.up() {
            position.y -= self.speed;
        }
        if keys.down() {
            position.y += self.speed;
        }

        position.x = clamp_coordinate(position.x, SCREEN_WIDTH);
        position.y = clamp_coordinate(position.y, SCREEN_HEIGHT);
        self.body.position = position;
    }

    pub fn spawn_forward_shot(&self) -> Entity {
        Entity::new(EntityKind::ForwardShot, self.position(), Vector2D::new(0.0, -SHOT_SPEED))
    }

    pub fn spawn_rear_shot(&self) -> Entity {
        Entity::new(EntityKind::RearShot, self.position(), Vector2D::new(0.0, SHOT_SPEED))
    }

    pub fn spawn_bubble_shot(&self, rng: &mut impl Rng) -> Entity {
        let drift = rng.gen_range(-BUBBLE_DRIFT..=BUBBLE_DRIFT);
        Entity::new(EntityKind::BubbleShot, self.position(), Vector2D::new(drift, -BUBBLE_SPEED))
    }

    /// Returns the shield field to register, or `None` while on cooldown.
    pub fn activate_shield(&mut self, now: f64) -> Option<Entity> {
        if now - self.last_shield_time < SHIELD_COOLDOWN_SECS {
            debug!("Shield on cooldown ({:.2}s since last activation)", now - self.last_shield_time);
            return None;
        }
        self.shield_active = true;
        self.shield_expiry = now + SHIELD_DURATION_SECS;
        self.last_shield_time = now;
        info!("Shield activated at {:.2}s, expires at {:.2}s", now, self.shield_expiry);
        Some(Entity::new(EntityKind::ShieldField, self.position(), Vector2D::new(0.0, 0.0)))
    }

    pub fn take_hit(&mut self) {
        self.shield_integrity = self.shield_integrity.saturating_sub(ASTEROID_HIT_DAMAGE);
        if self.shield_integrity == 0 {
            self.body.alive = false;
        }
    }
}
