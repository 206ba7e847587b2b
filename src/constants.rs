// --- World ---
pub const SCREEN_WIDTH: f64 = 800.0;
pub const SCREEN_HEIGHT: f64 = 600.0;
pub const TICKS_PER_SECOND: u64 = 60;

// --- Ship ---
pub const SHIP_START_X: f64 = 100.0;
pub const SHIP_START_Y: f64 = 100.0;
pub const SHIP_SPEED: f64 = 5.0;
pub const SHIP_SIZE: f64 = 100.0;
pub const MAX_SHIELD_INTEGRITY: u32 = 100;
pub const ASTEROID_HIT_DAMAGE: u32 = 20;

// --- Shield ---
pub const SHIELD_COOLDOWN_SECS: f64 = 30.0;
pub const SHIELD_DURATION_SECS: f64 = 10.0;
pub const SHIELD_FIELD_SIZE: f64 = 120.0;

// --- Projectiles ---
pub const SHOT_SPEED: f64 = 10.0;
pub const SHOT_WIDTH: f64 = 5.0;
pub const SHOT_HEIGHT: f64 = 10.0;
pub const BUBBLE_SPEED: f64 = 3.0;
pub const BUBBLE_DRIFT: f64 = 1.0; // Max horizontal drift either way
pub const BUBBLE_SIZE: f64 = 20.0;

// --- Asteroids ---
pub const ASTEROID_SPAWN_INTERVAL_TICKS: u64 = TICKS_PER_SECOND; // Once per second
pub const ASTEROID_SPAWN_MIN_Y: f64 = -100.0;
pub const ASTEROID_SPAWN_MAX_Y: f64 = -40.0;
pub const ASTEROID_MAX_DRIFT: f64 = 1.0;
pub const ASTEROID_MIN_FALL_SPEED: f64 = 2.0;
pub const ASTEROID_MAX_FALL_SPEED: f64 = 6.0;

pub const ASTEROID_SIZE_SMALL: f64 = 30.0;
pub const ASTEROID_SIZE_MEDIUM: f64 = 60.0;
pub const ASTEROID_SIZE_LARGE: f64 = 100.0;

pub const SCORE_SMALL_ASTEROID: u32 = 30;
pub const SCORE_MEDIUM_ASTEROID: u32 = 20;
pub const SCORE_LARGE_ASTEROID: u32 = 10;

// --- Terminal front end ---
pub const HELD_KEY_DECAY_TICKS: u32 = 8; // Ticks a direction stays held without a repeat
pub const BACKGROUND_SCROLL_SPEED: f64 = 1.0;
pub const STAR_COUNT: usize = 60;
pub const DEFAULT_DEBUG_WIDTH: u16 = 80;
pub const DEFAULT_DEBUG_HEIGHT: u16 = 24;
pub const LOG_FILE: &str = "meteor-clash.log";
