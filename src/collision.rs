use crate::entities::{Entity, EntityKind, Ship};
use crate::types::aabb_overlap;
use log::{debug, info};

/// Resolves ship and projectile hits against the asteroid field for one tick.
/// Consumed entities are dropped from their collections. Returns the points
/// earned.
pub fn resolve_collisions(
    ship: &mut Ship,
    asteroids: &mut Vec<Entity>,
    projectile_groups: [&mut Vec<Entity>; 3],
) -> u32 {
    if !ship.shield_active {
        let ship_bounds = ship.bounds();
        asteroids.retain(|asteroid| {
            if aabb_overlap(&ship_bounds, &asteroid.bounds()) {
                ship.take_hit();
                info!("Ship hit, shield integrity now {}", ship.shield_integrity);
                false
            } else {
                true
            }
        });
    }

    let mut points = 0;
    for projectiles in projectile_groups {
        points += resolve_projectile_hits(projectiles, asteroids);
    }
    points
}

/// A projectile is spent on its first hit; when it overlaps several
/// asteroids at once the earliest-spawned one is credited.
fn resolve_projectile_hits(projectiles: &mut Vec<Entity>, asteroids: &mut Vec<Entity>) -> u32 {
    let mut points = 0;
    projectiles.retain(|projectile| {
        let projectile_bounds = projectile.bounds();
        let hit = asteroids
            .iter()
            .position(|asteroid| aabb_overlap(&projectile_bounds, &asteroid.bounds()));
        match hit {
            Some(index) => {
                let asteroid = asteroids.remove(index);
                if let EntityKind::Asteroid(size) = asteroid.kind {
                    debug!("{:?} destroyed a {:?} asteroid", projectile.kind, size);
                    points += size.score();
                }
                false
            }
            None => true,
        }
    });
    points
}
