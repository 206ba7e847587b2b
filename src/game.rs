use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyEventKind},
};
use rand::Rng;
use log::{error, info};

use crate::collision::resolve_collisions;
use crate::config::GameConfig;
use crate::constants::*;
use crate::entities::{Entity, Ship};
use crate::error::GameError;
use crate::input::{GameEvent, HeldKeys, SimulatedInput, translate_event};
use crate::rendering::{GameGrid, OutputTarget, Starfield};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Ended,
}

/// Tick-driven stand-in for a wall-clock repeating timer.
pub struct SpawnTimer {
    interval_ticks: u64,
    elapsed_ticks: u64,
}

impl SpawnTimer {
    pub fn new(interval_ticks: u64) -> Self {
        SpawnTimer { interval_ticks, elapsed_ticks: 0 }
    }

    /// Returns true on the ticks where the timer fires.
    pub fn tick(&mut self) -> bool {
        self.elapsed_ticks += 1;
        if self.elapsed_ticks >= self.interval_ticks {
            self.elapsed_ticks = 0;
            true
        } else {
            false
        }
    }
}

/// All gameplay state for one run. Knows nothing about terminals; time is
/// the tick counter divided by the tick rate.
pub struct GameSession<R: Rng> {
    pub ship: Ship,
    pub forward_shots: Vec<Entity>,
    pub rear_shots: Vec<Entity>,
    pub bubbles: Vec<Entity>,
    pub shield_fields: Vec<Entity>,
    pub asteroids: Vec<Entity>,
    pub score: u32,
    state: SessionState,
    tick: u64,
    rng: R,
}

impl<R: Rng> GameSession<R> {
    pub fn new(rng: R) -> Self {
        GameSession {
            ship: Ship::new(SHIP_START_X, SHIP_START_Y),
            forward_shots: Vec::new(),
            rear_shots: Vec::new(),
            bubbles: Vec::new(),
            shield_fields: Vec::new(),
            asteroids: Vec::new(),
            score: 0,
            state: SessionState::Running,
            tick: 0,
            rng,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation time in seconds at the current tick.
    pub fn now(&self) -> f64 {
        self.tick as f64 / TICKS_PER_SECOND as f64
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.tick / TICKS_PER_SECOND
    }

    /// Destroyed-asteroid points plus one point per second survived.
    pub fn display_score(&self) -> u64 {
        self.score as u64 + self.elapsed_seconds()
    }

    /// Every entity on screen in draw order; the ship comes last so it
    /// stays visible on top of rocks.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.shield_fields
            .iter()
            .chain(&self.asteroids)
            .chain(&self.forward_shots)
            .chain(&self.rear_shots)
            .chain(&self.bubbles)
            .chain(std::iter::once(&self.ship.body))
    }

    fn end(&mut self, reason: &str) {
        if self.state == SessionState::Running {
            info!("Session ended ({}) at tick {} with score {}", reason, self.tick, self.display_score());
            self.state = SessionState::Ended;
        }
    }

    /// Runs one tick: apply events, move everything, resolve collisions.
    pub fn step(&mut self, events: &[GameEvent], keys: &HeldKeys) {
        if self.state == SessionState::Ended {
            return;
        }
        if events.contains(&GameEvent::Quit) {
            self.end("quit");
            return;
        }

        let now = self.now();
        for _ in events.iter().filter(|&&event| event == GameEvent::SpawnAsteroid) {
            self.asteroids.push(Entity::spawn_asteroid(&mut self.rng));
        }
        for event in events {
            match event {
                GameEvent::FireForward => self.forward_shots.push(self.ship.spawn_forward_shot()),
                GameEvent::FireRear => self.rear_shots.push(self.ship.spawn_rear_shot()),
                GameEvent::FireBubble => self.bubbles.push(self.ship.spawn_bubble_shot(&mut self.rng)),
                GameEvent::ActivateShield => {
                    if let Some(field) = self.ship.activate_shield(now) {
                        self.shield_fields.push(field);
                    }
                }
                GameEvent::Quit | GameEvent::SpawnAsteroid => {}
            }
        }

        self.ship.update(keys);
        let ship = &mut self.ship;
        for group in [
            &mut self.forward_shots,
            &mut self.rear_shots,
            &mut self.bubbles,
            &mut self.shield_fields,
            &mut self.asteroids,
        ] {
            group.retain_mut(|entity| {
                entity.update(ship, now);
                entity.alive
            });
        }

        self.score += resolve_collisions(
            &mut self.ship,
            &mut self.asteroids,
            [&mut self.forward_shots, &mut self.rear_shots, &mut self.bubbles],
        );

        if !self.ship.is_alive() {
            self.end("ship destroyed");
        }
        self.tick += 1;
    }
}

/// Terminal front end: polls input, paces ticks and draws the session.
pub struct Game {
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub stdout_target: OutputTarget,
    config: GameConfig,
    simulated_input: Option<SimulatedInput>,
    reports_releases: bool,
}

impl Game {
    pub fn new(
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        config: GameConfig,
        simulated_input: Option<SimulatedInput>,
        reports_releases: bool,
    ) -> Self {
        Game {
            terminal_width,
            terminal_height,
            stdout_target,
            config,
            simulated_input,
            reports_releases,
        }
    }

    /// Plays one session and returns the final displayed score.
    pub fn run(&mut self) -> Result<u64, GameError> {
        if !self.config.debug_mode {
            self.show_title_screen()?;
        }

        let mut rng = rand::thread_rng();
        let mut session = GameSession::new(rand::thread_rng());
        let mut held_keys = HeldKeys::new(self.reports_releases);
        let mut spawn_timer = SpawnTimer::new(ASTEROID_SPAWN_INTERVAL_TICKS);
        let mut starfield = Starfield::new(&mut rng, STAR_COUNT);
        let mut game_grid = GameGrid::new(self.terminal_width, self.terminal_height);
        let frame_budget = Duration::from_secs(1) / TICKS_PER_SECOND as u32;

        while session.is_running() && self.config.max_ticks.is_none_or(|max| session.tick() < max) {
            let frame_start = Instant::now();

            held_keys.tick();
            let mut events = self.poll_events(session.tick(), &mut held_keys, &mut game_grid)?;
            if spawn_timer.tick() {
                events.push(GameEvent::SpawnAsteroid);
            }
            session.step(&events, &held_keys);

            game_grid.clear();
            starfield.scroll();
            starfield.draw(&mut game_grid);
            for entity in session.entities() {
                game_grid.draw_entity(entity);
            }
            self.render(&game_grid, &session)?;

            if !self.config.debug_mode {
                let spent = frame_start.elapsed();
                if spent < frame_budget {
                    thread::sleep(frame_budget - spent);
                }
            }
        }

        let final_score = session.display_score();
        info!("Game over ({:?}) after {}s. Final score: {}", session.state(), session.elapsed_seconds(), final_score);
        if !self.config.debug_mode {
            self.show_game_over_screen(final_score)?;
        }
        Ok(final_score)
    }

    /// Drains every pending input event for this tick.
    fn poll_events(&mut self, tick: u64, held_keys: &mut HeldKeys, game_grid: &mut GameGrid) -> io::Result<Vec<GameEvent>> {
        let mut raw_events = Vec::new();
        if let Some(sim_input) = &mut self.simulated_input {
            while sim_input.poll(tick)? {
                raw_events.push(sim_input.read()?);
            }
        } else {
            while event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
                raw_events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
            }
        }

        let mut events = Vec::new();
        for raw in &raw_events {
            if let Event::Resize(new_width, new_height) = raw {
                info!("Terminal resized to {}x{}", new_width, new_height);
                self.terminal_width = *new_width;
                self.terminal_height = *new_height;
                game_grid.resize(*new_width, *new_height);
                self.stdout_target.execute_other_command(crossterm::terminal::Clear(crossterm::terminal::ClearType::All))?;
                continue;
            }
            if let Some(event) = translate_event(raw, held_keys) {
                events.push(event);
            }
        }
        Ok(events)
    }

    fn render<R: Rng>(&mut self, game_grid: &GameGrid, session: &GameSession<R>) -> io::Result<()> {
        match self.stdout_target {
            OutputTarget::ScreenBuffer(ref mut sb) => game_grid.copy_into(sb),
            OutputTarget::Stdout(_) => game_grid.render(&mut self.stdout_target)?,
        }

        self.stdout_target.write_at(0, 0, &format!("Shield: {}", session.ship.shield_integrity))?;
        self.stdout_target.write_at(0, 1, &format!("Score: {}", session.display_score()))?;

        let controls_text = [
            "Controls:",
            "  Arrows : Move",
            "  Space  : Fire Forward",
            "  o      : Fire Rear",
            "  i      : Fire Bubble",
            "  u      : Shield",
            "  q      : Quit",
        ];
        let controls_start_y = self.terminal_height.saturating_sub(controls_text.len() as u16);
        for (i, line) in controls_text.iter().enumerate() {
            self.stdout_target.write_at(0, controls_start_y.saturating_add(i as u16), line)?;
        }

        if let OutputTarget::ScreenBuffer(ref sb) = self.stdout_target {
            if session.tick() % TICKS_PER_SECOND == 0 {
                sb.print_to_log();
            }
        }

        self.stdout_target.flush()?;
        Ok(())
    }

    fn centered_x(&self, text: &str) -> u16 {
        (self.terminal_width / 2).saturating_sub(text.len() as u16 / 2)
    }

    fn wait_for_key() -> io::Result<()> {
        loop {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }

    fn show_title_screen(&mut self) -> io::Result<()> {
        let title_art = [
            r" __  __ ___ _____ ___  ___  ___     ___ _      _   ___ _  _ ",
            r"|  \/  | __|_   _| __|/ _ \| _ \   / __| |    /_\ / __| || |",
            r"| |\/| | _|  | | | _|| (_) |   /  | (__| |__ / _ \\__ \ __ |",
            r"|_|  |_|___| |_| |___|\___/|_|_\   \___|____/_/ \_\___/_||_|",
        ];

        let title_start_y = (self.terminal_height / 2).saturating_sub(title_art.len() as u16);
        for (i, line) in title_art.iter().enumerate() {
            let x = self.centered_x(line);
            self.stdout_target.write_at(x, title_start_y + i as u16, line)?;
        }

        let press_any_key_msg = "Press any key to start...";
        let msg_x = self.centered_x(press_any_key_msg);
        self.stdout_target.write_at(msg_x, self.terminal_height.saturating_sub(5), press_any_key_msg)?;
        self.stdout_target.flush()?;

        Self::wait_for_key()?;

        GameGrid::new(self.terminal_width, self.terminal_height).clear_screen_manual(&mut self.stdout_target)?;
        self.stdout_target.flush()?;
        Ok(())
    }

    fn show_game_over_screen(&mut self, score: u64) -> io::Result<()> {
        GameGrid::new(self.terminal_width, self.terminal_height).clear_screen_manual(&mut self.stdout_target)?;

        let game_over_msg = "GAME OVER!";
        let score_msg = format!("Final Score: {}", score);
        let exit_msg = "Press any key to exit...";
        let middle = self.terminal_height / 2;

        for (text, y) in [
            (game_over_msg, middle.saturating_sub(2)),
            (score_msg.as_str(), middle),
            (exit_msg, middle + 2),
        ] {
            let x = self.centered_x(text);
            self.stdout_target.write_at(x, y, text)?;
        }
        self.stdout_target.execute_move_to(MoveTo(0, 0))?;
        self.stdout_target.flush()?;

        Self::wait_for_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AsteroidSize, EntityKind};
    use crate::input::Direction;
    use crate::rendering::ScreenBuffer;
    use crate::types::Vector2D;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session() -> GameSession<StdRng> {
        GameSession::new(StdRng::seed_from_u64(1234))
    }

    fn idle(session: &mut GameSession<StdRng>, ticks: u64) {
        let keys = HeldKeys::default();
        for _ in 0..ticks {
            session.step(&[], &keys);
        }
    }

    fn rock_on_ship(session: &GameSession<StdRng>) -> Entity {
        Entity::new(
            EntityKind::Asteroid(AsteroidSize::Medium),
            session.ship.position(),
            Vector2D::new(0.0, 0.0),
        )
    }

    #[test]
    fn test_spawn_timer_fires_every_interval() {
        let mut timer = SpawnTimer::new(ASTEROID_SPAWN_INTERVAL_TICKS);
        let fired: Vec<u64> = (1..=180).filter(|_| timer.tick()).collect();
        assert_eq!(fired.len(), 3);

        let mut timer = SpawnTimer::new(60);
        let ticks: Vec<u64> = (1..=180u64).filter(|_| timer.tick()).collect();
        assert_eq!(ticks, vec![60, 120, 180]);
    }

    #[test]
    fn test_spawn_event_registers_asteroid() {
        let mut session = session();
        session.step(&[GameEvent::SpawnAsteroid, GameEvent::SpawnAsteroid], &HeldKeys::default());
        assert_eq!(session.asteroids.len(), 2);
    }

    #[test]
    fn test_fire_events_register_projectiles() {
        let mut session = session();
        let events = [
            GameEvent::FireForward,
            GameEvent::FireForward,
            GameEvent::FireRear,
            GameEvent::FireBubble,
        ];
        session.step(&events, &HeldKeys::default());
        assert_eq!(session.forward_shots.len(), 2);
        assert_eq!(session.rear_shots.len(), 1);
        assert_eq!(session.bubbles.len(), 1);
        assert_eq!(session.forward_shots[0].position, Vector2D::new(100.0, 90.0));
    }

    #[test]
    fn test_quit_ends_session_for_good() {
        let mut session = session();
        session.step(&[GameEvent::Quit, GameEvent::FireForward], &HeldKeys::default());
        assert_eq!(session.state(), SessionState::Ended);
        assert!(session.forward_shots.is_empty());

        session.step(&[GameEvent::FireForward], &HeldKeys::default());
        assert_eq!(session.state(), SessionState::Ended);
        assert!(session.forward_shots.is_empty());
    }

    #[test]
    fn test_held_keys_move_ship() {
        let mut session = session();
        let mut keys = HeldKeys::default();
        keys.press(Direction::Right);
        session.step(&[], &keys);
        assert_eq!(session.ship.position(), Vector2D::new(105.0, 100.0));
    }

    #[test]
    fn test_shield_lasts_ten_seconds() {
        let mut session = session();
        session.step(&[GameEvent::ActivateShield], &HeldKeys::default());
        assert!(session.ship.shield_active);
        assert_eq!(session.shield_fields.len(), 1);

        // Ticks 1..=600 run at t <= 10.0s.
        idle(&mut session, 600);
        assert!(session.ship.shield_active);
        assert_eq!(session.shield_fields.len(), 1);

        idle(&mut session, 1);
        assert!(!session.ship.shield_active);
        assert!(session.shield_fields.is_empty());
    }

    #[test]
    fn test_second_activation_within_cooldown_is_ignored() {
        let mut session = session();
        session.step(&[GameEvent::ActivateShield], &HeldKeys::default());
        let expiry = session.ship.shield_expiry;

        idle(&mut session, 299);
        session.step(&[GameEvent::ActivateShield], &HeldKeys::default());
        assert_eq!(session.ship.shield_expiry, expiry);
        assert_eq!(session.shield_fields.len(), 1);

        // Lands the next activation on tick 1800, exactly t = 30s.
        idle(&mut session, 1499);
        session.step(&[GameEvent::ActivateShield], &HeldKeys::default());
        assert!(session.ship.shield_active);
        assert_eq!(session.ship.shield_expiry, 40.0);
    }

    #[test]
    fn test_shielded_ship_ignores_asteroids() {
        let mut session = session();
        session.step(&[GameEvent::ActivateShield], &HeldKeys::default());
        let rock = rock_on_ship(&session);
        session.asteroids.push(rock);
        idle(&mut session, 1);
        assert_eq!(session.asteroids.len(), 1);
        assert_eq!(session.ship.shield_integrity, MAX_SHIELD_INTEGRITY);
    }

    #[test]
    fn test_five_hits_end_session() {
        let mut session = session();
        for expected in [80, 60, 40, 20] {
            let rock = rock_on_ship(&session);
            session.asteroids.push(rock);
            idle(&mut session, 1);
            assert_eq!(session.ship.shield_integrity, expected);
            assert!(session.is_running());
        }
        let rock = rock_on_ship(&session);
        session.asteroids.push(rock);
        idle(&mut session, 1);
        assert_eq!(session.ship.shield_integrity, 0);
        assert!(!session.ship.is_alive());
        assert_eq!(session.state(), SessionState::Ended);
    }

    #[test]
    fn test_shots_score_through_session() {
        let mut session = session();
        let x = session.ship.position().x;
        for (size, y) in [(AsteroidSize::Small, 10.0), (AsteroidSize::Large, 300.0)] {
            session.asteroids.push(Entity::new(EntityKind::Asteroid(size), Vector2D::new(x, y), Vector2D::new(0.0, 0.0)));
        }
        session.step(&[GameEvent::FireForward, GameEvent::FireRear], &HeldKeys::default());
        idle(&mut session, 20);
        assert_eq!(session.score, SCORE_SMALL_ASTEROID + SCORE_LARGE_ASTEROID);
        assert!(session.asteroids.is_empty());
    }

    #[test]
    fn test_display_score_adds_whole_seconds() {
        let mut session = session();
        session.score = 50;
        idle(&mut session, 119);
        assert_eq!(session.display_score(), 51);
        idle(&mut session, 1);
        assert_eq!(session.display_score(), 52);
    }

    #[test]
    fn test_entities_draw_ship_last() {
        let mut session = session();
        session.step(&[GameEvent::FireForward, GameEvent::SpawnAsteroid], &HeldKeys::default());
        let kinds: Vec<EntityKind> = session.entities().map(|e| e.kind).collect();
        assert_eq!(kinds.len(), 3);
        assert_eq!(kinds[2], EntityKind::Ship);
    }

    #[test]
    fn test_debug_run_with_scripted_quit() {
        let config = GameConfig { debug_mode: true, ..GameConfig::default() };
        let script = vec![
            (2, Event::Key(crossterm::event::KeyCode::Char(' ').into())),
            (90, Event::Key(crossterm::event::KeyCode::Char('q').into())),
        ];
        let mut game = Game::new(
            80,
            24,
            OutputTarget::ScreenBuffer(ScreenBuffer::new(80, 24)),
            config,
            Some(SimulatedInput::new(script)),
            false,
        );
        let score = game.run().unwrap();
        assert!(score >= 1, "ninety ticks survive at least one second");

        match &game.stdout_target {
            OutputTarget::ScreenBuffer(sb) => {
                assert!(sb.row(0).starts_with("Shield: "));
                assert!(sb.row(1).starts_with("Score: "));
                assert!(sb.row(23).starts_with("  q      : Quit"));
            }
            OutputTarget::Stdout(_) => unreachable!(),
        }
    }

    #[test]
    fn test_debug_run_stops_at_max_ticks() {
        let config = GameConfig { debug_mode: true, max_ticks: Some(30), ..GameConfig::default() };
        let mut game = Game::new(
            40,
            12,
            OutputTarget::ScreenBuffer(ScreenBuffer::new(40, 12)),
            config,
            Some(SimulatedInput::new(Vec::new())),
            false,
        );
        assert_eq!(game.run().unwrap(), 0);
    }
}
