use std::collections::{HashMap, VecDeque};
use std::io;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::constants::HELD_KEY_DECAY_TICKS;

/// Discrete things that happen to a session within one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Quit,
    SpawnAsteroid,
    FireForward,
    FireRear,
    FireBubble,
    ActivateShield,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            _ => None,
        }
    }
}

// Most terminals never report key releases, so by default a direction
// counts as held for a few ticks after its last press or repeat. Terminals
// with the keyboard enhancement protocol report releases, and then a press
// holds until its release.
#[derive(Clone, Debug, Default)]
pub struct HeldKeys {
    ticks_left: [u32; 4],
    reports_releases: bool,
}

impl HeldKeys {
    pub fn new(reports_releases: bool) -> Self {
        HeldKeys { ticks_left: [0; 4], reports_releases }
    }

    pub fn press(&mut self, direction: Direction) {
        self.ticks_left[direction.index()] = HELD_KEY_DECAY_TICKS;
    }

    pub fn release(&mut self, direction: Direction) {
        self.ticks_left[direction.index()] = 0;
    }

    /// Ages every hold by one tick. No-op when releases are reported.
    pub fn tick(&mut self) {
        if self.reports_releases {
            return;
        }
        for remaining in &mut self.ticks_left {
            *remaining = remaining.saturating_sub(1);
        }
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.ticks_left[direction.index()] > 0
    }

    pub fn left(&self) -> bool {
        self.is_held(Direction::Left)
    }

    pub fn right(&self) -> bool {
        self.is_held(Direction::Right)
    }

    pub fn up(&self) -> bool {
        self.is_held(Direction::Up)
    }

    pub fn down(&self) -> bool {
        self.is_held(Direction::Down)
    }
}

/// Folds one terminal event into the held-key state and returns the
/// discrete game event it stands for, if any.
pub fn translate_event(event: &Event, held: &mut HeldKeys) -> Option<GameEvent> {
    match event {
        Event::Key(key_event) => translate_key(key_event, held),
        _ => None,
    }
}

fn translate_key(key_event: &KeyEvent, held: &mut HeldKeys) -> Option<GameEvent> {
    if let Some(direction) = Direction::from_key(key_event.code) {
        match key_event.kind {
            KeyEventKind::Release => held.release(direction),
            KeyEventKind::Press | KeyEventKind::Repeat => held.press(direction),
        }
        return None;
    }

    // Actions fire once per press, repeats are ignored.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => Some(GameEvent::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(GameEvent::Quit),
        KeyCode::Char(' ') => Some(GameEvent::FireForward),
        KeyCode::Char('o') => Some(GameEvent::FireRear),
        KeyCode::Char('i') => Some(GameEvent::FireBubble),
        KeyCode::Char('u') => Some(GameEvent::ActivateShield),
        _ => None,
    }
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, VecDeque<Event>>,
    current_tick: u64,
}

impl SimulatedInput {
    pub fn new(script: Vec<(u64, Event)>) -> Self {
        let mut events: HashMap<u64, VecDeque<Event>> = HashMap::new();
        for (tick, event) in script {
            events.entry(tick).or_default().push_back(event);
        }
        SimulatedInput { events, current_tick: 0 }
    }

    /// Scripted session used by `--debug`: fly about, use every weapon,
    /// raise the shield and quit after a few seconds.
    pub fn demo_script() -> Self {
        let press = |code: KeyCode| Event::Key(code.into());
        let mut script = Vec::new();
        for tick in 1..40 {
            script.push((tick, press(KeyCode::Right)));
        }
        script.push((5, press(KeyCode::Char(' '))));
        script.push((20, press(KeyCode::Char('o'))));
        script.push((35, press(KeyCode::Char('i'))));
        script.push((50, press(KeyCode::Char('u'))));
        for tick in (60..240).step_by(15) {
            script.push((tick, press(KeyCode::Char(' '))));
        }
        script.push((300, press(KeyCode::Char('q'))));
        SimulatedInput::new(script)
    }

    pub fn poll(&mut self, tick: u64) -> io::Result<bool> {
        self.current_tick = tick;
        Ok(self.events.get(&tick).is_some_and(|queue| !queue.is_empty()))
    }

    pub fn read(&mut self) -> io::Result<Event> {
        let next = self.events.get_mut(&self.current_tick).and_then(|queue| queue.pop_front());
        Ok(next.unwrap_or(Event::Key(KeyCode::Null.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(code.into())
    }

    fn key_with_kind(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind))
    }

    #[test]
    fn test_action_keys() {
        let mut held = HeldKeys::default();
        assert_eq!(translate_event(&key(KeyCode::Char(' ')), &mut held), Some(GameEvent::FireForward));
        assert_eq!(translate_event(&key(KeyCode::Char('o')), &mut held), Some(GameEvent::FireRear));
        assert_eq!(translate_event(&key(KeyCode::Char('i')), &mut held), Some(GameEvent::FireBubble));
        assert_eq!(translate_event(&key(KeyCode::Char('u')), &mut held), Some(GameEvent::ActivateShield));
        assert_eq!(translate_event(&key(KeyCode::Char('q')), &mut held), Some(GameEvent::Quit));
        assert_eq!(translate_event(&key(KeyCode::Esc), &mut held), Some(GameEvent::Quit));
        assert_eq!(translate_event(&key(KeyCode::Char('x')), &mut held), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut held = HeldKeys::default();
        let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(translate_event(&event, &mut held), Some(GameEvent::Quit));
    }

    #[test]
    fn test_repeat_does_not_fire() {
        let mut held = HeldKeys::default();
        let event = key_with_kind(KeyCode::Char(' '), KeyEventKind::Repeat);
        assert_eq!(translate_event(&event, &mut held), None);
    }

    #[test]
    fn test_arrow_press_holds_until_decay() {
        let mut held = HeldKeys::default();
        assert_eq!(translate_event(&key(KeyCode::Left), &mut held), None);
        assert!(held.left());
        assert!(!held.right() && !held.up() && !held.down());

        for _ in 0..HELD_KEY_DECAY_TICKS - 1 {
            held.tick();
        }
        assert!(held.left());
        held.tick();
        assert!(!held.left());
    }

    #[test]
    fn test_repeat_refreshes_hold() {
        let mut held = HeldKeys::default();
        translate_event(&key(KeyCode::Up), &mut held);
        for _ in 0..HELD_KEY_DECAY_TICKS - 1 {
            held.tick();
        }
        translate_event(&key_with_kind(KeyCode::Up, KeyEventKind::Repeat), &mut held);
        held.tick();
        assert!(held.up());
    }

    #[test]
    fn test_reported_releases_hold_until_release() {
        let mut held = HeldKeys::new(true);
        translate_event(&key(KeyCode::Left), &mut held);
        for _ in 0..30 {
            held.tick();
            assert!(held.left());
        }
        translate_event(&key_with_kind(KeyCode::Left, KeyEventKind::Release), &mut held);
        assert!(!held.left());
    }

    #[test]
    fn test_release_clears_hold() {
        let mut held = HeldKeys::default();
        translate_event(&key(KeyCode::Down), &mut held);
        translate_event(&key_with_kind(KeyCode::Down, KeyEventKind::Release), &mut held);
        assert!(!held.down());
    }

    #[test]
    fn test_simulated_input_replays_in_order() {
        let mut input = SimulatedInput::new(vec![
            (3, key(KeyCode::Char(' '))),
            (3, key(KeyCode::Char('q'))),
        ]);
        assert!(!input.poll(2).unwrap());
        assert!(input.poll(3).unwrap());
        assert_eq!(input.read().unwrap(), key(KeyCode::Char(' ')));
        assert!(input.poll(3).unwrap());
        assert_eq!(input.read().unwrap(), key(KeyCode::Char('q')));
        assert!(!input.poll(3).unwrap());
    }
}
