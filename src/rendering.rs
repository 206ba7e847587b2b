use std::io::{self, Write};
use log::info;
use rand::Rng;
use crossterm::{
    cursor::MoveTo,
    execute,
};

use crate::constants::*;
use crate::entities::{AsteroidSize, Entity, EntityKind};
use crate::types::{Rect, Vector2D};

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            if self.cursor_y < self.height && self.cursor_x < self.width {
                self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
            }
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    #[cfg(test)]
    pub fn row(&self, y: u16) -> String {
        self.buffer[y as usize].iter().collect()
    }

    pub fn clear(&mut self) {
        self.buffer = vec![vec![' '; self.width as usize]; self.height as usize];
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

// --- OutputTarget: real terminal or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Ignore in debug mode
        }
    }

    pub fn write_at(&mut self, x: u16, y: u16, text: &str) -> io::Result<()> {
        self.execute_move_to(MoveTo(x, y))?;
        write!(self, "{}", text)
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                let s = String::from_utf8_lossy(buf);
                sb.write_str(&s);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}

// --- GameGrid: the 800x600 world squeezed onto character cells ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        *self = GameGrid::new(width, height);
    }

    pub fn clear(&mut self) {
        for row in &mut self.grid {
            row.fill(' ');
        }
    }

    #[cfg(test)]
    pub fn get_char(&self, x: u16, y: u16) -> Option<char> {
        self.grid.get(y as usize).and_then(|row| row.get(x as usize)).copied()
    }

    pub fn set_cell(&mut self, x: i32, y: i32, c: char) {
        if x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32 {
            self.grid[y as usize][x as usize] = c;
        }
    }

    fn column(&self, world_x: f64) -> i32 {
        (world_x / SCREEN_WIDTH * self.width as f64).floor() as i32
    }

    fn line(&self, world_y: f64) -> i32 {
        (world_y / SCREEN_HEIGHT * self.height as f64).floor() as i32
    }

    /// Cell under a world point. The far screen edges belong to the last
    /// column/row rather than falling off the grid.
    pub fn cell_at(&self, point: Vector2D) -> (i32, i32) {
        let mut x = self.column(point.x);
        let mut y = self.line(point.y);
        if point.x == SCREEN_WIDTH {
            x -= 1;
        }
        if point.y == SCREEN_HEIGHT {
            y -= 1;
        }
        (x, y)
    }

    pub fn fill_rect(&mut self, rect: &Rect, c: char) {
        let (center_x, center_y) = self.cell_at(rect.center);
        let x0 = self.column(rect.left()).min(center_x);
        let x1 = (self.column(rect.right()) - 1).max(center_x);
        let y0 = self.line(rect.top()).min(center_y);
        let y1 = (self.line(rect.bottom()) - 1).max(center_y);
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.set_cell(x, y, c);
            }
        }
    }

    pub fn outline_rect(&mut self, rect: &Rect, c: char) {
        let x0 = self.column(rect.left());
        let x1 = self.column(rect.right());
        let y0 = self.line(rect.top());
        let y1 = self.line(rect.bottom());
        for x in x0..=x1 {
            self.set_cell(x, y0, c);
            self.set_cell(x, y1, c);
        }
        for y in y0..=y1 {
            self.set_cell(x0, y, c);
            self.set_cell(x1, y, c);
        }
    }

    pub fn draw_entity(&mut self, entity: &Entity) {
        let (x, y) = self.cell_at(entity.position);
        match entity.kind {
            EntityKind::Ship => {
                self.set_cell(x - 1, y, '<');
                self.set_cell(x, y, 'A');
                self.set_cell(x + 1, y, '>');
            }
            EntityKind::ForwardShot => self.set_cell(x, y, '|'),
            EntityKind::RearShot => self.set_cell(x, y, '!'),
            EntityKind::BubbleShot => self.set_cell(x, y, 'o'),
            EntityKind::ShieldField => self.outline_rect(&entity.bounds(), '#'),
            EntityKind::Asteroid(size) => {
                let c = match size {
                    AsteroidSize::Small => '.',
                    AsteroidSize::Medium => 'O',
                    AsteroidSize::Large => '@',
                };
                self.fill_rect(&entity.bounds(), c);
            }
        }
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.grid[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }

    pub fn copy_into(&self, sb: &mut ScreenBuffer) {
        sb.clear();
        for (y, row) in self.grid.iter().enumerate().take(sb.height as usize) {
            for (x, &c) in row.iter().enumerate().take(sb.width as usize) {
                sb.buffer[y][x] = c;
            }
        }
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(self.width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

/// Background stars drifting down the screen, wrapping at the bottom.
pub struct Starfield {
    stars: Vec<Vector2D>,
    offset: f64,
}

impl Starfield {
    pub fn new(rng: &mut impl Rng, count: usize) -> Self {
        let stars = (0..count)
            .map(|_| Vector2D::new(rng.gen_range(0.0..SCREEN_WIDTH), rng.gen_range(0.0..SCREEN_HEIGHT)))
            .collect();
        Starfield { stars, offset: 0.0 }
    }

    pub fn scroll(&mut self) {
        self.offset += BACKGROUND_SCROLL_SPEED;
        if self.offset >= SCREEN_HEIGHT {
            self.offset = 0.0;
        }
    }

    pub fn star_positions(&self) -> impl Iterator<Item = Vector2D> + '_ {
        self.stars
            .iter()
            .map(move |star| Vector2D::new(star.x, (star.y + self.offset) % SCREEN_HEIGHT))
    }

    pub fn draw(&self, grid: &mut GameGrid) {
        for star in self.star_positions() {
            let (x, y) = grid.cell_at(star);
            grid.set_cell(x, y, '\'');
        }
    }
}
