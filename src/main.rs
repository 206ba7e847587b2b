mod collision;
mod config;
mod constants;
mod entities;
mod error;
mod game;
mod input;
mod rendering;
mod types;

use std::env;
use std::io::{self, Write};
use crossterm::{
    cursor::{Hide, Show},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement},
};
use log::{error, info};

use crate::config::GameConfig;
use crate::constants::LOG_FILE;
use crate::error::GameError;
use crate::game::Game;
use crate::input::SimulatedInput;
use crate::rendering::{GameGrid, OutputTarget, ScreenBuffer};

fn main() -> Result<(), GameError> {
    simple_logging::log_to_file(LOG_FILE, log::LevelFilter::Info)?;
    info!("Starting Meteor Clash.");

    let args: Vec<String> = env::args().skip(1).collect();
    let config = GameConfig::from_args(&args).map_err(|e| { error!("{}", e); e })?;

    if config.debug_mode {
        run_headless(config)
    } else {
        run_in_terminal(config)
    }
}

fn run_headless(config: GameConfig) -> Result<(), GameError> {
    let (width, height) = (config.debug_width, config.debug_height);
    info!("Debug mode enabled, resolution {}x{}", width, height);
    let stdout_target = OutputTarget::ScreenBuffer(ScreenBuffer::new(width, height));
    let mut game = Game::new(width, height, stdout_target, config, Some(SimulatedInput::demo_script()), false);
    let score = game.run()?;
    println!("Final score: {}", score);
    Ok(())
}

fn run_in_terminal(config: GameConfig) -> Result<(), GameError> {
    info!("Attempting to enable raw mode.");
    enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
    let mut stdout_target = OutputTarget::Stdout(io::stdout());

    // Release events keep held arrows precise where the terminal supports them.
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    let result = match setup_screen(&mut stdout_target, enhanced_keys) {
        Ok((width, height)) => {
            let mut game = Game::new(width, height, stdout_target, config, None, enhanced_keys);
            let outcome = game.run();
            stdout_target = game.stdout_target;
            outcome
        }
        Err(e) => Err(e),
    };

    restore_terminal(&mut stdout_target, enhanced_keys);
    result.map(|score| info!("Exited with score {}", score))
}

fn setup_screen(stdout_target: &mut OutputTarget, enhanced_keys: bool) -> Result<(u16, u16), GameError> {
    let (width, height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", width, height);

    if enhanced_keys {
        stdout_target.execute_other_command(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
        info!("Keyboard enhancement enabled.");
    }
    GameGrid::new(width, height)
        .clear_screen_manual(stdout_target)
        .map_err(|e| { error!("Failed to clear screen manually: {}", e); e })?;
    stdout_target.execute_other_command(Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;
    stdout_target.flush()?;
    Ok((width, height))
}

fn restore_terminal(stdout_target: &mut OutputTarget, enhanced_keys: bool) {
    if enhanced_keys {
        if let Err(e) = stdout_target.execute_other_command(PopKeyboardEnhancementFlags) {
            error!("Failed to pop keyboard enhancement flags: {}", e);
        }
    }
    if let Err(e) = stdout_target.execute_other_command(Show) {
        error!("Failed to show cursor: {}", e);
    }
    if let Err(e) = disable_raw_mode() {
        error!("Failed to disable raw mode: {}", e);
    }
    info!("Terminal restored.");
}
