use crate::constants::{DEFAULT_DEBUG_HEIGHT, DEFAULT_DEBUG_WIDTH};
use crate::error::GameError;

/// Runtime options, all taken from the command line:
///
/// ```text
/// meteor-clash [MAX_TICKS]
/// meteor-clash --debug [WIDTH HEIGHT [MAX_TICKS]]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Headless run with scripted input and an in-memory screen
    pub debug_mode: bool,

    /// Screen buffer size used in debug mode
    pub debug_width: u16,
    pub debug_height: u16,

    /// Stop after this many ticks even if the ship survives
    pub max_ticks: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            debug_width: DEFAULT_DEBUG_WIDTH,
            debug_height: DEFAULT_DEBUG_HEIGHT,
            max_ticks: None,
        }
    }
}

impl GameConfig {
    /// Parses the arguments that follow the program name.
    pub fn from_args(args: &[String]) -> Result<Self, GameError> {
        let mut config = GameConfig::default();
        match args {
            [] => {}
            [flag, rest @ ..] if flag == "--debug" => {
                config.debug_mode = true;
                match rest {
                    [] => {}
                    [width, height] => {
                        config.debug_width = parse_dimension(width)?;
                        config.debug_height = parse_dimension(height)?;
                    }
                    [width, height, ticks] => {
                        config.debug_width = parse_dimension(width)?;
                        config.debug_height = parse_dimension(height)?;
                        config.max_ticks = Some(parse_ticks(ticks)?);
                    }
                    _ => return Err(GameError::InvalidArgument(format!("unexpected arguments: {}", rest.join(" ")))),
                }
            }
            [ticks] => config.max_ticks = Some(parse_ticks(ticks)?),
            _ => return Err(GameError::InvalidArgument(format!("unexpected arguments: {}", args.join(" ")))),
        }
        Ok(config)
    }
}

fn parse_dimension(value: &str) -> Result<u16, GameError> {
    match value.parse::<u16>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(GameError::InvalidArgument(format!("bad screen dimension '{}'", value))),
    }
}

fn parse_ticks(value: &str) -> Result<u64, GameError> {
    value
        .parse::<u64>()
        .map_err(|_| GameError::InvalidArgument(format!("bad tick count '{}'", value)))
}
