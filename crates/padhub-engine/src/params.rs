use crate::types::Target;

/// A loosely typed positional argument as received from a host binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Arg {
    /// Reads a command-line token: booleans, numbers (decimal or `0x` hex),
    /// `null` and `undefined` are recognised, anything else stays a string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => return Arg::Bool(true),
            "false" => return Arg::Bool(false),
            "null" => return Arg::Null,
            "undefined" => return Arg::Undefined,
            _ => {}
        }
        if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            if let Ok(n) = u64::from_str_radix(hex, 16) {
                return Arg::Number(n as f64);
            }
        }
        match raw.parse::<f64>() {
            Ok(n) => Arg::Number(n),
            Err(_) => Arg::Str(raw.to_string()),
        }
    }
}

/// Operation parameters validated from positional arguments.
///
/// Malformed positions fall back to their defaults and are listed in
/// `warnings` as `wrong argument type: <name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub params: T,
    pub warnings: Vec<String>,
}

struct ArgReader<'a> {
    args: &'a [Arg],
    warnings: Vec<String>,
}

impl<'a> ArgReader<'a> {
    fn new(args: &'a [Arg]) -> Self {
        Self {
            args,
            warnings: Vec::new(),
        }
    }

    fn number<T: TryFrom<i64>>(&mut self, pos: usize, name: &str, default: T) -> T {
        let Some(arg) = self.args.get(pos) else {
            return default;
        };
        let value = match arg {
            Arg::Number(n) if n.is_finite() => T::try_from(n.trunc() as i64).ok(),
            _ => None,
        };
        value.unwrap_or_else(|| {
            self.warn(name);
            default
        })
    }

    /// Any finite number is a valid addressee, even one no slot can hold.
    fn target(&mut self, pos: usize, default: Target) -> Target {
        match self.args.get(pos) {
            None => default,
            Some(Arg::Number(n)) if n.is_finite() => Target::player(n.trunc() as i64),
            Some(_) => {
                self.warn("player");
                default
            }
        }
    }

    fn flag(&mut self, pos: usize, name: &str, default: bool) -> bool {
        match self.args.get(pos) {
            None => default,
            Some(Arg::Bool(b)) => *b,
            Some(_) => {
                self.warn(name);
                default
            }
        }
    }

    fn warn(&mut self, name: &str) {
        self.warnings.push(format!("wrong argument type: {name}"));
    }

    fn finish<T>(self, params: T) -> Parsed<T> {
        Parsed {
            params,
            warnings: self.warnings,
        }
    }
}

pub const DEFAULT_RUMBLE: u16 = 0xFFFC;
pub const DEFAULT_RUMBLE_MS: u32 = 250;

/// Parameters of a motor rumble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RumbleParams {
    pub low: u16,
    pub high: u16,
    pub duration_ms: u32,
    pub player: Target,
}

impl Default for RumbleParams {
    fn default() -> Self {
        Self {
            low: DEFAULT_RUMBLE,
            high: DEFAULT_RUMBLE,
            duration_ms: DEFAULT_RUMBLE_MS,
            player: Target::ALL,
        }
    }
}

impl RumbleParams {
    /// Positions: low, high, duration_ms, player.
    pub fn from_args(args: &[Arg]) -> Parsed<Self> {
        let d = Self::default();
        let mut r = ArgReader::new(args);
        let params = Self {
            low: r.number(0, "low_frequency_rumble", d.low),
            high: r.number(1, "high_frequency_rumble", d.high),
            duration_ms: r.number(2, "duration_ms", d.duration_ms),
            player: r.target(3, d.player),
        };
        r.finish(params)
    }
}

/// Parameters of an adaptive-trigger rumble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRumbleParams {
    pub left: u16,
    pub right: u16,
    pub duration_ms: u32,
    pub player: Target,
}

impl Default for TriggerRumbleParams {
    fn default() -> Self {
        Self {
            left: DEFAULT_RUMBLE,
            right: DEFAULT_RUMBLE,
            duration_ms: DEFAULT_RUMBLE_MS,
            player: Target::ALL,
        }
    }
}

impl TriggerRumbleParams {
    /// Positions: left, right, duration_ms, player.
    pub fn from_args(args: &[Arg]) -> Parsed<Self> {
        let d = Self::default();
        let mut r = ArgReader::new(args);
        let params = Self {
            left: r.number(0, "left_rumble", d.left),
            right: r.number(1, "right_rumble", d.right),
            duration_ms: r.number(2, "duration_ms", d.duration_ms),
            player: r.target(3, d.player),
        };
        r.finish(params)
    }
}

/// LED color. Defaults to blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedParams {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub player: Target,
}

impl Default for LedParams {
    fn default() -> Self {
        Self {
            red: 0,
            green: 0,
            blue: 0xFF,
            player: Target::ALL,
        }
    }
}

impl LedParams {
    /// Positions: red, green, blue, player.
    pub fn from_args(args: &[Arg]) -> Parsed<Self> {
        let d = Self::default();
        let mut r = ArgReader::new(args);
        let params = Self {
            red: r.number(0, "red", d.red),
            green: r.number(1, "green", d.green),
            blue: r.number(2, "blue", d.blue),
            player: r.target(3, d.player),
        };
        r.finish(params)
    }
}

/// Motion sensor toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorParams {
    pub enable: bool,
    pub player: Target,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            enable: true,
            player: Target::ALL,
        }
    }
}

impl SensorParams {
    /// Positions: enable, player.
    pub fn from_args(args: &[Arg]) -> Parsed<Self> {
        let d = Self::default();
        let mut r = ArgReader::new(args);
        let params = Self {
            enable: r.flag(0, "enable", d.enable),
            player: r.target(1, d.player),
        };
        r.finish(params)
    }
}
