//! Configuration constants for the obstacle robot firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate of the command/status console
pub const UART_BAUD: u32 = 115_200;

/// UI refresh interval in milliseconds (~20 Hz)
pub const UI_UPDATE_MS: u32 = 50;

/// Interval between two sweep samples in milliseconds
pub const SCAN_INTERVAL_MS: u32 = 40;

/// Sweep bounds and step, in degrees
pub const SCAN_MIN_DEG: u8 = 30;
pub const SCAN_MAX_DEG: u8 = 150;
pub const SCAN_STEP_DEG: u8 = 10;

/// Pan actuator center position
pub const PAN_CENTER_DEG: u8 = 90;

/// Obstacles closer than this (cm) trigger an avoidance turn
pub const SAFE_DISTANCE_CM: u16 = 40;

/// "Nothing seen yet" marker for the sweep minimum
pub const NO_OBSTACLE_CM: u16 = 999;

/// Duration of the avoidance turn in Alert
pub const AVOID_TURN_MS: u32 = 120;

/// Reverse indicator blink period (half on, half off)
pub const REVERSE_BLINK_MS: u32 = 500;

/// Eye blink timing
pub const BLINK_INTERVAL_MS: u32 = 3000;
pub const BLINK_DURATION_MS: u32 = 150;

/// Ranging trigger pulse width in microseconds
pub const TRIGGER_PULSE_US: u16 = 10;

/// Bound for each of the two echo waits in microseconds
pub const ECHO_TIMEOUT_US: u32 = 30_000;

/// Echo widths outside this window are not trusted
pub const ECHO_MIN_US: u32 = 240;
pub const ECHO_MAX_US: u32 = 23_000;

/// Tunables of the behavior state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RobotConfig {
    pub scan_interval_ms: u32,
    pub scan_min_deg: u8,
    pub scan_max_deg: u8,
    pub scan_step_deg: u8,
    pub safe_distance_cm: u16,
    pub avoid_turn_ms: u32,
    pub reverse_blink_ms: u32,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: SCAN_INTERVAL_MS,
            scan_min_deg: SCAN_MIN_DEG,
            scan_max_deg: SCAN_MAX_DEG,
            scan_step_deg: SCAN_STEP_DEG,
            safe_distance_cm: SAFE_DISTANCE_CM,
            avoid_turn_ms: AVOID_TURN_MS,
            reverse_blink_ms: REVERSE_BLINK_MS,
        }
    }
}
