//! Fixed simulation constants that are not part of the tunable configuration.

/// Grace period between lethal damage and removal of an attacker (seconds).
pub const DEATH_GRACE_SECS: f64 = 1.0;

/// Delay between consecutive barrels of a multi-shot defender (seconds).
pub const FOLLOW_UP_SHOT_DELAY_SECS: f64 = 0.2;

/// How long the "new best score" notice stays visible (seconds).
pub const BEST_SCORE_NOTICE_SECS: f64 = 3.0;

/// Score value marking a finished (lost) session.
pub const GAME_OVER_SCORE: f64 = -1.0;

/// Attacker speed is expressed in cells per this many seconds.
pub const SPEED_CELL_DIVISOR: f64 = 120.0;

/// Attackers are drawn this fraction of a cell below their row's top edge.
pub const ATTACKER_Y_OFFSET: f64 = 0.1;

// --- Sky-fall orbs ---

/// Horizontal margin kept free at the right edge when dropping a sky orb.
pub const SKY_ORB_RIGHT_MARGIN: f64 = 20.0;

/// Minimum landing height of a sky orb.
pub const SKY_ORB_MIN_TARGET_Y: f64 = 50.0;

/// Vertical span excluded from the landing band (top margin plus bottom margin).
pub const SKY_ORB_TARGET_Y_MARGIN: f64 = 100.0;

/// Default generator drop range as a fraction of the cell size.
pub const GENERATOR_DROP_FRACTION: f64 = 0.25;

/// Number of scores kept on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 3;

/// Version of the persisted session layout.
pub const SAVE_FORMAT_VERSION: u32 = 1;
