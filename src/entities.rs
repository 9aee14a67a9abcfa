/// All game entity types — pure data, no logic.

/// Where the session currently sits in the start → play → death cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum GamePhase {
    /// Title screen; no plane exists yet.
    NotStarted,
    Playing,
    /// Overlay shown until the player restarts.
    GameOver,
}

/// What collecting an item does to the plane.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemEffect {
    /// Multiplies the plane's tracked speed by 1.5 for the item's duration.
    SpeedBoost,
}

// ── Player avatar ─────────────────────────────────────────────────────────────

/// The player's plane.  `x`/`y` anchor the top-left corner of a
/// `size`×`size` box; the drawn center sits at `(x + size/2, y + size/2)`.
#[derive(Clone, Debug)]
pub struct Plane {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub base_speed: f64,
    /// Current speed — `base_speed`, or `base_speed * 1.5` while boosted.
    pub speed: f64,
    pub boosted: bool,
    /// Timestamp (ms) at which the active boost wears off.
    pub boost_ends_at: f64,
    /// Engine-flame animation phase, advanced on movement, wraps at 1.0.
    pub flame_anim: f64,
}

// ── Hazards & pickups ─────────────────────────────────────────────────────────

/// An inward-converging missile.  `x`/`y` is the disc center; the
/// velocity is fixed at spawn time and never changes (no homing).
#[derive(Clone, Debug)]
pub struct Missile {
    pub x: f64,
    pub y: f64,
    /// Disc radius.
    pub size: f64,
    pub speed: f64,
    pub dx: f64,
    pub dy: f64,
}

/// A collectible triangle.  Persists until the plane touches it;
/// there is no independent expiry.
#[derive(Clone, Debug)]
pub struct Item {
    pub x: f64,
    pub y: f64,
    /// Half-extent of the drawn triangle.
    pub size: f64,
    pub effect: ItemEffect,
    /// How long the granted effect lasts, in ms.
    pub duration: f64,
}

// ── Session timers ────────────────────────────────────────────────────────────

/// Last-fired timestamps (ms) for every periodic event, grouped so a
/// restart can reset them in one place.
#[derive(Clone, Debug, PartialEq)]
pub struct Timers {
    pub last_score_tick: f64,
    pub last_stage_tick: f64,
    pub last_missile_spawn: f64,
    pub last_item_spawn: f64,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire session state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub phase: GamePhase,
    /// `None` until the first start command; always `Some` while Playing.
    pub plane: Option<Plane>,
    pub missiles: Vec<Missile>,
    pub items: Vec<Item>,
    pub score: u32,
    /// Difficulty tier, starts at 1, raises missile spawn speed.
    pub stage: u32,
    /// Whether the transient "STAGE UP" banner is showing.
    pub stage_banner: bool,
    /// Timestamp (ms) the banner appeared, for the linear fade.
    pub stage_banner_since: f64,
    pub timers: Timers,
    /// Logical canvas size — fixed for the session, not the terminal size.
    pub width: f64,
    pub height: f64,
}
