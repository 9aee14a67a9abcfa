/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (plus a timestamp in ms and, where needed, an RNG
/// handle) and returns a brand-new `GameState`.  Side effects are
/// limited to the injected RNG, so a seeded RNG and synthetic
/// timestamps replay a session exactly.

use rand::Rng;

use crate::entities::{
    GamePhase, GameState, Item, ItemEffect, Missile, Plane, Timers,
};

// ── Canvas & tuning constants ────────────────────────────────────────────────

/// Logical canvas size; the display layer scales this onto the terminal.
pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;

pub const PLANE_SIZE: f64 = 24.0;
pub const PLANE_BASE_SPEED: f64 = 5.0;
/// Multiplier applied to the plane's tracked speed while boosted.
pub const BOOST_FACTOR: f64 = 1.5;

/// Missile disc radius.
pub const MISSILE_SIZE: f64 = 3.0;
/// Item triangle half-extent.
pub const ITEM_SIZE: f64 = 6.0;
/// How long a collected speed boost lasts, in ms.
pub const ITEM_BOOST_MS: f64 = 5_000.0;

/// One score point per this much elapsed play time.
pub const SCORE_TICK_MS: f64 = 100.0;
/// Stage raises by one per this much elapsed play time.
pub const STAGE_TICK_MS: f64 = 10_000.0;
/// How long the "STAGE UP" banner stays on screen.
pub const STAGE_BANNER_MS: f64 = 2_000.0;
pub const MISSILE_SPAWN_MS: f64 = 50.0;
pub const ITEM_SPAWN_MS: f64 = 5_000.0;
/// Item spawns are skipped while this many are already live.
pub const MAX_LIVE_ITEMS: usize = 3;
/// The game-over overlay fades in over this long.
pub const GAME_OVER_FADE_MS: f64 = 1_000.0;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the pre-game state: title screen, no plane, everything zeroed.
pub fn init_state(width: f64, height: f64) -> GameState {
    GameState {
        phase: GamePhase::NotStarted,
        plane: None,
        missiles: Vec::new(),
        items: Vec::new(),
        score: 0,
        stage: 1,
        stage_banner: false,
        stage_banner_since: 0.0,
        timers: Timers {
            last_score_tick: 0.0,
            last_stage_tick: 0.0,
            last_missile_spawn: 0.0,
            last_item_spawn: 0.0,
        },
        width,
        height,
    }
}

/// A fresh plane centered on the canvas.
pub fn new_plane(width: f64, height: f64) -> Plane {
    Plane {
        x: width / 2.0 - PLANE_SIZE / 2.0,
        y: height / 2.0 - PLANE_SIZE / 2.0,
        size: PLANE_SIZE,
        base_speed: PLANE_BASE_SPEED,
        speed: PLANE_BASE_SPEED,
        boosted: false,
        boost_ends_at: 0.0,
        flame_anim: 0.0,
    }
}

/// Spawn a missile just outside a random edge, aimed at the canvas
/// center.  Speed scales with the stage at spawn time only — later
/// stage-ups never retouch a live missile.
pub fn spawn_missile(width: f64, height: f64, stage: u32, rng: &mut impl Rng) -> Missile {
    let base_speed = 0.5 + 0.5 * (stage.saturating_sub(1)) as f64;
    // Jitter in [-0.2, 0.2)
    let speed = base_speed + (rng.gen::<f64>() - 0.5) * 0.4;

    let (x, y) = match rng.gen_range(0..4u8) {
        0 => (rng.gen::<f64>() * width, -MISSILE_SIZE), // top
        1 => (width + MISSILE_SIZE, rng.gen::<f64>() * height), // right
        2 => (rng.gen::<f64>() * width, height + MISSILE_SIZE), // bottom
        _ => (-MISSILE_SIZE, rng.gen::<f64>() * height), // left
    };

    let angle = (height / 2.0 - y).atan2(width / 2.0 - x);
    Missile {
        x,
        y,
        size: MISSILE_SIZE,
        speed,
        dx: angle.cos() * speed,
        dy: angle.sin() * speed,
    }
}

/// Spawn an item at a uniform-random position inset 2×size from every edge.
pub fn spawn_item(width: f64, height: f64, rng: &mut impl Rng) -> Item {
    Item {
        x: rng.gen::<f64>() * (width - ITEM_SIZE * 4.0) + ITEM_SIZE * 2.0,
        y: rng.gen::<f64>() * (height - ITEM_SIZE * 4.0) + ITEM_SIZE * 2.0,
        size: ITEM_SIZE,
        effect: ItemEffect::SpeedBoost,
        duration: ITEM_BOOST_MS,
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Handle the start/restart command (Enter).
///
/// NotStarted → Playing and GameOver → Playing both produce a fresh
/// session: centered plane, empty collections, score 0, stage 1, and
/// every timer rebased to `now`.  Ignored while already Playing.
pub fn press_start(state: &GameState, now: f64) -> GameState {
    match state.phase {
        GamePhase::Playing => state.clone(),
        GamePhase::NotStarted | GamePhase::GameOver => GameState {
            phase: GamePhase::Playing,
            plane: Some(new_plane(state.width, state.height)),
            missiles: Vec::new(),
            items: Vec::new(),
            score: 0,
            stage: 1,
            stage_banner: false,
            stage_banner_since: 0.0,
            timers: Timers {
                last_score_tick: now,
                last_stage_tick: now,
                last_missile_spawn: now,
                last_item_spawn: now,
            },
            width: state.width,
            height: state.height,
        },
    }
}

/// Move the plane by raw unit deltas (−1/0/1 per axis).
///
/// The deltas are deliberately NOT scaled by the plane's tracked
/// `speed`; a speed boost changes the bookkeeping and HUD, not the
/// step size.  Held keys combine, so up+left moves (−1,−1) per frame.
/// Also advances the engine-flame animation phase.
pub fn move_plane(state: &GameState, dx: f64, dy: f64) -> GameState {
    if state.phase != GamePhase::Playing {
        return state.clone();
    }
    let Some(plane) = &state.plane else {
        return state.clone();
    };
    let plane = Plane {
        x: plane.x + dx,
        y: plane.y + dy,
        flame_anim: (plane.flame_anim + 0.1) % 1.0,
        ..plane.clone()
    };
    GameState {
        plane: Some(plane),
        ..state.clone()
    }
}

// ── Plane helpers ────────────────────────────────────────────────────────────

/// Grant (or re-trigger) the speed boost.  Re-collecting while already
/// boosted resets the expiry window; the multiplier never stacks.
pub fn apply_speed_boost(plane: &Plane, duration: f64, now: f64) -> Plane {
    Plane {
        speed: plane.base_speed * BOOST_FACTOR,
        boosted: true,
        boost_ends_at: now + duration,
        ..plane.clone()
    }
}

/// Expire a lapsed boost.  No-op when unboosted or still inside the
/// window, so calling it every frame is safe.
pub fn expire_boost(plane: &Plane, now: f64) -> Plane {
    if plane.boosted && now > plane.boost_ends_at {
        Plane {
            speed: plane.base_speed,
            boosted: false,
            ..plane.clone()
        }
    } else {
        plane.clone()
    }
}

/// Circle-circle test between the plane and a point of the given size.
///
/// The argument point is shifted by `size/2` on both axes before the
/// distance check.  Missile callers pass the disc *center*, so the
/// shift lands the test slightly off — kept to match the original
/// game's feel exactly.
pub fn plane_hit_by(plane: &Plane, x: f64, y: f64, size: f64) -> bool {
    let pcx = plane.x + plane.size / 2.0;
    let pcy = plane.y + plane.size / 2.0;
    let mcx = x + size / 2.0;
    let mcy = y + size / 2.0;
    let distance = ((pcx - mcx).powi(2) + (pcy - mcy).powi(2)).sqrt();
    distance < plane.size / 2.0 + size / 2.0
}

// ── Missile helpers ──────────────────────────────────────────────────────────

/// Advance a missile along its fixed velocity.
pub fn advance_missile(missile: &Missile) -> Missile {
    Missile {
        x: missile.x + missile.dx,
        y: missile.y + missile.dy,
        ..missile.clone()
    }
}

/// True once the missile sits more than 2×its radius beyond any edge.
pub fn missile_out_of_bounds(missile: &Missile, width: f64, height: f64) -> bool {
    missile.x < -missile.size * 2.0
        || missile.x > width + missile.size * 2.0
        || missile.y < -missile.size * 2.0
        || missile.y > height + missile.size * 2.0
}

// ── Item helpers ─────────────────────────────────────────────────────────────

/// Circle-circle test between the item center and the plane.
///
/// Measures to the plane's top-left anchor rather than its drawn
/// center — the original's caller-site math, kept as-is.
pub fn item_touches_plane(item: &Item, plane: &Plane) -> bool {
    let distance = ((item.x - plane.x).powi(2) + (item.y - plane.y).powi(2)).sqrt();
    distance < item.size + plane.size / 2.0
}

/// Resolve item pickups for one frame.
///
/// Returns the surviving (uncollected) items and the plane with any
/// granted boosts applied.  Collection is the sole removal path for
/// items, and each item is collected at most once.
pub fn filter_item_collisions(
    items: &[Item],
    plane: &Plane,
    now: f64,
) -> (Vec<Item>, Plane) {
    let mut plane = plane.clone();
    let mut survivors = Vec::with_capacity(items.len());
    for item in items {
        if item_touches_plane(item, &plane) {
            match item.effect {
                ItemEffect::SpeedBoost => {
                    plane = apply_speed_boost(&plane, item.duration, now);
                }
            }
        } else {
            survivors.push(item.clone());
        }
    }
    (survivors, plane)
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the simulation to frame timestamp `now` (ms).
///
/// No-op unless Playing with a live plane — a missing plane makes the
/// frame skip rather than panic.  Score and stage accrue with a
/// catch-up loop so a slow frame never loses ticks; missile and item
/// spawns stay at most one per frame.
pub fn tick(state: &GameState, now: f64, rng: &mut impl Rng) -> GameState {
    if state.phase != GamePhase::Playing {
        return state.clone();
    }
    let Some(plane) = &state.plane else {
        return state.clone();
    };

    let mut next = state.clone();

    // ── 1. Score: +1 per full 100 ms elapsed ─────────────────────────────────
    while now - next.timers.last_score_tick >= SCORE_TICK_MS {
        next.score += 1;
        next.timers.last_score_tick += SCORE_TICK_MS;
    }

    // ── 2. Stage: +1 per full 10 s elapsed, with banner ──────────────────────
    while now - next.timers.last_stage_tick >= STAGE_TICK_MS {
        next.stage += 1;
        next.timers.last_stage_tick += STAGE_TICK_MS;
        next.stage_banner = true;
        next.stage_banner_since = now;
    }
    if next.stage_banner && now - next.stage_banner_since >= STAGE_BANNER_MS {
        next.stage_banner = false;
    }

    // ── 3. Plane upkeep: boost expiry ────────────────────────────────────────
    let mut plane = expire_boost(plane, now);

    // ── 4. Spawn a missile on its cadence ────────────────────────────────────
    if now - next.timers.last_missile_spawn >= MISSILE_SPAWN_MS {
        next.missiles
            .push(spawn_missile(next.width, next.height, next.stage, rng));
        next.timers.last_missile_spawn = now;
    }

    // ── 5. Advance missiles, drop leavers, check for the fatal hit ───────────
    let mut hit = false;
    let missiles: Vec<Missile> = next
        .missiles
        .iter()
        .map(advance_missile)
        .filter(|m| {
            if missile_out_of_bounds(m, next.width, next.height) {
                return false;
            }
            if plane_hit_by(&plane, m.x, m.y, m.size) {
                hit = true;
            }
            true
        })
        .collect();
    next.missiles = missiles;

    // ── 6. Item pickups ──────────────────────────────────────────────────────
    let (items, boosted_plane) = filter_item_collisions(&next.items, &plane, now);
    next.items = items;
    plane = boosted_plane;

    // ── 7. Spawn an item on its cadence, capped at 3 live ────────────────────
    if now - next.timers.last_item_spawn >= ITEM_SPAWN_MS {
        if next.items.len() < MAX_LIVE_ITEMS {
            next.items.push(spawn_item(next.width, next.height, rng));
        }
        // Timer advances even when the cap blocked the spawn.
        next.timers.last_item_spawn = now;
    }

    // ── 8. State transition ──────────────────────────────────────────────────
    if hit {
        next.phase = GamePhase::GameOver;
    }
    next.plane = Some(plane);
    next
}
