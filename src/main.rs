mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal,
    ExecutableCommand,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use dodge::compute::{init_state, move_plane, press_start, tick, CANVAS_HEIGHT, CANVAS_WIDTH};
use dodge::entities::GamePhase;

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Any of the given keys held — directions answer to both WASD and arrows.
fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Extract the `--seed <u64>` value from argv.  A missing or
/// unparseable value is reported, not silently swallowed — the flag
/// exists for reproducibility, so a typo falling back to entropy
/// deserves a signal.
fn seed_from_args(mut args: impl Iterator<Item = String>) -> Option<u64> {
    while let Some(arg) = args.next() {
        if arg == "--seed" {
            return match args.next() {
                Some(value) => match value.parse::<u64>() {
                    Ok(seed) => Some(seed),
                    Err(_) => {
                        warn!("ignoring --seed {:?}: not a u64, seeding from entropy", value);
                        None
                    }
                },
                None => {
                    warn!("--seed given without a value, seeding from entropy");
                    None
                }
            };
        }
    }
    None
}

/// Build the session RNG.  `--seed <u64>` makes every spawn position
/// and speed reproducible; otherwise seed from entropy.
fn rng_from_args() -> StdRng {
    match seed_from_args(std::env::args().skip(1)) {
        Some(seed) => {
            info!("seeded rng with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and apply all their effects simultaneously,
/// so up+left moves diagonally by a full unit step on each axis.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence, which is shorter than the OS repeat interval, so the key stays
///   live while it is actively generating repeats.
fn game_loop<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let mut rng = rng_from_args();
    let mut state = init_state(CANVAS_WIDTH, CANVAS_HEIGHT);

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let epoch = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;
        // Monotonic frame timestamp in ms, matching what the simulation
        // timers expect.
        let now = epoch.elapsed().as_secs_f64() * 1_000.0;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                // Press: record key + handle one-shot actions
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            info!("quit at score {}", state.score);
                            return Ok(());
                        }
                        KeyCode::Char('c')
                            if modifiers.contains(KeyModifiers::CONTROL) =>
                        {
                            return Ok(());
                        }
                        KeyCode::Enter => {
                            let was = state.phase.clone();
                            state = press_start(&state, now);
                            if was != state.phase {
                                info!("session started ({:?} → Playing)", was);
                            }
                        }
                        _ => {}
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Apply held direction keys every frame ─────────────────────────────
        if state.phase == GamePhase::Playing {
            let up = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
            let down = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
            let left = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
            let right = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];

            // One unit step per held axis per frame; axes combine with no
            // normalization, so diagonals run faster in magnitude.
            if any_held(&key_frame, &up, frame) {
                state = move_plane(&state, 0.0, -1.0);
            }
            if any_held(&key_frame, &down, frame) {
                state = move_plane(&state, 0.0, 1.0);
            }
            if any_held(&key_frame, &left, frame) {
                state = move_plane(&state, -1.0, 0.0);
            }
            if any_held(&key_frame, &right, frame) {
                state = move_plane(&state, 1.0, 0.0);
            }

            let stage_before = state.stage;
            state = tick(&state, now, &mut rng);
            if state.stage > stage_before {
                debug!("stage up to {}", state.stage);
            }
            if state.phase == GamePhase::GameOver {
                info!("game over at score {} stage {}", state.score, state.stage);
            }
        }

        display::render(out, &state, now)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    env_logger::init();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back
    // gracefully onto the HOLD_WINDOW expiry.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.  The
    // thread exits when the receiver is dropped, so the frame-loop chain
    // cannot outlive the program.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

#[cfg(test)]
mod tests {
    use super::seed_from_args;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| (*s).to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn seed_flag_parses_a_u64() {
        assert_eq!(seed_from_args(args(&["--seed", "42"])), Some(42));
        assert_eq!(seed_from_args(args(&["-v", "--seed", "7"])), Some(7));
    }

    #[test]
    fn malformed_or_missing_seed_falls_back_to_entropy() {
        assert_eq!(seed_from_args(args(&["--seed", "abc"])), None);
        assert_eq!(seed_from_args(args(&["--seed", "-1"])), None);
        assert_eq!(seed_from_args(args(&["--seed"])), None);
        assert_eq!(seed_from_args(args(&[])), None);
    }
}
