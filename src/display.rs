/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only projects
/// the 800×600 logical canvas onto the terminal cell grid and turns
/// state into terminal commands.  Canvas alpha fades become RGB
/// channel scaling.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use dodge::compute::{GAME_OVER_FADE_MS, STAGE_BANNER_MS};
use dodge::entities::{GamePhase, GameState, Item, Missile, Plane};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::White;
const C_BOOST_TAG: Color = Color::Cyan;
const C_PLANE: Color = Color::White;
const C_MISSILE: Color = Color::Yellow;
const C_ITEM: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;
const C_TITLE: Color = Color::Cyan;

/// Scale an RGB colour by an opacity in [0, 1] — the terminal stand-in
/// for drawing onto black with alpha.
fn faded(r: u8, g: u8, b: u8, opacity: f64) -> Color {
    let o = opacity.clamp(0.0, 1.0);
    Color::Rgb {
        r: (f64::from(r) * o) as u8,
        g: (f64::from(g) * o) as u8,
        b: (f64::from(b) * o) as u8,
    }
}

/// The scene needs at least this much room for the border, HUD, and
/// hint rows; anything smaller skips the frame entirely.
const MIN_COLS: u16 = 20;
const MIN_ROWS: u16 = 8;

/// Project a logical canvas point into the bordered play area.
/// Saturating throughout — a degenerate cell grid pins everything to
/// the top-left of the play area instead of panicking.
fn project(state: &GameState, cols: u16, rows: u16, x: f64, y: f64) -> (u16, u16) {
    let max_col = cols.saturating_sub(2).max(1);
    let max_row = rows.saturating_sub(3).max(2);
    let play_w = f64::from(cols.saturating_sub(2).max(1));
    let play_h = f64::from(rows.saturating_sub(4).max(1));
    let col = 1.0 + (x / state.width) * (play_w - 1.0);
    let row = 2.0 + (y / state.height) * (play_h - 1.0);
    ((col as u16).min(max_col).max(1), (row as u16).min(max_row).max(2))
}

fn on_canvas(state: &GameState, x: f64, y: f64) -> bool {
    x >= 0.0 && x <= state.width && y >= 0.0 && y <= state.height
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame at timestamp `now` (ms).
pub fn render<W: Write>(out: &mut W, state: &GameState, now: f64) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (cols, rows) = terminal::size()?;

    // A terminal resized below the minimum cannot hold the scene;
    // skip the frame rather than crash the loop.
    if cols < MIN_COLS || rows < MIN_ROWS {
        out.flush()?;
        return Ok(());
    }

    match state.phase {
        GamePhase::NotStarted => draw_title(out, cols, rows)?,
        GamePhase::Playing => {
            // A missing plane means this frame has nothing to show; skip
            // it rather than crash the loop.
            if let Some(plane) = &state.plane {
                draw_scene(out, state, plane, now, cols, rows)?;
            }
        }
        GamePhase::GameOver => draw_game_over(out, state, now, cols, rows)?,
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Title screen ──────────────────────────────────────────────────────────────

fn draw_title<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let cx = cols / 2;
    let cy = rows / 2;

    let title = "D  O  D  G  E";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(3),
    ))?;
    out.queue(style::SetForegroundColor(C_TITLE))?;
    out.queue(Print(title))?;

    let prompt = "Press Enter to Start";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(prompt.chars().count() as u16 / 2),
        cy + 2,
    ))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(prompt))?;

    draw_controls_hint(out, rows)
}

// ── Playing scene ─────────────────────────────────────────────────────────────

fn draw_scene<W: Write>(
    out: &mut W,
    state: &GameState,
    plane: &Plane,
    now: f64,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    draw_border(out, cols, rows)?;
    draw_hud(out, state, plane, now, cols)?;

    // Items under the plane, missiles over the items
    for item in &state.items {
        draw_item(out, state, item, cols, rows)?;
    }
    for missile in &state.missiles {
        draw_missile(out, state, missile, cols, rows)?;
    }
    draw_plane(out, state, plane, cols, rows)?;

    if state.stage_banner {
        draw_stage_banner(out, state, now, cols, rows)?;
    }
    draw_controls_hint(out, rows)
}

fn draw_border<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let w = cols as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, rows.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    plane: &Plane,
    now: f64,
    cols: u16,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!("Score:{:>6}", state.score)))?;

    let stage_str = format!("Stage:{:>3}", state.stage);
    let sx = (cols / 2).saturating_sub(stage_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(sx, 0))?;
    out.queue(Print(&stage_str))?;

    // Active boost indicator with remaining seconds — right-aligned
    if plane.boosted {
        let secs_left = ((plane.boost_ends_at - now) / 1_000.0).ceil().max(0.0);
        let tag = format!("[» BOOST {:>2}s]", secs_left as u32);
        let rx = cols.saturating_sub(tag.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(rx, 0))?;
        out.queue(style::SetForegroundColor(C_BOOST_TAG))?;
        out.queue(Print(&tag))?;
    }

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_plane<W: Write>(
    out: &mut W,
    state: &GameState,
    plane: &Plane,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    // 3-row sprite (tip, fuselage, engine flame):
    //   ▲
    //  /█\
    //   ▒      ← flame glyph cycles with the animation phase
    let cx = plane.x + plane.size / 2.0;
    let cy = plane.y + plane.size / 2.0;
    let (col, row) = project(state, cols, rows, cx, cy);

    out.queue(style::SetForegroundColor(C_PLANE))?;
    out.queue(cursor::MoveTo(col, row.saturating_sub(1).max(2)))?;
    out.queue(Print("▲"))?;
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(Print("/█\\"))?;

    let flame = if plane.flame_anim < 0.33 {
        "░"
    } else if plane.flame_anim < 0.66 {
        "▒"
    } else {
        "▓"
    };
    let flame_color = if plane.boosted { C_BOOST_TAG } else { Color::Red };
    let flame_row = (row + 1).min(rows.saturating_sub(3));
    out.queue(cursor::MoveTo(col, flame_row))?;
    out.queue(style::SetForegroundColor(flame_color))?;
    out.queue(Print(flame))?;

    Ok(())
}

fn draw_missile<W: Write>(
    out: &mut W,
    state: &GameState,
    missile: &Missile,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    // Freshly spawned missiles sit just outside the canvas; wait for
    // them to enter before drawing.
    if !on_canvas(state, missile.x, missile.y) {
        return Ok(());
    }
    let (col, row) = project(state, cols, rows, missile.x, missile.y);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_MISSILE))?;
    out.queue(Print("●"))?;
    Ok(())
}

fn draw_item<W: Write>(
    out: &mut W,
    state: &GameState,
    item: &Item,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let (col, row) = project(state, cols, rows, item.x, item.y);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_ITEM))?;
    out.queue(Print("▲"))?;
    Ok(())
}

// ── Stage-up banner ───────────────────────────────────────────────────────────

fn draw_stage_banner<W: Write>(
    out: &mut W,
    state: &GameState,
    now: f64,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let elapsed = now - state.stage_banner_since;
    let opacity = 1.0 - elapsed / STAGE_BANNER_MS;

    let banner = "S T A G E   U P";
    let col = (cols / 2).saturating_sub(banner.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, rows.saturating_sub(4)))?;
    out.queue(style::SetForegroundColor(faded(255, 255, 0, opacity)))?;
    out.queue(Print(banner))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("↑ ↓ ← → / W A S D : Move   ENTER : Start   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    now: f64,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    // Fade-in driven by the last score tick — the score timer froze
    // when play stopped, so this ramps up over the first second of the
    // overlay.
    let opacity = ((now - state.timers.last_score_tick) / GAME_OVER_FADE_MS).min(1.0);

    let cx = cols / 2;
    let cy = rows / 2;

    let score_line = format!("your score is {}", state.score);
    let col = cx.saturating_sub(score_line.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(faded(255, 255, 255, opacity)))?;
    out.queue(Print(&score_line))?;

    let over = "G A M E   O V E R";
    let col = cx.saturating_sub(over.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, cy.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(faded(255, 0, 0, opacity)))?;
    out.queue(Print(over))?;

    let hint = "Press Enter key to restart";
    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, cy + 1))?;
    out.queue(style::SetForegroundColor(faded(255, 255, 255, opacity)))?;
    out.queue(Print(hint))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dodge::compute::{init_state, CANVAS_HEIGHT, CANVAS_WIDTH};

    #[test]
    fn project_maps_canvas_center_into_play_area() {
        let state = init_state(CANVAS_WIDTH, CANVAS_HEIGHT);
        let (col, row) = project(&state, 80, 24, CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
        assert!((1..=78).contains(&col));
        assert!((2..=21).contains(&row));
    }

    #[test]
    fn project_survives_degenerate_cell_grids() {
        // Mid-game resizes can hand us absurd sizes; pin, don't panic.
        let state = init_state(CANVAS_WIDTH, CANVAS_HEIGHT);
        for (cols, rows) in [(2, 10), (80, 4), (0, 0), (1, 1)] {
            let (col, row) = project(&state, cols, rows, 400.0, 300.0);
            assert!(col >= 1);
            assert!(row >= 2);
        }
    }

    #[test]
    fn faded_scales_channels_and_clamps_opacity() {
        assert_eq!(faded(200, 100, 0, 0.5), Color::Rgb { r: 100, g: 50, b: 0 });
        assert_eq!(faded(255, 255, 255, 2.0), Color::Rgb { r: 255, g: 255, b: 255 });
        assert_eq!(faded(255, 0, 0, -1.0), Color::Rgb { r: 0, g: 0, b: 0 });
    }
}
