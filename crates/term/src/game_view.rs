//! GameView: maps a `core::GameSnapshot` plus HUD state into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use std::time::Duration;

use crate::core::{Board, GameSnapshot};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::tile_value;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// What is drawn on top of (or instead of) the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel<'a> {
    Board,
    SizeMenu,
    Slots { title: &'a str, lines: &'a [String] },
    Prompt { label: &'a str, text: &'a str },
}

/// Everything one frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState<'a> {
    /// None before a board size has been picked
    pub snapshot: Option<&'a GameSnapshot>,
    pub undo_count: usize,
    pub redo_count: usize,
    pub play_time: Duration,
    pub status: &'a str,
    pub panel: Panel<'a>,
}

impl<'a> ViewState<'a> {
    pub fn new(snapshot: Option<&'a GameSnapshot>) -> Self {
        Self {
            snapshot,
            undo_count: 0,
            redo_count: 0,
            play_time: Duration::ZERO,
            status: "",
            panel: Panel::Board,
        }
    }
}

const HELP: &str = "arrows/hjkl slide  u undo  y redo  r restart  s save  g load  F5/F9 quick  q quit";

const BOARD_BG: Rgb = Rgb::new(187, 173, 160);
const EMPTY_BG: Rgb = Rgb::new(205, 193, 180);
const DARK_TEXT: Rgb = Rgb::new(119, 110, 101);
const LIGHT_TEXT: Rgb = Rgb::new(249, 246, 242);

/// A lightweight terminal renderer for the 2048 board.
pub struct GameView {
    /// Tile pitch in terminal columns (tile width plus one gap column).
    cell_w: u16,
    /// Tile pitch in terminal rows (tile height plus one gap row).
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 8x4 leaves a 7x3 tile, wide enough for 131072.
        Self {
            cell_w: 8,
            cell_h: 4,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(2),
            cell_h: cell_h.max(2),
        }
    }

    /// Render one frame into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(&self, view: &ViewState<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        if let Some(snap) = view.snapshot {
            self.draw_game(fb, snap, view, viewport);
        }

        match view.panel {
            Panel::Board => {}
            Panel::SizeMenu => self.draw_size_menu(fb, viewport),
            Panel::Slots { title, lines } => {
                let body: Vec<&str> = lines.iter().map(String::as_str).collect();
                self.draw_dialog(fb, viewport, title, &body);
            }
            Panel::Prompt { label, text } => {
                let line = format!("> {text}_");
                self.draw_dialog(fb, viewport, label, &[line.as_str(), "Enter saves, Esc cancels"]);
            }
        }

        let text = CellStyle::default();
        if viewport.height >= 2 {
            fb.put_str(0, viewport.height - 2, view.status, text.bold());
        }
        if viewport.height >= 1 {
            fb.put_str(0, viewport.height - 1, HELP, text.dim());
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, view: &ViewState<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(view, viewport, &mut fb);
        fb
    }

    fn draw_game(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, view: &ViewState<'_>, viewport: Viewport) {
        let size = u16::from(snap.board.size());
        let inner_w = size * self.cell_w + 1;
        let inner_h = size * self.cell_h + 1;
        let frame_w = inner_w + 2;
        let frame_h = inner_h + 2;

        // Leave the two bottom rows for status and help.
        let usable_h = viewport.height.saturating_sub(2);
        let start_x = viewport.width.saturating_sub(frame_w + 16) / 2;
        let start_y = usable_h.saturating_sub(frame_h) / 2;

        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.fill_rect(start_x + 1, start_y + 1, inner_w, inner_h, ' ', CellStyle::new(BOARD_BG, BOARD_BG));
        fb.draw_box(start_x, start_y, frame_w, frame_h, border);

        self.draw_tiles(fb, &snap.board, start_x + 2, start_y + 2);
        self.draw_side_panel(fb, snap, view, viewport, start_x + frame_w + 2, start_y);

        if snap.stats.game_over {
            let style = CellStyle::new(LIGHT_TEXT, Rgb::new(0, 0, 0)).bold();
            let mid_y = start_y + frame_h / 2;
            fb.put_str_centered(start_x, mid_y.saturating_sub(1), frame_w, " GAME OVER ", style);
            fb.put_str_centered(start_x, mid_y, frame_w, " r to restart ", style);
        }
    }

    fn draw_tiles(&self, fb: &mut FrameBuffer, board: &Board, origin_x: u16, origin_y: u16) {
        let tile_w = self.cell_w - 1;
        let tile_h = self.cell_h - 1;
        for (y, row) in board.rows().enumerate() {
            for (x, &exponent) in row.iter().enumerate() {
                let px = origin_x + x as u16 * self.cell_w;
                let py = origin_y + y as u16 * self.cell_h;
                let style = tile_style(exponent);
                fb.fill_rect(px, py, tile_w, tile_h, ' ', style);
                if exponent > 0 {
                    let value = tile_value(exponent);
                    let pad = tile_w.saturating_sub(digit_count(value)) / 2;
                    fb.put_u32(px + pad, py + tile_h / 2, value, style.bold());
                }
            }
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        view: &ViewState<'_>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let stats = &snap.stats;
        let mut y = start_y;
        for (name, n) in [
            ("SCORE", stats.score),
            ("BEST", stats.max_score),
            ("LAST", stats.points),
        ] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x, y + 1, n, value);
            y += 3;
        }

        fb.put_str(panel_x, y, "UNDO", label);
        fb.put_u32(panel_x + 5, y, clamp_u32(view.undo_count), value);
        y += 1;
        fb.put_str(panel_x, y, "REDO", label);
        fb.put_u32(panel_x + 5, y, clamp_u32(view.redo_count), value);
        y += 2;

        fb.put_str(panel_x, y, "TIME", label);
        put_clock(fb, panel_x, y + 1, view.play_time, value);
        y += 3;

        fb.put_str(panel_x, y, "AUTO-SAVE", label);
        fb.put_str(panel_x, y + 1, if stats.auto_save { "ON" } else { "OFF" }, value);
    }

    fn draw_size_menu(&self, fb: &mut FrameBuffer, viewport: Viewport) {
        self.draw_dialog(
            fb,
            viewport,
            "2048",
            &["Choose a board size", "", "3    4    5", "", "q quits"],
        );
    }

    fn draw_dialog(&self, fb: &mut FrameBuffer, viewport: Viewport, title: &str, body: &[&str]) {
        let content_w = body
            .iter()
            .chain(std::iter::once(&title))
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0)
            .min(u16::MAX as usize - 4) as u16;
        let w = (content_w + 4).min(viewport.width);
        let h = (body.len().min(u16::MAX as usize - 4) as u16 + 4).min(viewport.height);
        let x = viewport.width.saturating_sub(w) / 2;
        let y = viewport.height.saturating_sub(h) / 2;

        let style = CellStyle::new(Rgb::new(230, 230, 230), Rgb::new(20, 20, 30));
        fb.fill_rect(x, y, w, h, ' ', style);
        fb.draw_box(x, y, w, h, style);
        fb.put_str_centered(x, y + 1, w, title, style.bold());
        for (i, line) in body.iter().enumerate() {
            let row = y + 2 + i as u16;
            if row + 1 >= y + h {
                break;
            }
            fb.put_str(x + 2, row, line, style);
        }
    }
}

fn tile_style(exponent: u8) -> CellStyle {
    let (bg, fg) = match exponent {
        0 => (EMPTY_BG, DARK_TEXT),
        1 => (Rgb::new(238, 228, 218), DARK_TEXT),
        2 => (Rgb::new(237, 224, 200), DARK_TEXT),
        3 => (Rgb::new(242, 177, 121), LIGHT_TEXT),
        4 => (Rgb::new(245, 149, 99), LIGHT_TEXT),
        5 => (Rgb::new(246, 124, 95), LIGHT_TEXT),
        6 => (Rgb::new(246, 94, 59), LIGHT_TEXT),
        7 => (Rgb::new(237, 207, 114), LIGHT_TEXT),
        8 => (Rgb::new(237, 204, 97), LIGHT_TEXT),
        9 => (Rgb::new(237, 200, 80), LIGHT_TEXT),
        10 => (Rgb::new(237, 197, 63), LIGHT_TEXT),
        11 => (Rgb::new(237, 194, 46), LIGHT_TEXT),
        _ => (Rgb::new(60, 58, 50), LIGHT_TEXT),
    };
    CellStyle::new(fg, bg)
}

fn digit_count(mut n: u32) -> u16 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

fn clamp_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// `m:ss`
fn put_clock(fb: &mut FrameBuffer, x: u16, y: u16, elapsed: Duration, style: CellStyle) {
    let secs = elapsed.as_secs();
    let minutes = u32::try_from(secs / 60).unwrap_or(u32::MAX);
    let seconds = (secs % 60) as u8;
    let cx = fb.put_u32(x, y, minutes, style);
    fb.put_char(cx, y, ':', style);
    fb.put_char(cx + 1, y, char::from(b'0' + seconds / 10), style);
    fb.put_char(cx + 2, y, char::from(b'0' + seconds % 10), style);
}
