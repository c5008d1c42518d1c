//! GameView: maps a [`GameSnapshot`] plus host info into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Board background (`#1a1a2e`).
const BOARD_BG: Rgb = Rgb::new(0x1a, 0x1a, 0x2e);

/// Piece colors indexed by `color_index - 1`.
pub const PALETTE: [Rgb; 7] = [
    Rgb::new(0x00, 0xf0, 0xf0),
    Rgb::new(0xf0, 0xf0, 0x00),
    Rgb::new(0xa0, 0x00, 0xf0),
    Rgb::new(0xf0, 0xa0, 0x00),
    Rgb::new(0x00, 0x00, 0xf0),
    Rgb::new(0x00, 0xf0, 0x00),
    Rgb::new(0xf0, 0x00, 0x00),
];

pub fn piece_color(kind: PieceKind) -> Rgb {
    PALETTE[(kind.color_index() - 1) as usize]
}

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub client_count: u16,
    pub has_controller: bool,
}

/// Host-side numbers shown next to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudInfo {
    pub best_score: u32,
    pub coins: u32,
    /// Coins paid for the game that just ended.
    pub last_reward: Option<u32>,
    /// `None` when remote control is disabled.
    pub adapter: Option<AdapterStatusView>,
}

/// A lightweight terminal renderer for the block-drop board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        hud: &HudInfo,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let board_px_w = (BOARD_WIDTH as u16) * self.cell_w;
        let board_px_h = (BOARD_HEIGHT as u16) * self.cell_h;
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;

        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        let bg = CellStyle::new(Rgb::new(80, 80, 90), BOARD_BG);
        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        fb.fill_rect(start_x + 1, start_y + 1, board_px_w, board_px_h, ' ', bg);
        self.draw_border(fb, start_x, start_y, frame_w, frame_h, border);

        for (y, row) in snap.board.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                match PieceKind::from_color_index(cell) {
                    Some(kind) => self.draw_board_cell(fb, start_x, start_y, x as i8, y as i8, kind),
                    None => {
                        let dot = CellStyle::new(Rgb::new(90, 90, 100), BOARD_BG).dim();
                        self.fill_cell_rect(fb, start_x, start_y, x as i8, y as i8, '·', dot);
                    }
                }
            }
        }

        if let Some(active) = snap.active {
            if let Some(ghost_row) = snap.ghost_row.filter(|&r| r != active.row) {
                let ghost = CellStyle::new(piece_color(active.kind), BOARD_BG).dim();
                for (dx, dy) in active.shape.cells() {
                    self.fill_cell_rect(
                        fb,
                        start_x,
                        start_y,
                        active.col + dx,
                        ghost_row + dy,
                        '░',
                        ghost,
                    );
                }
            }
            for (x, y) in active.cells() {
                self.draw_board_cell(fb, start_x, start_y, x, y, active.kind);
            }
        }

        self.draw_side_panel(fb, snap, hud, viewport, start_x, start_y, frame_w);

        if snap.game_over {
            self.draw_game_over(fb, snap, hud, start_x, start_y, frame_w, frame_h);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, hud: &HudInfo, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, hud, viewport, &mut fb);
        fb
    }

    /// Terminal position of board cell (col, row), if it is on the board.
    pub fn cell_origin(&self, viewport: Viewport, col: i8, row: i8) -> Option<(u16, u16)> {
        if col < 0 || row < 0 || col >= BOARD_WIDTH as i8 || row >= BOARD_HEIGHT as i8 {
            return None;
        }
        let frame_w = (BOARD_WIDTH as u16) * self.cell_w + 2;
        let frame_h = (BOARD_HEIGHT as u16) * self.cell_h + 2;
        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;
        Some((
            start_x + 1 + col as u16 * self.cell_w,
            start_y + 1 + row as u16 * self.cell_h,
        ))
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_board_cell(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        x: i8,
        y: i8,
        kind: PieceKind,
    ) {
        let style = CellStyle::new(piece_color(kind), BOARD_BG).bold();
        self.fill_cell_rect(fb, start_x, start_y, x, y, '█', style);
    }

    /// Cells above the board (open sky) are skipped.
    fn fill_cell_rect(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        cell_x: i8,
        cell_y: i8,
        ch: char,
        style: CellStyle,
    ) {
        if cell_x < 0 || cell_y < 0 || cell_x >= BOARD_WIDTH as i8 || cell_y >= BOARD_HEIGHT as i8 {
            return;
        }
        let px = start_x + 1 + cell_x as u16 * self.cell_w;
        let py = start_y + 1 + cell_y as u16 * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        hud: &HudInfo,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let rows: [(&str, u32); 5] = [
            ("SCORE", snap.score),
            ("LINES", snap.lines),
            ("SPEED", snap.drop_interval_ms),
            ("BEST", hud.best_score),
            ("COINS", hud.coins),
        ];

        let mut y = start_y;
        for (name, n) in rows {
            fb.put_str(panel_x, y, name, label);
            y = y.saturating_add(1);
            let w = fb.put_u32(panel_x, y, n, value);
            if name == "SPEED" {
                fb.put_str(panel_x + w, y, "ms", value.dim());
            }
            y = y.saturating_add(2);
        }

        fb.put_str(panel_x, y, "AI", label);
        y = y.saturating_add(1);
        match hud.adapter {
            Some(st) => {
                fb.put_str(panel_x, y, if st.has_controller { "CTRL" } else { "ON" }, value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "C", value);
                fb.put_u32(panel_x + 2, y, st.client_count as u32, value);
            }
            None => fb.put_str(panel_x, y, "OFF", value),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_game_over(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        hud: &HudInfo,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
    ) {
        let shade = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0));
        let mid_y = start_y.saturating_add(frame_h / 2);
        fb.fill_rect(start_x + 1, mid_y.saturating_sub(2), frame_w - 2, 5, ' ', shade);

        let center = |text_w: u16| start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);

        let title = "GAME OVER";
        fb.put_str(center(title.len() as u16), mid_y - 1, title, shade.bold());

        let score_w = 7 + digit_count(snap.score);
        let x = center(score_w);
        fb.put_str(x, mid_y, "Score: ", shade);
        fb.put_u32(x + 7, mid_y, snap.score, shade);

        if let Some(reward) = hud.last_reward {
            let reward_w = 1 + digit_count(reward) + 6;
            let x = center(reward_w);
            fb.put_char(x, mid_y + 1, '+', shade);
            let w = fb.put_u32(x + 1, mid_y + 1, reward, shade);
            fb.put_str(x + 1 + w, mid_y + 1, " coins", shade);
        }
    }
}

fn digit_count(mut n: u32) -> u16 {
    let mut d = 1;
    while n >= 10 {
        n /= 10;
        d += 1;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_matches_color_index_order() {
        assert_eq!(piece_color(PieceKind::I), Rgb::new(0x00, 0xf0, 0xf0));
        assert_eq!(piece_color(PieceKind::Z), Rgb::new(0xf0, 0x00, 0x00));
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(u32::MAX), 10);
    }

    #[test]
    fn test_cell_origin_bounds() {
        let view = GameView::default();
        let vp = Viewport::new(80, 24);
        assert_eq!(view.cell_origin(vp, -1, 0), None);
        assert_eq!(view.cell_origin(vp, 0, 20), None);
        // frame is 22x22, start (29, 1)
        assert_eq!(view.cell_origin(vp, 0, 0), Some((30, 2)));
        assert_eq!(view.cell_origin(vp, 9, 19), Some((48, 21)));
    }
}
