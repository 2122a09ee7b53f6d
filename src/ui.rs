//! Layout and drawing: board, pieces, sidebar, pause overlay.

use crate::theme::Theme;
use cascadetui::{Phase, Piece, PieceState, Point, Puzzle};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Terminal columns per board cell.
const CELL_W: u16 = 4;
/// Terminal rows per board cell.
const CELL_H: u16 = 2;
/// Empty cell rows drawn above the board so spawning pieces and flicks are visible.
const HEADROOM: u16 = 1;
const SIDEBAR_WIDTH: u16 = 24;

/// Where the board landed on screen; maps terminal cells to world points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    /// Inside of the board border.
    pub field: Rect,
    /// Board rows plus headroom.
    pub rows: u16,
    pub pitch: f32,
}

impl BoardGeometry {
    pub fn new(field: Rect, board_height: usize, pitch: f32) -> Self {
        Self {
            field,
            rows: board_height as u16 + HEADROOM,
            pitch,
        }
    }

    /// Centre of a terminal cell in world space.
    pub fn to_world(&self, column: u16, row: u16) -> Point {
        let cx = (f32::from(column) - f32::from(self.field.x) + 0.5) / f32::from(CELL_W) - 0.5;
        let cy = (f32::from(row) - f32::from(self.field.y) + 0.5) / f32::from(CELL_H);
        let y = f32::from(self.rows) - cy - 0.5;
        Point::new(cx * self.pitch, y * self.pitch)
    }

    /// Top-left terminal cell of a piece drawn at `point`, relative to the field.
    fn to_screen(&self, point: Point) -> (i32, i32) {
        let left = (point.x / self.pitch * f32::from(CELL_W)).round() as i32;
        let top = ((f32::from(self.rows) - 1.0 - point.y / self.pitch) * f32::from(CELL_H)).round() as i32;
        (left, top)
    }
}

/// Terminal size of the board including its border.
fn board_pixel_size(width: usize, height: usize) -> (u16, u16) {
    (
        width as u16 * CELL_W + 2,
        (height as u16 + HEADROOM) * CELL_H + 2,
    )
}

/// Draw everything. Returns the board geometry, or None when the terminal is too small.
pub fn draw(frame: &mut Frame, puzzle: &Puzzle, theme: &Theme) -> Option<BoardGeometry> {
    let area = frame.area();
    let grid = puzzle.grid();
    let (pw, ph) = board_pixel_size(grid.width(), grid.height());
    let total_w = pw + SIDEBAR_WIDTH;

    if area.width < total_w || area.height < ph {
        draw_too_small(frame, theme, area, total_w, ph);
        return None;
    }

    // Center horizontally
    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);

    // Center vertically
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);

    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);
    let (board_area, sidebar_area) = (inner[0], inner[1]);

    let geometry = draw_board(frame, puzzle, theme, board_area);
    draw_sidebar(frame, puzzle, theme, sidebar_area);
    if puzzle.phase() == Phase::None {
        draw_pause_overlay(frame, theme, board_area);
    }
    Some(geometry)
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect, w: u16, h: u16) {
    let msg = format!("Terminal too small: need {w}x{h}");
    Paragraph::new(Line::from(Span::styled(msg, Style::default().fg(theme.main_fg))))
        .alignment(Alignment::Center)
        .render(area, frame.buffer_mut());
}

fn draw_board(frame: &mut Frame, puzzle: &Puzzle, theme: &Theme, area: Rect) -> BoardGeometry {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Cascadetui ", theme.title));
    let field = block.inner(area);
    block.render(area, frame.buffer_mut());

    let geometry = BoardGeometry::new(field, puzzle.grid().height(), puzzle.board().pitch());
    let buf = frame.buffer_mut();

    let bg = Style::default().bg(theme.bg);
    for y in field.top()..field.bottom() {
        for x in field.left()..field.right() {
            buf[(x, y)].set_symbol(" ").set_style(bg);
        }
    }
    // Board top edge, below the headroom.
    let edge_y = field.y + HEADROOM * CELL_H - 1;
    for x in field.left()..field.right() {
        buf[(x, edge_y)]
            .set_symbol("┄")
            .set_style(Style::default().fg(theme.div_line).bg(theme.bg));
    }

    let mut pieces: Vec<&Piece> = puzzle.grid().pieces().collect();
    pieces.sort_by_key(|p| p.layer());
    for piece in pieces {
        draw_piece(buf, theme, &geometry, piece);
    }
    geometry
}

fn draw_piece(buf: &mut ratatui::buffer::Buffer, theme: &Theme, geometry: &BoardGeometry, piece: &Piece) {
    let look = theme.piece_look(piece.color());
    let (left, top) = geometry.to_screen(piece.position());
    let field = geometry.field;
    let shrunk = piece.state() == PieceState::Clearing && piece.scale() < 0.5;
    let style = match piece.state() {
        PieceState::Selected => Style::default().fg(Color::Black).bg(look.color).add_modifier(Modifier::BOLD),
        PieceState::Clearing => Style::default().fg(look.color).bg(theme.bg).add_modifier(Modifier::DIM),
        _ => Style::default().fg(Color::Black).bg(look.color),
    };

    for dy in 0..i32::from(CELL_H) {
        for dx in 0..i32::from(CELL_W) {
            // Positions far off screen saturate in `to_screen`; keep them there.
            let x = i32::from(field.x).saturating_add(left).saturating_add(dx);
            let y = i32::from(field.y).saturating_add(top).saturating_add(dy);
            if x < i32::from(field.left())
                || x >= i32::from(field.right())
                || y < i32::from(field.top())
                || y >= i32::from(field.bottom())
            {
                continue;
            }
            let centre = dx == i32::from(CELL_W) / 2 - 1 && dy == i32::from(CELL_H - 1) / 2;
            let symbol = if centre {
                look.glyph
            } else if shrunk {
                continue;
            } else if piece.state() == PieceState::Clearing {
                "░"
            } else {
                " "
            };
            buf[(x as u16, y as u16)].set_symbol(symbol).set_style(style);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, puzzle: &Puzzle, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Fill(1)])
        .split(area);

    let stats = puzzle.stats();
    let label = |k: &str| Span::styled(format!("{k:<9}"), Style::default().fg(theme.inactive_fg));
    let value = |v: String| Span::styled(v, Style::default().fg(theme.main_fg));
    let held = puzzle
        .selection()
        .held()
        .map_or_else(|| "-".to_string(), |(_, cell)| cell.to_string());
    let lines = vec![
        Line::from(vec![label("Phase"), value(puzzle.phase().label().to_string())]),
        Line::from(vec![label("Cleared"), value(stats.cleared.to_string())]),
        Line::from(vec![label("Batches"), value(stats.batches.to_string())]),
        Line::from(vec![label("Cascades"), value(stats.cascades.to_string())]),
        Line::from(vec![label("Holding"), value(held)]),
        Line::from(vec![label("Route"), value(puzzle.selection().route().count().to_string())]),
        Line::from(vec![label("Moving"), value(puzzle.board().active_count().to_string())]),
    ];
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Stats ", theme.title)),
        )
        .render(chunks[0], frame.buffer_mut());

    let help = vec![
        Line::from(Span::styled("Drag a piece to swap", Style::default().fg(theme.main_fg))),
        Line::from(Span::styled("Flick up to cancel", Style::default().fg(theme.main_fg))),
        Line::from(""),
        Line::from(Span::styled("P  Pause   R  Restart", Style::default().fg(theme.inactive_fg))),
        Line::from(Span::styled("Q  Quit", Style::default().fg(theme.inactive_fg))),
    ];
    Paragraph::new(help)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Help ", theme.title)),
        )
        .render(chunks[1], frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup_w = 22u16;
    let popup_h = 5u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(Span::styled(" P resume  Q quit ", Style::default().fg(theme.main_fg))),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascadetui::{PieceColor, PieceId, Pos, PuzzleConfig, TickInput};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use std::time::Duration;

    fn geometry() -> BoardGeometry {
        BoardGeometry::new(Rect::new(10, 5, 24, 12), 5, 1.05)
    }

    #[test]
    fn test_bottom_left_cell_centre_maps_to_origin() {
        let g = geometry();
        // Cell (0, 0) spans columns 10..14 and rows 15..17; its centre is between them.
        let p = g.to_world(11, 15);
        assert!((p.x - (-0.125 * 1.05)).abs() < 1e-4);
        assert!((p.y - (0.25 * 1.05)).abs() < 1e-4);
        let g_cell = g.to_world(12, 16);
        assert!((g_cell.x - 0.125 * 1.05).abs() < 1e-4);
        assert!((g_cell.y + 0.25 * 1.05).abs() < 1e-4);
    }

    #[test]
    fn test_every_board_cell_hits_its_own_piece_box() {
        let g = geometry();
        for cx in 0..6u16 {
            for cy in 0..5u16 {
                let column = 10 + cx * CELL_W + 1;
                let row = 5 + (g.rows - 1 - cy) * CELL_H;
                let p = g.to_world(column, row);
                let centre = Point::of_cell(cx as usize, cy as usize, 1.05);
                assert!((p.x - centre.x).abs() < 0.5, "x off for ({cx}, {cy})");
                assert!((p.y - centre.y).abs() < 0.5, "y off for ({cx}, {cy})");
            }
        }
    }

    #[test]
    fn test_headroom_is_above_top_boundary() {
        let g = geometry();
        let p = g.to_world(11, 5);
        assert!(p.y > 1.05 * 5.0);
    }

    #[test]
    fn test_screen_position_round_trips_cell_origin() {
        let g = geometry();
        assert_eq!(g.to_screen(Point::of_cell(0, 0, 1.05)), (0, 10));
        assert_eq!(g.to_screen(Point::of_cell(2, 4, 1.05)), (8, 2));
    }

    #[test]
    fn test_piece_far_off_screen_draws_nothing() {
        let g = geometry();
        let theme = Theme::default();
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 20));
        let blank = buf.clone();
        for at in [
            Point::new(f32::MIN, f32::MIN),
            Point::new(f32::MAX, f32::MAX),
            Point::new(f32::MIN, f32::MAX),
        ] {
            let piece = Piece::new(PieceId(1), PieceColor::Red, Pos::new(0, 0), at);
            draw_piece(&mut buf, &theme, &g, &piece);
        }
        assert_eq!(buf, blank);
    }

    #[test]
    fn test_held_piece_dragged_off_screen_still_draws() {
        let config = PuzzleConfig {
            seed: Some(1),
            ..PuzzleConfig::default()
        };
        let rows = ["BGYPBG", "GYPBGY", "YPBGYP", "PBGYPB", "BGYPBG"];
        let mut puzzle = Puzzle::from_layout(config, &rows).unwrap();
        let dt = Duration::from_millis(16);
        assert_eq!(puzzle.tick(&TickInput::press(Point::new(0.0, 0.0)), dt), Phase::Move);
        puzzle.tick(&TickInput::hover(Point::new(f32::MIN, f32::MIN)), dt);
        assert!(puzzle.selection().is_holding());

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let mut geometry = None;
        terminal
            .draw(|f| geometry = draw(f, &puzzle, &Theme::default()))
            .unwrap();
        assert!(geometry.is_some());
    }

    #[test]
    fn test_board_size_includes_border_and_headroom() {
        assert_eq!(board_pixel_size(6, 5), (26, 14));
    }
}
