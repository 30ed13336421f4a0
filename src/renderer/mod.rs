//! Renderer — rasterizes draw commands onto a terminal cell grid.
//!
//! The renderer knows nothing about seats or sessions. It maps normalized
//! rectangles onto cells, paints them in layer order with alpha blending,
//! and diffs each frame against the previous one so the terminal only
//! receives the cells that changed.

use crate::types::{DrawCommand, Glyph, Point, Rect, Rgb};

/// Hall background, behind everything else.
pub const CLEAR_COLOR: Rgb = Rgb::new(0.1, 0.1, 0.1);

const FIGURE: char = '●';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            fg: Rgb::new(1.0, 1.0, 1.0),
            bg: CLEAR_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

#[derive(Debug, Clone)]
pub enum Frame {
    Full { cells: Vec<Vec<Cell>> },
    Diff { changes: Vec<CellChange> },
}

pub struct Renderer {
    width: u16,
    height: u16,
    prev: Option<Vec<Vec<Cell>>>,
}

impl Renderer {
    pub fn new(width: u16, height: u16) -> Self {
        Renderer {
            width,
            height,
            prev: None,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Change the canvas size. The next frame is sent in full.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.prev = None;
    }

    /// Rasterize `ops` and return either the full grid (first frame, or after
    /// a resize) or the cells that differ from the previous frame.
    pub fn render(&mut self, ops: &[DrawCommand]) -> Frame {
        let grid = rasterize(ops, self.width, self.height);
        let frame = match &self.prev {
            None => Frame::Full {
                cells: grid.clone(),
            },
            Some(prev) => Frame::Diff {
                changes: diff(prev, &grid),
            },
        };
        self.prev = Some(grid);
        frame
    }
}

/// Paint draw commands onto a `width` × `height` grid.
///
/// Commands are sorted by layer so that higher layers paint over lower ones;
/// commands on the same layer keep their list order.
pub fn rasterize(ops: &[DrawCommand], width: u16, height: u16) -> Vec<Vec<Cell>> {
    let w = width as usize;
    let h = height as usize;
    let mut grid = vec![vec![Cell::default(); w]; h];
    if w == 0 || h == 0 {
        return grid;
    }

    let mut ops: Vec<_> = ops.iter().collect();
    ops.sort_by_key(|op| op.layer());

    for op in ops {
        match op {
            DrawCommand::Quad {
                rect,
                color,
                alpha,
                glyph: Glyph::Solid,
                ..
            } => {
                let (cols, rows) = cell_span(rect, w, h);
                for row in &mut grid[rows] {
                    for cell in &mut row[cols.clone()] {
                        if *alpha >= 1.0 {
                            *cell = Cell {
                                ch: ' ',
                                fg: cell.fg,
                                bg: *color,
                            };
                        } else {
                            cell.bg = color.over(cell.bg, *alpha);
                            cell.fg = color.over(cell.fg, *alpha);
                        }
                    }
                }
            }
            DrawCommand::Quad {
                rect,
                color,
                alpha,
                glyph: Glyph::Figure,
                ..
            } => {
                let (x, y) = to_cell(rect.center(), w, h);
                let cell = &mut grid[y][x];
                cell.ch = FIGURE;
                cell.fg = color.over(cell.bg, *alpha);
            }
            DrawCommand::Label {
                at,
                text,
                color,
                alpha,
                ..
            } => {
                let (x, y) = to_cell(*at, w, h);
                for (cell, ch) in grid[y][x..].iter_mut().zip(text.chars()) {
                    cell.ch = ch;
                    cell.fg = color.over(cell.bg, *alpha);
                }
            }
        }
    }

    grid
}

/// Cells whose centers fall inside `rect`. Never empty, so tiny rectangles
/// still show up as a single cell.
fn cell_span(
    rect: &Rect,
    w: usize,
    h: usize,
) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
    let left = (rect.x + 1.0) / 2.0 * w as f32;
    let right = (rect.x + rect.width + 1.0) / 2.0 * w as f32;
    let top = (1.0 - (rect.y + rect.height)) / 2.0 * h as f32;
    let bottom = (1.0 - rect.y) / 2.0 * h as f32;
    (span(left, right, w), span(top, bottom, h))
}

fn span(lo: f32, hi: f32, len: usize) -> std::ops::Range<usize> {
    let first = clamp_index((lo - 0.5).ceil(), len);
    let end = clamp_index((hi - 0.5).ceil(), len + 1).max(first + 1).min(len);
    first..end
}

fn clamp_index(v: f32, len: usize) -> usize {
    if v <= 0.0 {
        0
    } else {
        (v as usize).min(len.saturating_sub(1))
    }
}

/// The cell containing `p`.
fn to_cell(p: Point, w: usize, h: usize) -> (usize, usize) {
    let x = (p.x + 1.0) / 2.0 * w as f32;
    let y = (1.0 - p.y) / 2.0 * h as f32;
    (clamp_index(x.floor(), w), clamp_index(y.floor(), h))
}

/// Compute a cell-level diff between two grids.
fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
    let mut changes = Vec::new();
    for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
        for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
            if prev_cell != next_cell {
                changes.push(CellChange {
                    x: x as u16,
                    y: y as u16,
                    cell: *next_cell,
                });
            }
        }
    }
    changes
}
