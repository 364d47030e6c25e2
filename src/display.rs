use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// the interpreter's view of the screen: one bool per pixel, addressed as
/// `y * 64 + x`, plus a flag saying whether it has changed since the last draw
pub struct Framebuffer {
    cells: Box<[bool]>,
    needs_redraw: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            cells: vec![false; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT].into_boxed_slice(),
            needs_redraw: false,
        }
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// is (x, y) lit; anything off-canvas is unlit
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < CHIP8_DISPLAY_WIDTH && y < CHIP8_DISPLAY_HEIGHT && self.cells[y * CHIP8_DISPLAY_WIDTH + x]
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
        self.needs_redraw = true;
    }

    /// XOR an 8-pixel-wide sprite onto the screen anchored at (x, y). Pixels
    /// that land off the canvas are dropped rather than wrapped. Returns true
    /// if any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut collision = false;
        for (dy, row) in rows.iter().enumerate() {
            let py = y + dy;
            if py >= CHIP8_DISPLAY_HEIGHT {
                break;
            }
            for dx in 0..8 {
                let px = x + dx;
                if px >= CHIP8_DISPLAY_WIDTH {
                    break;
                }
                if row & (0x80 >> dx) != 0 {
                    let cell = &mut self.cells[py * CHIP8_DISPLAY_WIDTH + px];
                    collision |= *cell;
                    *cell = !*cell;
                }
            }
        }
        self.needs_redraw = true;
        collision
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// read and reset the redraw flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.needs_redraw, false)
    }
}

/// Display is used by the environment to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work. The framebuffer is read-only to it.
pub trait Display {
    /// draw the current contents of the framebuffer
    fn draw(&mut self, fb: &Framebuffer) -> Result<(), io::Error>;
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every cell that is `lit` (or every cell that isn't)
    fn bitplane_from_cells<'a>(
        &self,
        cells: &'a [bool],
        lit: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = self.0;
        cells
            .iter()
            .take(self.pixel_count())
            .enumerate()
            .filter(move |(_, c)| **c == lit)
            .map(move |(i, _)| {
                (
                    (i % w) as f64,        // x
                    -1.0 * (i / w) as f64, // y
                )
            })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, fb: &Framebuffer) -> Result<(), io::Error> {
        let cells = fb.cells();
        let resolution = &self.resolution;
        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_cells(cells, false).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_cells(cells, true).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers what it was last given
#[derive(Default)]
pub struct DummyDisplay {
    pub draw_count: usize,
    pub last_frame: Vec<bool>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, fb: &Framebuffer) -> Result<(), io::Error> {
        self.draw_count += 1;
        self.last_frame = fb.cells().to_vec();
        Ok(())
    }
}
