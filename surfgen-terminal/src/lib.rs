/// Terminal front end: rasterizes surfgen scenes as coloured ASCII
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use surfgen_core::{CameraState, KeyNudge, Scene, View};
use tracing::{debug, info};

pub mod config;
pub mod renderer;

pub use config::AppConfig;
pub use renderer::AsciiRenderer;

/// Main application struct for terminal rendering
pub struct TerminalApp {
    scene: Scene,
    title: String,
    camera: CameraState,
    view: View,
    renderer: AsciiRenderer,
    auto_spin: f32,
    frame_time: Duration,
    running: bool,
    drag_anchor: Option<(u16, u16)>,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene, title: impl Into<String>, view: View, config: &AppConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(scene, title, view, config, width, height))
    }

    /// App for a fixed character grid, without touching the terminal.
    pub fn with_size(
        scene: Scene,
        title: impl Into<String>,
        view: View,
        config: &AppConfig,
        width: u16,
        height: u16,
    ) -> Self {
        let mut renderer = AsciiRenderer::new(width as usize, height as usize);
        renderer.set_light_dir(config.light_dir);
        Self {
            scene,
            title: title.into(),
            camera: config.camera(),
            view,
            renderer,
            auto_spin: config.auto_spin,
            frame_time: config.frame_time(),
            running: true,
            drag_anchor: None,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        info!(scene = %self.title, parts = self.scene.len(), "starting render loop");

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind == KeyEventKind::Press => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                    KeyCode::Char('w') | KeyCode::Up => self.camera.nudge(KeyNudge::Up),
                    KeyCode::Char('s') | KeyCode::Down => self.camera.nudge(KeyNudge::Down),
                    KeyCode::Char('a') | KeyCode::Left => self.camera.nudge(KeyNudge::Left),
                    KeyCode::Char('d') | KeyCode::Right => self.camera.nudge(KeyNudge::Right),
                    _ => {}
                }
            }
            Event::Mouse(MouseEvent {
                kind, column, row, ..
            }) => self.handle_mouse(kind, column, row),
            Event::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                self.renderer.resize(width as usize, height as usize);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.camera.begin_drag();
                self.drag_anchor = Some((column, row));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((x, y)) = self.drag_anchor {
                    self.camera.drag(
                        f32::from(column) - f32::from(x),
                        f32::from(row) - f32::from(y),
                        self.renderer.width().max(1) as f32,
                        self.renderer.height().max(1) as f32,
                    );
                }
                self.drag_anchor = Some((column, row));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.camera.end_drag();
                self.drag_anchor = None;
            }
            _ => {}
        }
    }

    /// Advance the camera one frame and push its rotation to the scene root.
    pub fn update(&mut self) {
        if !self.camera.is_dragging() {
            self.camera.theta += self.auto_spin;
        }
        self.camera.update();
        self.scene.set_root(self.camera.rotation());
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer
            .render_scene(&self.scene, &self.view)
            .map_err(io::Error::other)?;

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "surfgen | {} | FPS: {:.1} | Drag/WASD/Arrows=Rotate Q=Quit",
                self.title, self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
