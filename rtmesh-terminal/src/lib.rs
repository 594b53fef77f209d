/// Terminal-based ASCII ray caster for previewing triangle meshes
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::{Point3, Vector3};
use rtmesh_core::{Camera, RotationState, Transform, Trimesh};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;

pub use config::{Options, RenderConfig};
pub use renderer::AsciiRenderer;

/// Main application struct for terminal mesh preview
pub struct TerminalApp {
    mesh: Trimesh,
    rotation: RotationState,
    /// Centres and scales the model into the view volume
    fit: Transform,
    camera: Camera,
    renderer: AsciiRenderer,
    config: RenderConfig,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mut mesh: Trimesh, config: RenderConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        if config.smooth {
            mesh.generate_normals();
        }
        if let Some(err) = mesh.double_check() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, err));
        }

        let mut camera = Camera::new(u32::from(width), u32::from(height));
        camera.aspect *= config.cell_aspect;
        camera.mode = config.projection;

        let fit = fit_transform(&mesh);

        Ok(Self {
            mesh,
            fit,
            rotation: RotationState::new(0.3, 0.3, 0.0),
            camera,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            config,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / u64::from(self.config.target_fps.max(1)));

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.update();
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('w') | KeyCode::Up => {
                    self.rotation.rotate(0.1, 0.0, 0.0);
                }
                KeyCode::Char('s') | KeyCode::Down => {
                    self.rotation.rotate(-0.1, 0.0, 0.0);
                }
                KeyCode::Char('a') | KeyCode::Left => {
                    self.rotation.rotate(0.0, -0.1, 0.0);
                }
                KeyCode::Char('d') | KeyCode::Right => {
                    self.rotation.rotate(0.0, 0.1, 0.0);
                }
                KeyCode::Char('e') => {
                    self.rotation.rotate(0.0, 0.0, 0.1);
                }
                KeyCode::Char('r') => {
                    self.rotation.rotate(0.0, 0.0, -0.1);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn update(&mut self) {
        let spin = self.config.spin;
        self.rotation.rotate(spin.x, spin.y, spin.z);
        let model = Transform::rotation(&self.rotation).compose(&self.fit);
        self.mesh.set_transform(model);
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer
            .render_mesh(&self.mesh, &self.camera, &self.config.light);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "RTMesh | {} faces | FPS: {:.1} | Controls: WASD/Arrows=Rotate E/R=Roll Q=Quit",
                self.mesh.face_count(),
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Transform mapping the mesh's vertex extent onto a cube of half-size 1
/// centred at the origin. Identity for empty or single-point meshes.
pub fn fit_transform(mesh: &Trimesh) -> Transform {
    let mut vertices = mesh.vertices().iter();
    let Some(first) = vertices.next() else {
        return Transform::identity();
    };

    let (min, max) = vertices.fold((*first, *first), |(min, max), p| {
        (min.inf(p), max.sup(p))
    });
    let center: Point3<f64> = nalgebra::center(&min, &max);
    let half: Vector3<f64> = (max - min) / 2.0;
    let extent = half.max();
    if !(extent > 0.0) {
        return Transform::identity();
    }

    Transform::scale(1.0 / extent, 1.0 / extent, 1.0 / extent)
        .map(|scale| scale.compose(&Transform::translation(-center.x, -center.y, -center.z)))
        .unwrap_or_else(Transform::identity)
}
