/// ASCII ray caster for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Vector3;
use rtmesh_core::{Camera, Isect, SceneObject, Trimesh};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Renderer that casts one ray per terminal cell
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            char_buffer: vec![' '; width * height],
        }
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Character at cell (`x`, `y`)
    pub fn cell(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    pub fn render_mesh(&mut self, mesh: &Trimesh, camera: &Camera, light: &Vector3<f64>) {
        let (w, h) = (self.width as u32, self.height as u32);
        let mut isect = Isect::default();

        for y in 0..self.height {
            for x in 0..self.width {
                let ray = camera.primary_ray(x as f64 + 0.5, y as f64 + 0.5, w, h);
                self.char_buffer[y * self.width + x] = if mesh.intersect(&ray, &mut isect) {
                    shade(&isect, light)
                } else {
                    ' '
                };
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in self.char_buffer.chunks(self.width.max(1)) {
            for &c in row {
                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Ambient plus Lambert term, using the mean of the material's coefficients
fn shade(isect: &Isect, light: &Vector3<f64>) -> char {
    let ambient = isect.material.ka.mean();
    let diffuse = isect.material.kd.mean() * isect.n.dot(light).max(0.0);
    let brightness = (ambient + diffuse).clamp(0.0, 1.0);

    let last = LUMINOSITY_RAMP.len() - 1;
    // Any hit is at least faintly visible
    let index = ((brightness * last as f64) as usize).clamp(1, last);
    LUMINOSITY_RAMP[index]
}
