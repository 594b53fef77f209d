/// RTMesh Terminal Preview
///
/// Ray casts a triangle mesh into the terminal: an STL file when one is
/// given, a cube otherwise.
/// Controls:
///   - WASD / Arrow Keys: Rotate the mesh
///   - E/R: Roll rotation
///   - Q/ESC: Quit

use std::env;
use std::fs;
use std::io;

use nalgebra::Vector3;
use rtmesh_core::{stl, Material, Trimesh};
use rtmesh_terminal::{Options, TerminalApp};

fn main() -> io::Result<()> {
    let options = Options::parse(env::args().skip(1))?;
    let material = Material::diffuse(Vector3::new(0.9, 0.9, 0.9));

    let mesh = match &options.stl {
        Some(path) => {
            println!("Loading STL file: {}", path.display());
            let data = fs::read(path).map_err(|e| {
                io::Error::new(e.kind(), format!("Failed to read STL file: {}", e))
            })?;
            let mesh = stl::parse_stl(&data, material).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("Failed to parse STL: {}", e))
            })?;
            println!("Loaded {} triangles", mesh.face_count());
            mesh
        }
        None => Trimesh::cube(2.0, material),
    };

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(mesh, options.config)?;
    app.run()?;

    println!("Thank you for using RTMesh Terminal Preview!");
    Ok(())
}
