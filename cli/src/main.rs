use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use clap::Parser;
use thiserror::Error;

use tricanvas::framebuffer::FrameBuffer;
use tricanvas::raster::Rasterizer;
use tricanvas::Scene;

mod args;

use args::Args;

fn main() {
    // clion needs help in trait annotation
    let args = <Args as Parser>::parse();

    if args.width == 0 || args.height == 0 {
        eprintln!("Output size must be non-zero");
        std::process::exit(-1);
    }

    let mut fb = FrameBuffer::new(args.width, args.height);

    let mut rasterizer = Rasterizer::default();
    if args.cull {
        rasterizer.cull = Some(tricanvas::raster::Face::Back);
    }

    let stats = rasterizer.render(&Scene::triangle(), &mut fb);

    eprintln!(
        "Drew {} triangle(s), culled {}, {} fragments",
        stats.triangles_drawn, stats.triangles_culled, stats.fragments
    );

    if let Err(e) = write_out(&fb, &args.output) {
        eprintln!("Could not write {:?}: {e}", args.output);
        std::process::exit(-1);
    }
}

#[derive(Debug, Error)]
enum OutputError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encoding(#[from] png::EncodingError),
}

fn write_out(fb: &FrameBuffer, name: &Path) -> Result<(), OutputError> {
    let file = File::create(name)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, fb.width() as u32, fb.height() as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&fb.to_rgba8())?;

    Ok(())
}
