use clap::Parser;

use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// Width of the output image
    #[arg(long, default_value_t = 640)]
    pub width: usize,
    /// Height of the output image
    #[arg(long, default_value_t = 640)]
    pub height: usize,
    /// Enable back-face culling, as a GPU with CULL_FACE on would
    #[arg(long)]
    pub cull: bool,
    /// Path to save render to
    #[arg(short, long, default_value_os_t = PathBuf::from("triangle.png"))]
    pub output: PathBuf,
}
