use clap::Parser;
use color_eyre::eyre::{self, Context};
use timelapse::camera::{self, resolution};
use timelapse_common::bin_common::init::{init_eyre, init_logger};

#[derive(Parser)]
#[command()]
/// Lists which of the usual resolutions a camera supports.
struct Cli {
    /// Which camera to probe
    #[arg(long, default_value_t = 0)]
    camera: u32,
}

fn main() -> eyre::Result<()> {
    init_eyre()?;
    init_logger(None)?;
    let cli = Cli::parse();

    let backend = camera::default_backend(cli.camera);
    let accepted = camera::detect_resolutions(&backend)
        .wrap_err_with(|| format!("failed to open camera {}", cli.camera))?;

    if accepted.is_empty() {
        println!("The camera supports none of the usual resolutions");
        return Ok(());
    }

    for res in &accepted {
        println!("{res}");
    }
    if let Some(auto) = resolution::select_auto(&accepted) {
        println!("Automatic selection would pick: {auto}");
    }

    Ok(())
}
