use pfmat::prelude::*;
use pfmat::StrError;
use russell_tensor::{Mandel, Tensor2};
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "pfmat_point_driver",
    about = "Drives a single material point through a uniaxial stretch"
)]
struct Options {
    /// JSON file with the material parameters
    param_file: String,

    /// Maximum stretch (F₀₀ - 1) at the end of the path
    #[structopt(short = "s", long, default_value = "0.005")]
    stretch: f64,

    /// Number of path segments
    #[structopt(short = "n", long, default_value = "10")]
    n_step: usize,

    /// Time increment of each segment
    #[structopt(long, default_value = "1.0")]
    dt: f64,

    /// Prints the parameters
    #[structopt(short, long)]
    verbose: bool,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();
    if options.n_step < 1 {
        return Err("the number of steps must be at least 1");
    }

    // load parameters
    let contents = std::fs::read_to_string(&options.param_file).map_err(|_| "cannot open parameters file")?;
    let param: ParamMaterial = serde_json::from_str(&contents).map_err(|_| "cannot parse parameters file")?;
    if options.verbose {
        println!("{}", param);
    }

    // allocate model
    let material = Material::new(&param, None)?;

    // path
    let path = (1..=options.n_step)
        .map(|i| {
            let e = options.stretch * (i as f64) / (options.n_step as f64);
            Tensor2::from_matrix(&[[1.0 + e, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], Mandel::General)
        })
        .collect::<Result<Vec<_>, _>>()?;

    // run
    let driver = LoadingDriver::new(&material);
    let records = driver.run(&path, options.dt, &PointInput::new())?;

    // results
    println!(
        "{:>6}{:>12}{:>14}{:>14}{:>14}{:>9}",
        "step", "time", "F00", "sig00", "energy", "cutback"
    );
    for (i, record) in records.iter().enumerate() {
        let energy = match &record.update.derived {
            DerivedProperties::StrainSplitDamage(p) => p.g0_pos,
            DerivedProperties::CrystalPlasticity(p) => p.w0p,
            DerivedProperties::Polycrystal(_) => 0.0,
        };
        println!(
            "{:>6}{:>12.4}{:>14.6}{:>14.6e}{:>14.6e}{:>9}",
            i + 1,
            record.time,
            record.deformation_gradient.get(0, 0),
            record.update.state.stress.get(0, 0),
            energy,
            record.n_cutback
        );
    }
    Ok(())
}
