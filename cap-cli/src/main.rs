use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{anyhow, Context};
use cap_core::{
    basis::BasisSet,
    cap::BoxCap,
    config::{CapConfig, ConfigBasisSet, ConfigMolecule, GridConfig},
    grid::BeckeGrid,
    integrals::{compute_analytical_overlap, compute_cap_mat, compute_numerical_overlap_mat},
    molecule::Molecule,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use nalgebra::DMatrix;
use serde::de::DeserializeOwned;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: CapCommand,
}

#[derive(ClapArgs, Debug)]
struct SystemArgs {
    /// Basis set in Basis Set Exchange JSON format
    #[arg(long, short)]
    basis_set: PathBuf,
    /// A path to the molecule, positions in bohr
    #[arg(long, short)]
    molecule: PathBuf,
    /// Grid resolution as JSON, defaults are used for missing fields
    #[arg(long, short)]
    grid: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum CapCommand {
    /// Overlap matrix of the basis set
    Overlap {
        #[command(flatten)]
        system: SystemArgs,
        /// Integrate on the quadrature grid instead of analytically
        #[arg(long)]
        numerical: bool,
    },
    /// Matrix of a box-shaped complex absorbing potential
    Cap {
        #[command(flatten)]
        system: SystemArgs,
        #[arg(long)]
        cap_x: f64,
        #[arg(long)]
        cap_y: f64,
        #[arg(long)]
        cap_z: f64,
        /// Center of the box, the origin if omitted
        #[arg(
            long,
            num_args = 3,
            value_names = ["X", "Y", "Z"],
            allow_negative_numbers = true
        )]
        origin: Option<Vec<f64>>,
    },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("could not parse {}", path.display()))
}

struct System {
    molecule: Molecule,
    basis: BasisSet,
    grid: GridConfig,
}

impl System {
    fn load(args: &SystemArgs) -> anyhow::Result<Self> {
        let molecule = Molecule::try_from(load_json::<ConfigMolecule>(&args.molecule)?)
            .map_err(|error| anyhow!("invalid molecule {}: {error}", args.molecule.display()))?;
        let basis = load_json::<ConfigBasisSet>(&args.basis_set)?
            .basis_for(&molecule)
            .map_err(|error| anyhow!("invalid basis set {}: {error}", args.basis_set.display()))?;
        let grid = match &args.grid {
            Some(path) => load_json(path)?,
            None => GridConfig::default(),
        };

        log::info!(
            "{} atoms, {} shells, {} basis functions",
            molecule.len(),
            basis.n_shells(),
            basis.num_carts()
        );
        Ok(Self { molecule, basis, grid })
    }

    fn zeros(&self) -> DMatrix<f64> {
        let n = self.basis.num_carts();
        DMatrix::zeros(n, n)
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args: Args = Args::parse();
    let start = Instant::now();

    let matrix = match args.command {
        CapCommand::Overlap { system, numerical } => {
            let system = System::load(&system)?;
            let mut matrix = system.zeros();
            if numerical {
                compute_numerical_overlap_mat(
                    &mut matrix,
                    &system.basis,
                    &system.molecule,
                    &BeckeGrid::default(),
                    &system.grid,
                )?;
            } else {
                compute_analytical_overlap(&system.basis, &mut matrix)?;
            }
            matrix
        }

        CapCommand::Cap {
            system,
            cap_x,
            cap_y,
            cap_z,
            origin,
        } => {
            let system = System::load(&system)?;
            let mut config = CapConfig::new(cap_x, cap_y, cap_z);
            if let Some(&[x, y, z]) = origin.as_deref() {
                config = config.with_origin([x, y, z]);
            }
            let cap = BoxCap::try_from(config).map_err(|error| anyhow!("invalid CAP: {error}"))?;

            let mut matrix = system.zeros();
            compute_cap_mat(
                &mut matrix,
                &system.basis,
                &system.molecule,
                &BeckeGrid::default(),
                &system.grid,
                &cap,
            )?;
            matrix
        }
    };

    log::info!("matrix computed in {:0.2?}", start.elapsed());
    println!("{matrix:0.8}");

    Ok(())
}
