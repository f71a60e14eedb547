//! `partition-mesh`: split a mesh store into per-rank partitions.
//!
//! ```text
//! partition-mesh -m basin.mstore -p basin_param.mstore --mpi-ranks 8 -g 250
//! partition-mesh -m basin.mesh -p elevation.param -p area.param [--mpi-ranks 8]
//! ```
//!
//! A JSON `.mesh` input is first converted to store files next to it; when a
//! rank count is also given the converted stores are partitioned right away.

use halo_partition::io::exchange::convert_exchange;
use halo_partition::mesh_error::MeshPartitionError;
use halo_partition::partitioning::{partition_mesh, MeshInput, PartitionConfig};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "\
Usage: partition-mesh [OPTIONS]

Options:
  -m, --mesh-file <PATH>            mesh store (.mstore) or JSON exchange mesh (.mesh)
  -p, --param-file <PATH>           parameter store or JSON parameter file; repeatable
  -g, --max-ghost-distance <DIST>   ghost search radius in metres [default: 100]
  -s, --standalone <RANK>           write only this rank, without ghosts (debugging)
      --mpi-ranks <N>               number of ranks, must be > 1
  -h, --help                        print this help";

#[derive(Clone, Debug, Default, PartialEq)]
struct CliArgs {
    mesh_file: Option<PathBuf>,
    param_files: Vec<PathBuf>,
    max_ghost_distance: Option<f64>,
    standalone: Option<usize>,
    ranks: Option<usize>,
    help: bool,
}

fn invalid(arg: &str, reason: impl Into<String>) -> MeshPartitionError {
    MeshPartitionError::InvalidArgument {
        arg: arg.to_string(),
        reason: reason.into(),
    }
}

fn parse_value<T: std::str::FromStr>(arg: &str, value: &str) -> Result<T, MeshPartitionError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| invalid(arg, format!("cannot parse `{value}`: {e}")))
}

fn parse_args<I>(args: I) -> Result<CliArgs, MeshPartitionError>
where
    I: IntoIterator<Item = String>,
{
    let mut out = CliArgs::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        // accept --flag=value as well as --flag value
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        if flag == "-h" || flag == "--help" {
            out.help = true;
            continue;
        }
        let value = match inline {
            Some(v) => v,
            None => it
                .next()
                .ok_or_else(|| invalid(&flag, "missing value"))?,
        };
        match flag.as_str() {
            "-m" | "--mesh-file" => out.mesh_file = Some(value.into()),
            "-p" | "--param-file" => out.param_files.push(value.into()),
            "-g" | "--max-ghost-distance" => {
                out.max_ghost_distance = Some(parse_value(&flag, &value)?)
            }
            "-s" | "--standalone" => out.standalone = Some(parse_value(&flag, &value)?),
            "--mpi-ranks" => out.ranks = Some(parse_value(&flag, &value)?),
            other => return Err(invalid(other, "unknown option")),
        }
    }
    Ok(out)
}

fn run(args: CliArgs) -> Result<(), MeshPartitionError> {
    let mesh_file = args.mesh_file.ok_or(MeshPartitionError::MissingInput("Mesh file"))?;
    if args.param_files.is_empty() {
        return Err(MeshPartitionError::MissingInput("Param file"));
    }

    let input = MeshInput::classify(&mesh_file)?;
    let is_exchange = matches!(input, MeshInput::Exchange(_));
    if is_exchange {
        log::warn!(
            "The input mesh is in JSON format. It must be converted to a store before it can be partitioned."
        );
        if args.ranks.is_some() {
            log::warn!("MPI ranks will be ignored for the JSON conversion.");
        }
    } else if args.ranks.is_none() {
        return Err(MeshPartitionError::MissingInput("MPI ranks"));
    }

    if args.max_ghost_distance.is_none() {
        log::warn!("Using default max ghost distance of 100 m");
    }
    if args.standalone.is_some() {
        log::warn!(
            "Standalone option enabled. Ghost faces are not written; the output is a single rank for debugging."
        );
    }

    let (mesh_path, param_paths) = match input {
        MeshInput::Store(p) => (p, args.param_files),
        MeshInput::Exchange(p) => {
            let converted = convert_exchange(&p, &args.param_files)?;
            (converted.mesh_path, vec![converted.param_path])
        }
    };

    let Some(ranks) = args.ranks else {
        return Ok(());
    };
    if is_exchange {
        log::debug!("Partitioning converted mesh {}", mesh_path.display());
    }

    let mut config = PartitionConfig::new(mesh_path, ranks);
    config.param_paths = param_paths;
    if let Some(d) = args.max_ghost_distance {
        config.max_ghost_distance = d;
    }
    config.standalone_rank = args.standalone;
    partition_mesh(&config)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };
    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => {
            log::debug!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
