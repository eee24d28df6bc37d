use anyhow::{bail, Context, Result};
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use env_logger::Builder;
use log::warn;

use tableau_simplex::parse::{parse_coefficients, parse_constraint};
use tableau_simplex::{Method, Model, OptDir, Solver};

const MAX_VARS: usize = 10;

/// Solve a small linear program with the tableau simplex method and print every tableau.
///
/// Example: tableau-simplex -m simplex -c "3, 5" -s "1, 0 <= 4" -s "0, 2 <= 12" -s "3, 2 <= 18"
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// simplex, big-m or two-phase
    #[arg(short, long, default_value = "two-phase")]
    method: Method,

    /// max or min
    #[arg(short, long, default_value = "max")]
    direction: OptDir,

    /// Objective coefficients, e.g. "3, 5"
    #[arg(short = 'c', long, allow_hyphen_values = true)]
    objective: String,

    /// Constraint such as "3, 2 <= 18"; repeat for each constraint
    #[arg(short = 's', long = "subject-to", allow_hyphen_values = true)]
    constraints: Vec<String>,

    /// Only print the final result
    #[arg(long)]
    no_trace: bool,

    #[command(flatten)]
    verbose: Verbosity,
}

fn build_model(cli: &Cli) -> Result<Model> {
    let obj_fn = parse_coefficients(&cli.objective);
    let n = obj_fn.len();
    if n == 0 || n > MAX_VARS {
        bail!("expected between 1 and {} objective coefficients, got {}", MAX_VARS, n);
    }

    let mut mdl = Model::new(cli.direction, obj_fn);
    for (i, text) in cli.constraints.iter().enumerate() {
        let cons = parse_constraint(text).with_context(|| format!("reading constraint {}", i + 1))?;
        if cons.n_vars() != n {
            warn!("constraint {} has {} coefficients, using {}", i + 1, cons.n_vars(), n);
        }
        mdl.add_constraint(cons.with_n_vars(n));
    }
    Ok(mdl)
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    Builder::new().filter_level(cli.verbose.log_level_filter()).init();

    let mdl = build_model(&cli).context("building the model")?;
    println!("model:\n{}", mdl);

    let sol = Solver::new().solve(&mdl, cli.method);
    if !cli.no_trace {
        for step in sol.steps() {
            println!("{}", step);
        }
    }
    println!("{}", sol);
    Ok(())
}
