use clap::{Parser, Subcommand};
use log::debug;
use orviz_lang::{DefaultPolicy, LpResponse, ProblemKind, Request, Response};
use orviz_solver::{SolutionStatus, TransportationProblem, TransportationSolution, TspMethod, TspSolution};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "orviz")]
#[command(about = "Solve linear programming, transportation and TSP problems", long_about = None)]
struct Cli {
    /// Log solver progress (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a JSON problem payload
    Solve {
        /// The payload file, or - for stdin
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Take missing fields from the sample problem instead of failing
        #[arg(long)]
        fill_defaults: bool,
    },
    /// Parse an objective or constraint and print its coefficients
    Parse {
        /// The text to parse, e.g. "3x1 + 2x2"
        text: String,
        /// Parse as a constraint instead of an objective
        #[arg(short, long)]
        constraint: bool,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Check a JSON problem payload without solving it
    Check {
        /// The payload file, or - for stdin
        file: PathBuf,
    },
    /// Print the sample payload for a problem type
    Sample {
        /// standard, transportation or tsp
        kind: String,
    },
}

fn read_source(file: &Path) -> String {
    let result = if file == Path::new("-") {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(file)
    };
    match result {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", file.display(), e);
            std::process::exit(1);
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Solve { file, format, fill_defaults } => {
            let source = read_source(&file);
            let policy = if fill_defaults {
                DefaultPolicy::FillMissing
            } else {
                DefaultPolicy::Strict
            };

            let request = match Request::from_json(&source, policy) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Invalid payload: {}", e);
                    std::process::exit(1);
                }
            };
            debug!("parsed {} request from {}", request.kind(), file.display());

            let response = match request.solve() {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
            };

            if format == "json" {
                println!("{}", to_json(&response));
            } else {
                print_response(&response);
            }
        }
        Commands::Parse { text, constraint, format } => {
            let parsed = if constraint {
                orviz_lang::parse_constraint(&text).map(|c| {
                    if format == "json" {
                        to_json(&c)
                    } else {
                        format!("{} {} {}", format_coefficients(c.coefficients.coefficients()), c.op.symbol(), c.rhs)
                    }
                })
            } else {
                orviz_lang::parse_objective(&text).map(|o| {
                    if format == "json" {
                        to_json(&o)
                    } else {
                        format!("{:?} {}", o.sense, format_coefficients(o.coefficients.coefficients()))
                    }
                })
            };

            match parsed {
                Ok(output) => println!("{}", output),
                Err(e) => {
                    eprintln!("Parse error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { file } => {
            let source = read_source(&file);
            let request = match Request::from_json(&source, DefaultPolicy::Strict) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            };

            let problem = match &request {
                Request::Standard(req) => {
                    orviz_lang::Compiler::compile_lp(&req.objective, &req.constraints).map(|p| {
                        format!("{} constraints, {} variables", p.num_constraints(), p.num_variables())
                    })
                }
                Request::Transportation(req) => {
                    let problem = TransportationProblem::new(req.supply.clone(), req.demand.clone(), req.costs.clone());
                    Ok(format!(
                        "{} sources, {} destinations, {} supply, {} demand{}",
                        problem.supply.len(),
                        problem.demand.len(),
                        problem.total_supply(),
                        problem.total_demand(),
                        if problem.is_balanced() { "" } else { " (unbalanced)" }
                    ))
                }
                Request::Tsp(req) => Ok(format!("{} cities", req.distances.len())),
            };

            match problem {
                Ok(summary) => {
                    println!("✓ {} is a valid {} payload", file.display(), request.kind());
                    println!("  {}", summary);
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Sample { kind } => match kind.parse::<ProblemKind>() {
            Ok(kind) => println!("{}", to_json(&Request::sample(kind))),
            Err(e) => {
                eprintln!("{} (expected standard, transportation or tsp)", e);
                std::process::exit(1);
            }
        },
    }
}

fn format_coefficients(coefficients: &[f64]) -> String {
    let terms: Vec<String> = coefficients
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}x{}", c, i + 1))
        .collect();
    format!("[{}]", terms.join(", "))
}

fn print_response(response: &Response) {
    match response {
        Response::Standard(lp) => print_lp(lp),
        Response::Transportation(solution) => print_transportation(solution),
        Response::Tsp(solution) => print_tsp(solution),
    }
}

fn print_lp(lp: &LpResponse) {
    println!("Objective: {:?} {}", lp.objective.sense, format_coefficients(lp.objective.coefficients.coefficients()));
    println!();
    println!("Corner points:");
    for p in &lp.solution.feasible_vertices {
        println!("  ({:.2}, {:.2})  z = {:.2}", p.x, p.y, lp.objective.coefficients.evaluate(p.x, p.y));
    }
    println!();

    if !lp.solution.is_feasible() {
        println!("Status: INFEASIBLE");
        println!("No corner point satisfies all constraints.");
        return;
    }

    match (lp.solution.status, lp.solution.optimal_vertex) {
        (SolutionStatus::Optimal, Some(p)) => {
            println!("Status: OPTIMAL");
            println!("Optimal vertex: ({:.2}, {:.2})", p.x, p.y);
            println!("Optimal value: {:.2}", lp.solution.optimal_value);
        }
        (SolutionStatus::Unbounded, Some(p)) => {
            println!("Status: UNBOUNDED");
            println!("The objective grows without bound; best corner ({:.2}, {:.2}), z = {:.2}", p.x, p.y, lp.solution.optimal_value);
        }
        (status, _) => println!("Status: {:?}", status),
    }
}

fn print_transportation(solution: &TransportationSolution) {
    println!("Allocations:");
    for a in &solution.allocations {
        println!("  S{} -> D{}  {:10.2}", a.source + 1, a.destination + 1, a.amount);
    }
    println!();
    println!("Total cost: {:.2}", solution.total_cost);

    let residual_supply: f64 = solution.unallocated_supply.iter().sum();
    let residual_demand: f64 = solution.unallocated_demand.iter().sum();
    if residual_supply > 0.0 {
        println!("Unallocated supply: {:.2}", residual_supply);
    }
    if residual_demand > 0.0 {
        println!("Unmet demand: {:.2}", residual_demand);
    }
}

fn print_tsp(solution: &TspSolution) {
    let heading = match solution.method {
        TspMethod::Exhaustive => "Optimal tour",
        TspMethod::NearestNeighbor => "Greedy tour (nearest neighbor, may not be optimal)",
    };
    println!("{}:", heading);

    let stops: Vec<String> = if solution.route.is_empty() {
        solution.tour.iter().map(|c| c.to_string()).collect()
    } else {
        solution.route.clone()
    };
    println!("  {}", stops.join(" -> "));
    println!();
    println!("Total distance: {:.2}", solution.total_distance);
}
