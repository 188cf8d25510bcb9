//! Symcircuit - Symbolic Circuit Analysis
//!
//! Command-line front end for domain-aware expressions and nodal analysis.
//!
//! # Usage
//!
//! ```bash
//! symcircuit expr "exp(-2 * t) * u(t)" --op laplace
//! symcircuit expr "1 / (s^2 + 3*s + 2)" --op partfrac
//! symcircuit expr "1 / (s + 1)" --op inverse-laplace --causal
//! symcircuit expr "exp(-t) * u(t)" --at 1.5
//! symcircuit nodal divider.net --domain s --solve
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use symcircuit::{
    circuit::Circuit,
    dsl,
    error::Result,
    expr::{expr_with, Assumptions, Domain, Expr},
    numeric::Value,
    NodalAnalysis,
};

/// Symbolic circuit analysis
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an expression and apply an operation to it
    Expr {
        /// The expression; its domain follows from the variable it uses
        #[arg(value_name = "EXPR")]
        text: String,

        /// Operation to apply
        #[arg(short, long, value_enum, default_value_t = Op::Show)]
        op: Op,

        /// Evaluate the result numerically at this argument
        #[arg(long, value_name = "VALUE")]
        at: Option<f64>,

        /// Assume the signal is zero for t < 0
        #[arg(long)]
        causal: bool,

        /// Assume the signal is constant
        #[arg(long, conflicts_with = "ac")]
        dc: bool,

        /// Assume the signal is a sinusoid
        #[arg(long)]
        ac: bool,

        /// Print LaTeX instead of plain text
        #[arg(long)]
        latex: bool,
    },

    /// Nodal analysis of a netlist file
    Nodal {
        /// Path to the netlist
        #[arg(value_name = "NETLIST_FILE")]
        netlist: PathBuf,

        /// Analysis domain
        #[arg(short, long, value_enum, default_value_t = AnalysisDomain::S)]
        domain: AnalysisDomain,

        /// Solve for the node voltages instead of printing the equations
        #[arg(long)]
        solve: bool,

        /// Print the matrix form A * y = b (Laplace domain only)
        #[arg(long, conflicts_with = "solve")]
        matrix: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Op {
    Show,
    Laplace,
    InverseLaplace,
    Fourier,
    InverseFourier,
    AngularFourier,
    InverseAngularFourier,
    Ztransform,
    InverseZtransform,
    Canonical,
    General,
    Partfrac,
    Standard,
    Timeconst,
    Zpk,
    Factored,
    Expandcanonical,
    Mixedfrac,
    Poles,
    Zeros,
    Simplify,
    Expand,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AnalysisDomain {
    /// Laplace domain
    S,
    /// Time domain
    T,
}

impl From<AnalysisDomain> for Domain {
    fn from(domain: AnalysisDomain) -> Self {
        match domain {
            AnalysisDomain::S => Domain::Laplace,
            AnalysisDomain::T => Domain::Time,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Expr {
            text,
            op,
            at,
            causal,
            dc,
            ac,
            latex,
        } => {
            let mut assumptions = Assumptions::new();
            if causal {
                assumptions = assumptions.with_causal(true);
            }
            if dc {
                assumptions = assumptions.with_dc(true);
            }
            if ac {
                assumptions = assumptions.with_ac(true);
            }
            let x = expr_with(&text, assumptions)?;
            log::debug!("parsed {} as {}", x, x.kind());

            let result = apply(&x, op)?;
            match result {
                Applied::Single(y) => {
                    print_expr(&y, latex);
                    if let Some(arg) = at {
                        println!("{}", format_value(y.evaluate_at(arg)?));
                    }
                }
                Applied::Roots(roots) => {
                    for (root, multiplicity) in roots {
                        let text = if latex { root.latex() } else { root.to_string() };
                        println!("{} (x{})", text, multiplicity);
                    }
                }
            }
        }
        Command::Nodal {
            netlist,
            domain,
            solve,
            matrix,
        } => {
            let circuit = Circuit::from_ast(dsl::parse_file(&netlist)?)?;
            symcircuit::circuit::validate_circuit(&circuit)?;
            let analysis = NodalAnalysis::new(&circuit, domain.into())?;

            if solve {
                let voltages = analysis.solve()?;
                for (node, value) in voltages.iter() {
                    println!("{} = {}", node, value);
                }
            } else if matrix {
                println!("{}", analysis.equations()?);
            } else {
                for equation in analysis.nodal_equations()? {
                    println!("{}", equation);
                }
            }
        }
    }

    Ok(())
}

enum Applied {
    Single(Expr),
    Roots(Vec<(Expr, usize)>),
}

fn apply(x: &Expr, op: Op) -> Result<Applied> {
    let y = match op {
        Op::Show => x.clone(),
        Op::Laplace => x.laplace()?,
        Op::InverseLaplace => x.inverse_laplace()?,
        Op::Fourier => x.fourier()?,
        Op::InverseFourier => x.inverse_fourier()?,
        Op::AngularFourier => x.angular_fourier()?,
        Op::InverseAngularFourier => x.inverse_angular_fourier()?,
        Op::Ztransform => x.ztransform()?,
        Op::InverseZtransform => x.inverse_ztransform()?,
        Op::Canonical => x.canonical(),
        Op::General => x.general(),
        Op::Partfrac => x.partfrac(),
        Op::Standard => x.standard(),
        Op::Timeconst => x.timeconst(),
        Op::Zpk => x.zpk(),
        Op::Factored => x.factored(),
        Op::Expandcanonical => x.expandcanonical(),
        Op::Mixedfrac => x.mixedfrac(),
        Op::Simplify => x.simplify(),
        Op::Expand => x.expand(),
        Op::Poles => return Ok(Applied::Roots(x.poles())),
        Op::Zeros => return Ok(Applied::Roots(x.zeros())),
    };
    Ok(Applied::Single(y))
}

fn print_expr(x: &Expr, latex: bool) {
    if latex {
        println!("{}", x.latex());
    } else {
        println!("{}", x);
    }
}

fn format_value(value: Value) -> String {
    match value {
        Value::Real(x) => format!("{}", x),
        Value::Complex(c) if c.im < 0.0 => format!("{} - {}j", c.re, -c.im),
        Value::Complex(c) => format!("{} + {}j", c.re, c.im),
    }
}
