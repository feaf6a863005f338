use std::net::{IpAddr, SocketAddr};

use buyrent::api::{ProjectionArgs, build_inputs, build_project_response, render_yearly_table};
use buyrent::core::{BreakevenSolveConfig, solve_breakeven_rent};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "buyrent",
    version,
    about = "Month-by-month projection of buying a home versus renting and investing"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, env = "BUYRENT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard and the JSON API
    Serve {
        #[arg(long, env = "BUYRENT_HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "BUYRENT_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Run one projection and print it
    Project {
        #[command(flatten)]
        args: ProjectionArgs,
        /// Date of period 0; defaults to today
        #[arg(long)]
        anchor_date: Option<NaiveDate>,
        /// Print the full JSON response instead of the yearly table
        #[arg(long)]
        json: bool,
    },
    /// Find the starting rent at which buying and renting end up even
    Breakeven {
        #[command(flatten)]
        args: ProjectionArgs,
        #[arg(long, default_value_t = 0.0)]
        search_min: f64,
        #[arg(long, default_value_t = 20_000.0)]
        search_max: f64,
        #[arg(long, default_value_t = 0.01)]
        tolerance: f64,
        #[arg(long, default_value_t = 60)]
        max_iterations: u32,
    },
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli.command).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Serve { host, port } => {
            let addr = SocketAddr::new(host, port);
            buyrent::api::run_http_server(addr)
                .await
                .map_err(|e| format!("Server error: {e}"))
        }
        Command::Project {
            args,
            anchor_date,
            json,
        } => {
            let inputs = build_inputs(args)?;
            let anchor = anchor_date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let response = build_project_response(&inputs, anchor).map_err(|e| e.to_string())?;
            if json {
                let body = serde_json::to_string_pretty(&response).map_err(|e| e.to_string())?;
                println!("{body}");
            } else {
                print!("{}", render_yearly_table(&response));
            }
            Ok(())
        }
        Command::Breakeven {
            args,
            search_min,
            search_max,
            tolerance,
            max_iterations,
        } => {
            let inputs = build_inputs(args)?;
            let config = BreakevenSolveConfig {
                search_min,
                search_max,
                tolerance,
                max_iterations,
            };
            let result = solve_breakeven_rent(&inputs, config).map_err(|e| e.to_string())?;
            match result.solved_rent {
                Some(rent) => println!("Breakeven monthly rent: {rent:.2} ({})", result.message),
                None => println!("{}", result.message),
            }
            Ok(())
        }
    }
}
