//! Lamina command-line interface.
//!
//! Run layer-stack simulations from TOML job files:
//! ```sh
//! lamina-cli run job.toml
//! lamina-cli validate job.toml
//! lamina-cli solvers
//! lamina-cli materials --book silica
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use lamina_core::SolverKind;
use lamina_materials::catalog::{Catalog, CatalogEntry};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lamina-cli")]
#[command(about = "Lamina: transfer-matrix optics for layered media")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a TOML job file.
    Run {
        /// Path to the job file.
        config: PathBuf,
        /// Output directory (overrides the job file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build the structure of a job file without solving it.
    Validate {
        /// Path to the job file.
        config: PathBuf,
    },
    /// List the available solvers.
    Solvers,
    /// List the built-in material catalog.
    Materials {
        /// Only entries whose book or long name contains this text.
        #[arg(long)]
        book: Option<String>,
        /// Only entries whose page contains this text.
        #[arg(long)]
        page: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Lamina Transfer-Matrix Solver");
            println!("=============================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_simulation(&job, config.parent())?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                runner::write_observables_csv(&result, &out_dir.join("observables.csv"), &job)?;
            }
            if job.output.save_json {
                runner::write_observables_json(&result, &out_dir.join("observables.json"))?;
            }

            println!("Simulation complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let setup = runner::build_setup(&job, config.parent())?;
            println!(
                "Configuration is valid: {} ({} layers, {} wavelengths)",
                config.display(),
                setup.structure.elementary_layer_count(),
                setup.wavelengths.len()
            );
            Ok(())
        }
        Commands::Solvers => {
            println!("Available solvers:");
            for kind in SolverKind::ALL {
                let solver = kind.solver(&Default::default());
                println!("  {:<12} — {}", kind.name(), solver.method_name());
            }
            Ok(())
        }
        Commands::Materials { book, page } => {
            let catalog = Catalog::builtin();
            let mut entries: Vec<&CatalogEntry> = match &book {
                Some(query) => catalog.search_book(query),
                None => catalog.entries().iter().collect(),
            };
            if let Some(query) = &page {
                let on_page = catalog.search_page(query);
                entries.retain(|e| on_page.iter().any(|p| std::ptr::eq(*p, *e)));
            }

            println!("Built-in catalog (reference as type = \"catalog\", book, page):");
            println!();
            if entries.is_empty() {
                println!("  (no matching entries)");
            }
            for entry in entries {
                let range = entry
                    .dispersion
                    .wavelength_range()
                    .map(|(lo, hi)| format!("{lo:.0}–{hi:.0} nm"))
                    .unwrap_or_else(|| "all wavelengths".into());
                println!(
                    "  {:<10} {:<10} — {}, {}",
                    entry.book, entry.page, entry.long_name, range
                );
            }
            Ok(())
        }
    }
}
