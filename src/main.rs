use clap::Parser;
use tracing_subscriber::EnvFilter;

use pathfinding_compare::config::Config;
use pathfinding_compare::{preset_names, ComparisonReport, Evaluator, Result};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pathfinding_compare=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();

    if config.list_presets {
        for name in preset_names() {
            println!("{}", name);
        }
        return;
    }

    if let Err(e) = run(&config) {
        eprintln!("Comparison failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    let grid = config.build_grid()?;

    if !config.quiet {
        println!(
            "Grid: {}x{}, start {}, goal {}",
            grid.rows(),
            grid.cols(),
            grid.start(),
            grid.goal()
        );
        println!("Priority: {}", config.priority);
    }
    if config.show_grid {
        println!();
        print!("{}", grid);
    }

    let evaluator = Evaluator::new(config.evaluator_config())?;
    let evaluation = evaluator.evaluate(&grid, config.priority)?;

    if !config.quiet {
        println!();
        print!(
            "{}",
            ComparisonReport::new(&evaluation.results, evaluation.order)
        );
    }

    // Exits non-zero when every algorithm failed.
    let best = evaluation.best()?;
    if config.quiet {
        println!(
            "{}: cost {}, {} nodes explored, {:.2?}",
            best.algorithm, best.cost, best.explored_nodes, best.duration
        );
    }
    Ok(())
}
