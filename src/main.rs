use evoforge::config::{ConfigManager, EngineBuilder, Representation};
use evoforge::engines::evaluation::DirectScorer;
use evoforge::genome::{ArrayGenome, DoubleArrayGenome, Genome, IntegerArrayGenome};
use log::info;
use std::sync::Arc;

fn allele_sum_int(genome: &IntegerArrayGenome) -> anyhow::Result<f64> {
    Ok(genome.iter().sum::<i64>() as f64)
}

fn allele_sum_real(genome: &DoubleArrayGenome) -> anyhow::Result<f64> {
    Ok(genome.iter().sum())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--manifest") => {
            println!("{}", serde_json::to_string_pretty(&manager.get().manifests())?);
            return Ok(());
        }
        Some(path) => manager.load_from_file(path)?,
        None => info!("No config file given; using defaults"),
    }

    let builder = EngineBuilder::new(manager.get())?;
    match builder.config().evolution.representation {
        Representation::Real => {
            let mut engine = builder.build_real(Arc::new(DirectScorer::new(allele_sum_real)))?;
            engine.run()?;
            if let Some(best) = engine.best_genome() {
                info!("Best genome (score {}): {:?}", best.score(), best.alleles());
            }
        }
        Representation::Integer | Representation::Permutation => {
            let mut engine = builder.build_integer(Arc::new(DirectScorer::new(allele_sum_int)))?;
            engine.run()?;
            if let Some(best) = engine.best_genome() {
                info!("Best genome (score {}): {:?}", best.score(), best.alleles());
            }
        }
    }

    Ok(())
}
