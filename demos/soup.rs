use clap::Parser;
use color_eyre::eyre::eyre;
use log::{debug, info};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use rbn_achem::chemistry::{Chemistry, RbnChemistry, RbnChemistryConfig};
use rbn_achem::molecule::Molecule;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of distinct random molecules.
    #[arg(long, value_name = "INT", default_value = "10")]
    seeds: u64,

    /// Copies of each molecule in the initial population.
    #[arg(long, value_name = "INT", default_value = "10")]
    copies: usize,

    /// Number of successful reactions to run.
    #[arg(long, value_name = "INT", default_value = "10")]
    reactions: usize,

    /// Maximum number of collisions to attempt.
    #[arg(long, value_name = "INT", default_value = "100000")]
    collisions: usize,

    /// Seed for the collision sampler.
    #[arg(long, value_name = "INT", default_value = "42")]
    seed: u64,

    /// Nodes per atom.
    #[arg(short, value_name = "INT", default_value = "5")]
    n: usize,

    /// Inputs per node.
    #[arg(short, value_name = "INT", default_value = "2")]
    k: usize,

    /// Stabilize reaction products.
    #[arg(long)]
    stabilize: bool,

    /// Log level.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();
    let level: log::LevelFilter = args
        .log_level
        .parse()
        .map_err(|e| eyre!("bad log level {:?}: {}", args.log_level, e))?;

    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);

    let chem = RbnChemistry::new(RbnChemistryConfig::new().with_stabilize_products(args.stabilize));

    let mut population: Vec<Molecule> = Vec::new();
    for seed in 0..args.seeds {
        let mol = Molecule::from_random(&mut ChaCha8Rng::seed_from_u64(seed), args.n, args.k);
        debug!("seed {}: {}", seed, mol);
        population.extend(std::iter::repeat(mol).take(args.copies));
    }
    info!("Population of {} molecules", population.len());
    if population.len() < 2 {
        return Err(eyre!("population needs at least two molecules"));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut done = 0;
    let mut collisions = 0;
    while done < args.reactions && collisions < args.collisions {
        collisions += 1;
        let picked = rand::seq::index::sample(&mut rng, population.len(), 2);
        let (i, j) = (picked.index(0), picked.index(1));
        let reactants = [population[i].clone(), population[j].clone()];
        let Some(reaction) = chem.react(&reactants, &mut rng)? else {
            continue;
        };
        done += 1;
        println!("{}", reaction);

        // Remove the higher index first so the lower one stays valid
        population.swap_remove(i.max(j));
        population.swap_remove(i.min(j));
        population.extend(reaction.products);
    }

    let largest = population.iter().map(Molecule::len).max().unwrap_or(0);
    println!(
        "{} reactions in {} collisions, {} molecules, largest has {} atoms",
        done,
        collisions,
        population.len(),
        largest
    );

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
