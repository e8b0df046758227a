use clap::Parser;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use rbn_achem::chemistry::{Chemistry, RbnChemistry};
use rbn_achem::molecule::Molecule;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Seed of the first reactant.
    #[arg(value_name = "INT", default_value = "0")]
    first: u64,

    /// Seed of the second reactant.
    #[arg(value_name = "INT", default_value = "1")]
    second: u64,

    /// Nodes per atom.
    #[arg(short, value_name = "INT", default_value = "5")]
    n: usize,

    /// Inputs per node.
    #[arg(short, value_name = "INT", default_value = "2")]
    k: usize,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let chem = RbnChemistry::default();
    let a = Molecule::from_random(&mut ChaCha8Rng::seed_from_u64(args.first), args.n, args.k);
    let b = Molecule::from_random(&mut ChaCha8Rng::seed_from_u64(args.second), args.n, args.k);
    println!("a = {}", a);
    println!("b = {}", b);
    println!("a: {} bond sites, score {}", chem.bond_sites(&a, 0).len(), chem.score(&a, 0));
    println!("b: {} bond sites, score {}", chem.bond_sites(&b, 0).len(), chem.score(&b, 0));

    let reactions = chem.all_reactions(&[a, b])?;
    let mut counted: Vec<_> = reactions.into_iter().collect();
    counted.sort_by(|(r1, c1), (r2, c2)| c2.cmp(c1).then_with(|| r1.products[0].bonds().cmp(r2.products[0].bonds())));

    let total: usize = counted.iter().map(|(_, c)| c).sum();
    println!("{} distinct reactions, {} in total", counted.len(), total);
    for (reaction, count) in &counted {
        let product = &reaction.products[0];
        let fragments = chem.stabilize(product).len();
        println!("{:>4} x {:?} ({} fragments when stabilized)", count, product.bonds(), fragments);
    }

    Ok(())
}
