//! Operation of a histogram localizer in a simulated world.
//!
//! A robot senses the color of its cell and wanders randomly. Run with `RUST_LOG=debug` to follow each step.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use bayes_histogram::simulation::{Simulation, SimulationConfig};

const SCENARIO: &str = r#"
blurring = 0.12
p_hit = 5.0
world = [
    "RGGRGR",
    "GRRGGG",
    "RRGGRG",
    "GGGRRR",
    "RGRGGR",
]
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // We need random numbers, seeded so runs repeat
    let rng = StdRng::seed_from_u64(42);

    let config = SimulationConfig::from_toml_str(SCENARIO)?;
    let mut simulation = Simulation::from_config(&config, Box::new(rng))?;
    println!("World\n{}", simulation.world());

    for step in 1..=10 {
        simulation.run(1)?;
        let localization = simulation.localization();
        println!(
            "Step {} true {:?} best {:?} localized {:?}",
            step,
            simulation.true_pose(),
            localization.best,
            localization.localized
        );
    }
    println!("Beliefs\n{:.3}", simulation.beliefs());
    Ok(())
}
