//! Example of staging numeric values against a frozen registry.
//!
//! Initial guesses are written leaf by leaf, flattened into the vector a
//! solver would consume, and a solution vector is written back and read by
//! name.

use ndarray::array;
use varstruct_rs::structure::{Leaf, Mirror, Path, Registry, Shape, Symbol};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Numeric mirror example");
    println!("======================\n");

    let mut model = Registry::new();
    model.attach("gain", Leaf::scalar("k"))?;
    model.attach("weights", Leaf::symbolic("w", Shape::diagonal(3)?))?;

    let mut registry: Registry<Symbol> = Registry::new();
    registry.attach("x", Leaf::symbolic("x", Shape::column(2)?))?;
    registry.attach("model", model)?;
    registry.freeze()?;

    // 1. Initial guess
    let mut guess = Mirror::bind(&registry)?;
    guess.set(&Path::parse("x")?, &array![[1.0], [-1.0]])?;
    guess.fill(&Path::parse("model.weights")?, 0.5)?;
    guess.set_scalar(&Path::parse("model.gain")?, 2.0)?;

    println!("Nonzero vector: {}", guess.flatten_nonzero());
    println!("Dense vector:   {}", guess.flatten_dense());

    // 2. A solver result written back into structure
    let solution: Vec<f64> = (1..=registry.total_nnz()?).map(|k| k as f64 / 10.0).collect();
    let mut result = Mirror::bind(&registry)?;
    result.load_nonzero(&solution)?;

    println!("\nweights =\n{}", result.get(&Path::parse("model.weights")?)?);
    println!("w(2,2)  = {}", result.get(&Path::parse("model.weights(2,2)")?)?[[0, 0]]);

    // 3. Snapshot for later runs
    println!("\nSnapshot:\n{}", result.to_json()?);

    Ok(())
}
