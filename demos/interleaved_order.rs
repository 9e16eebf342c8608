//! Example of interleaving sibling lists in a registry layout.
//!
//! A shooting-style problem stores one state per interval and one control per
//! interval boundary. Interleaving keeps each state next to its control in the
//! flat vector, which keeps the sparsity pattern of the stage coupling banded.

use varstruct_rs::structure::{Leaf, OrderSpec, Registry, Shape, Symbol};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Interleaved order example");
    println!("=========================\n");

    let mut registry: Registry<Symbol> = Registry::new();
    registry.attach("t_final", Leaf::scalar("T"))?;

    let pair = Shape::column(2)?;
    let states: Vec<Leaf<Symbol>> = (0..4)
        .map(|k| Leaf::symbolic(&format!("x{}", k), pair.clone()))
        .collect();
    registry.attach("x", states)?;

    let controls: Vec<Leaf<Symbol>> = (0..3).map(|k| Leaf::scalar(&format!("u{}", k))).collect();
    registry.attach("u", controls)?;

    // Four states and three controls: only the last round is partial
    registry.set_order(OrderSpec::new().then("t_final").interleave(["x", "u"]))?;
    let layout = registry.freeze()?;

    println!("{} leaves, {} nonzeros", layout.leaves().len(), layout.total_nnz());
    for slot in layout.leaves() {
        println!(
            "  {:<8} {:<10} nnz offset {}",
            slot.path.to_string(),
            slot.shape.to_string(),
            slot.nnz_offset
        );
    }

    println!("\nFlat vector:");
    for (k, symbol) in registry.flatten_nonzero()?.iter().enumerate() {
        println!("  [{:2}] {:<6} <- {}", k, symbol, registry.reverse_lookup(k)?);
    }

    Ok(())
}
