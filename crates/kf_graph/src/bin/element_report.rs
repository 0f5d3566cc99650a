use std::env;

use itertools::Itertools;

use kf_graph::PseudoknotResolver;
use kf_graph::StructureGraph;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let Some(notation) = env::args().nth(1) else {
        eprintln!("usage: element_report <notation>");
        eprintln!("example: element_report \"((.(...).(...)))\"");
        std::process::exit(1);
    };

    let resolver = PseudoknotResolver::new();
    let (graph, resolution) = StructureGraph::from_notation(&notation, &resolver)?;

    println!("length {}", graph.len());
    if !resolution.is_lossless() {
        println!(
            "removed {}",
            resolution.removed().to_vec().iter().map(|p| p.to_string()).join(" ")
        );
    }
    print!("{graph}");
    println!("notation {}", graph.to_notation());

    Ok(())
}
