//! Writes a chain of grouped records, reads it back and prints both sides.
//!
//! Usage: `cargo run --example roundtrip -- [COUNT] [--compress]`
//!
//! Set `RUST_LOG=tempest=trace` to see every decoded record.

use tempest::codec::{decode_graph, encode_graph, encode_graph_compressed};
use tempest::limits::DEFAULT_COMPRESSION_LEVEL;
use tempest::{Graph, GraphBuilder};
use tracing_subscriber::EnvFilter;

fn build_chain(count: usize) -> Graph {
    let mut builder = GraphBuilder::new();
    let mut prev = None;
    for i in 0..count {
        builder.instruction(format!("GROUP{}", i / 3));
        let key = builder.record(|r| {
            let r = r
                .attribute("message", format!("Message{}", i))
                .attribute("name", format!("Name{}", i));
            match prev {
                Some(p) => r.link("previous", p),
                None => r,
            }
        });
        prev = Some(key);
    }
    builder.build()
}

fn print_graph(graph: &Graph) {
    for record in graph.iter() {
        let r = record.record();
        let previous = r
            .link("previous")
            .and_then(|key| graph.get(key))
            .and_then(|p| p.attribute("name"))
            .unwrap_or("-");
        println!(
            "  [{}] {:<10} {:<12} previous={:<8} group={}",
            record.key().index(),
            r.attribute("name").unwrap_or("?"),
            r.attribute("message").unwrap_or("?"),
            previous,
            r.instruction().unwrap_or("-"),
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut count = 5;
    let mut compress = false;
    for arg in std::env::args().skip(1) {
        if arg == "--compress" {
            compress = true;
        } else {
            count = arg.parse().expect("COUNT must be a non-negative integer");
        }
    }

    let graph = build_chain(count);
    println!("=== Written ({} records) ===", graph.len());
    print_graph(&graph);

    let bytes = if compress {
        encode_graph_compressed(&graph, DEFAULT_COMPRESSION_LEVEL).expect("Failed to encode")
    } else {
        encode_graph(&graph).expect("Failed to encode")
    };
    println!("\n=== Document ({} bytes) ===", bytes.len());
    if compress {
        println!("  <zstd>");
    } else {
        println!("{}", String::from_utf8_lossy(&bytes));
    }

    let decoded = decode_graph(&bytes).expect("Failed to decode");
    println!("\n=== Read ({} records) ===", decoded.len());
    print_graph(&decoded);

    if decoded == graph {
        println!("\nRound trip OK");
    } else {
        println!("\nRound trip MISMATCH");
        std::process::exit(1);
    }
}
