use maglev::{Maglev, SharedMaglev, DEFAULT_TABLE_SIZE};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use std::env;

// Try: RUST_LOG=maglev=debug MAGLEV_NODES=10.0.0.1:80,10.0.0.2:80 cargo run --example router
fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let nodes: Vec<String> = env::var("MAGLEV_NODES")
        .unwrap_or("backend1,backend2,backend3".to_string())
        .split(',')
        .map(str::trim)
        .filter(|node| !node.is_empty())
        .map(str::to_string)
        .collect();
    let table_size = env::var("MAGLEV_TABLE_SIZE")
        .ok()
        .and_then(|size| size.parse().ok())
        .unwrap_or(DEFAULT_TABLE_SIZE);

    let maglev = match Maglev::try_new(nodes, table_size) {
        Ok(maglev) => maglev,
        Err(e) => {
            eprintln!("refusing to start: {}", e);
            std::process::exit(1);
        }
    };
    let router = SharedMaglev::new(maglev);

    let keys = ["/users/1", "/users/2", "/orders/17", "/static/app.js"];
    for key in keys {
        match router.get(key) {
            Ok(node) => println!("{} -> {}", key, node),
            Err(e) => println!("{}: {}", key, e),
        }
    }

    let extra = "backend-extra";
    if let Err(e) = router.add_node(extra) {
        println!("could not add {}: {}", extra, e);
    }
    println!("after adding {}:", extra);
    for key in keys {
        match router.get(key) {
            Ok(node) => println!("{} -> {}", key, node),
            Err(e) => println!("{}: {}", key, e),
        }
    }

    let table = router.load();
    println!(
        "{} nodes, {} slots, slot counts {:?}",
        table.len(),
        table.table_size(),
        table.slot_counts()
    );
}
