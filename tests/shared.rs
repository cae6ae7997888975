use std::sync::Arc;

use maglev::{Maglev, SharedMaglev};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_see_consistent_tables_during_updates() {
    let shared = Arc::new(SharedMaglev::new(Maglev::new(
        vec!["backend1", "backend2", "backend3"],
        1021,
    )));

    let readers: Vec<_> = (0..4)
        .map(|reader| {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                for i in 0..2_000 {
                    let key = format!("reader-{}-key-{}", reader, i);
                    let snapshot = shared.load();

                    // Whatever table a reader picks up, it is fully built and self-consistent.
                    let owner = snapshot.get(&key).unwrap();
                    assert!(snapshot.contains(owner));
                    assert_eq!(snapshot.get(&key).unwrap(), owner);
                    assert_eq!(snapshot.slot_counts().iter().sum::<usize>(), 1021);

                    if i % 100 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        })
        .collect();

    let writer = {
        let shared = Arc::clone(&shared);
        tokio::spawn(async move {
            for round in 0..20 {
                let node = format!("extra{}", round);
                shared.add_node(&node).unwrap();
                tokio::task::yield_now().await;
                shared.remove_node(&node).unwrap();
            }
        })
    };

    for reader in readers {
        reader.await.unwrap();
    }
    writer.await.unwrap();

    let table = shared.load();
    assert_eq!(table.nodes(), &["backend1", "backend2", "backend3"]);
    assert_eq!(
        table.lookup_table(),
        Maglev::new(vec!["backend1", "backend2", "backend3"], 1021).lookup_table()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_do_not_lose_updates() {
    let shared = Arc::new(SharedMaglev::new(Maglev::new(Vec::<String>::new(), 251)));

    let writers: Vec<_> = (0..8)
        .map(|writer| {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                for i in 0..10 {
                    shared.add_node(format!("w{}-n{}", writer, i)).unwrap();
                }
            })
        })
        .collect();

    for writer in writers {
        writer.await.unwrap();
    }

    let table = shared.load();
    assert_eq!(table.len(), 80);
    assert!(table.spread() <= 1);
}
