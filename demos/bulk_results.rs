use taskmill::prelude::*;

fn main() {
    let config = Config::builder()
        .worker_count(4)
        .thread_name_prefix("bulk-demo")
        .build()
        .expect("Invalid config");

    let pool = WorkerPool::with_config(config).expect("Failed to build pool");

    println!("=== Bulk Results Example ===\n");

    let handles: Vec<_> = (0u64..1000)
        .map(|i| pool.submit(move || i * i))
        .collect();

    let total: u64 = handles
        .into_iter()
        .map(|h| h.wait().expect("task failed"))
        .sum();

    println!("Sum of squares 0..1000: {}", total);
    println!("Pending after drain: {}", pool.pending_tasks());

    println!("\n=== Example Complete ===");
}
