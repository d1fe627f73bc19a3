use taskmill::prelude::*;

fn main() {
    let pool = WorkerPool::new().expect("Failed to build pool");

    println!("=== Basic Submit Example ===\n");
    println!("Pool running {} workers", pool.worker_count());

    let sum = pool.submit(|| (1..=100).sum::<i64>());
    println!("Sum 1..=100: {}", sum.wait().unwrap());

    let text = pool.submit(|| "computed on a worker".to_string());
    println!("Text result: {}", text.wait().unwrap());

    let faulty = pool.submit(|| -> i32 { panic!("intentional failure") });
    println!("Faulty task: {:?}", faulty.wait());

    let snapshot = pool.metrics();
    println!(
        "\nSubmitted {} tasks, executed {}, {} panicked",
        snapshot.tasks_submitted, snapshot.tasks_executed, snapshot.tasks_panicked
    );

    println!("\n=== Example Complete ===");
}
