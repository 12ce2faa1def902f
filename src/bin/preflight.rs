use content_manager::infra::config;
use content_manager::ContentStore;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--no-init]\n\
         \n\
         Reads env vars (all optional):\n\
           DATABASE_URL, DB_MAX_CONNECTIONS, BIND_ADDR\n\
         \n\
         Opens the database, creates the schema unless --no-init is given,\n\
         and prints the row count of every table.\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let skip_init = args.iter().any(|a| a == "--no-init");

    // Force-read config (nice error messages if malformed)
    let database_url = config::database_url();
    let max_connections = config::max_connections()?;
    let bind_addr = config::bind_addr()?;

    println!("> Preflight:");
    println!("  DATABASE_URL={}", database_url);
    println!("  DB_MAX_CONNECTIONS={}", max_connections);
    println!("  BIND_ADDR={}", bind_addr);

    let store = ContentStore::open(&database_url, max_connections)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", database_url, e))?;
    store.ping().await?;
    println!("  Database reachable.");

    if skip_init {
        println!("  Skipping schema creation (--no-init).");
    } else {
        store.init().await?;
        println!("  Schema present (user, post, comment).");
    }

    let counts = store
        .counts()
        .await
        .map_err(|e| anyhow::anyhow!("Could not count rows (schema missing?): {}", e))?;
    println!("  users={} posts={} comments={}", counts.users, counts.posts, counts.comments);

    println!("> Preflight OK.");
    Ok(())
}
