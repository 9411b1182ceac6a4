use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
};
use std::time::Duration;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Ramping virtual-user profile: each entry is the target VU count for
/// one stage.
const STAGE_TARGETS: &[usize] = &[5, 15, 10, 0];

#[derive(Parser)]
#[command(name = "crustio-loadgen", about = "Login-and-order load generator")]
struct Cli {
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,

    #[arg(long, default_value = "d@jwt.com")]
    email: String,

    #[arg(long, default_value = "diner")]
    password: String,

    /// Seconds each ramp stage holds its VU target.
    #[arg(long, default_value = "30")]
    stage_secs: u64,

    /// Pizza factory endpoint for verifying order receipts.
    #[arg(long)]
    factory_url: Option<String>,
}

struct Scenario {
    base_url: String,
    email: String,
    password: String,
    factory_url: Option<String>,
}

#[derive(Default)]
struct Stats {
    requests: AtomicU64,
    request_failures: AtomicU64,
    orders_placed: AtomicU64,
    order_failures: AtomicU64,
}

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("crustio_loadgen=info".parse().expect("valid directive"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let scenario = Arc::new(Scenario {
        base_url: cli.base_url.trim_end_matches('/').to_string(),
        email: cli.email,
        password: cli.password,
        factory_url: cli.factory_url,
    });

    let stats = Arc::new(Stats::default());
    let target = Arc::new(AtomicUsize::new(0));
    let running = Arc::new(AtomicBool::new(true));
    let client = reqwest::Client::new();

    let peak = STAGE_TARGETS.iter().copied().max().unwrap_or(0);
    let mut handles = Vec::with_capacity(peak);
    for worker_id in 0..peak {
        let scenario = Arc::clone(&scenario);
        let stats = Arc::clone(&stats);
        let target = Arc::clone(&target);
        let running = Arc::clone(&running);
        let client = client.clone();

        handles.push(tokio::spawn(async move {
            worker(worker_id, scenario, client, target, running, stats).await;
        }));
    }

    for (stage, &vus) in STAGE_TARGETS.iter().enumerate() {
        target.store(vus, Ordering::SeqCst);
        info!(stage = stage + 1, virtual_users = vus, "load stage started");
        tokio::time::sleep(Duration::from_secs(cli.stage_secs)).await;
    }

    running.store(false, Ordering::SeqCst);
    for handle in handles {
        let _ = handle.await;
    }

    let requests = stats.requests.load(Ordering::SeqCst);
    let request_failures = stats.request_failures.load(Ordering::SeqCst);
    let orders_placed = stats.orders_placed.load(Ordering::SeqCst);
    let order_failures = stats.order_failures.load(Ordering::SeqCst);

    println!("requests:         {requests}");
    println!("request failures: {request_failures}");
    println!("orders placed:    {orders_placed}");
    println!("order failures:   {order_failures}");

    if orders_placed == 0 && order_failures > 0 {
        std::process::exit(1);
    }
}

async fn worker(
    id: usize,
    scenario: Arc<Scenario>,
    client: reqwest::Client,
    target: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
    stats: Arc<Stats>,
) {
    // Deterministic per-worker RNG so runs are reproducible.
    let mut rng = StdRng::seed_from_u64(1000 + id as u64);

    while running.load(Ordering::Relaxed) {
        if id >= target.load(Ordering::Relaxed) {
            tokio::time::sleep(Duration::from_millis(500)).await;
            continue;
        }

        login_and_order(&mut rng, &scenario, &client, &stats).await;
    }
}

async fn login_and_order(
    rng: &mut StdRng,
    scenario: &Scenario,
    client: &reqwest::Client,
    stats: &Stats,
) {
    let Some(login) = send_json(
        stats,
        client
            .put(format!("{}/api/auth", scenario.base_url))
            .json(&serde_json::json!({
                "email": scenario.email,
                "password": scenario.password,
            })),
    )
    .await
    else {
        think(rng).await;
        return;
    };
    let Some(token) = login["token"].as_str().map(str::to_string) else {
        debug!("login response carried no token");
        think(rng).await;
        return;
    };

    think(rng).await;

    let menu = send_json(
        stats,
        client.get(format!("{}/api/order/menu", scenario.base_url)),
    )
    .await;
    let franchises = send_json(
        stats,
        client.get(format!("{}/api/franchise", scenario.base_url)),
    )
    .await;

    let Some(order_body) = build_order(rng, menu.as_ref(), franchises.as_ref()) else {
        debug!("no menu items or stores available, skipping order");
        think(rng).await;
        return;
    };

    think(rng).await;

    let order = send_json(
        stats,
        client
            .post(format!("{}/api/order", scenario.base_url))
            .bearer_auth(&token)
            .json(&order_body),
    )
    .await;

    match order {
        Some(order) => {
            stats.orders_placed.fetch_add(1, Ordering::Relaxed);
            if let (Some(factory_url), Some(jwt)) =
                (scenario.factory_url.as_deref(), order["jwt"].as_str())
            {
                send_json(
                    stats,
                    client
                        .post(format!("{factory_url}/api/order/verify"))
                        .json(&serde_json::json!({ "jwt": jwt })),
                )
                .await;
            }
        }
        None => {
            stats.order_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    think(rng).await;
}

/// Picks one menu item and one franchise store out of the fetched lists.
fn build_order(
    rng: &mut StdRng,
    menu: Option<&serde_json::Value>,
    franchises: Option<&serde_json::Value>,
) -> Option<serde_json::Value> {
    let menu = menu?.as_array()?;
    let item = menu.get(rng.gen_range(0..menu.len().max(1)))?;

    let franchises = franchises?.as_array()?;
    let with_stores: Vec<&serde_json::Value> = franchises
        .iter()
        .filter(|franchise| {
            franchise["stores"]
                .as_array()
                .is_some_and(|stores| !stores.is_empty())
        })
        .collect();
    let franchise = with_stores.get(rng.gen_range(0..with_stores.len().max(1)))?;
    let stores = franchise["stores"].as_array()?;
    let store = stores.get(rng.gen_range(0..stores.len()))?;

    Some(serde_json::json!({
        "franchiseId": franchise["id"],
        "storeId": store["id"],
        "items": [{
            "menuId": item["id"],
            "description": item["description"],
            "price": item["price"],
        }],
    }))
}

async fn send_json(
    stats: &Stats,
    request: reqwest::RequestBuilder,
) -> Option<serde_json::Value> {
    stats.requests.fetch_add(1, Ordering::Relaxed);

    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            debug!(error = %err, "request failed");
            stats.request_failures.fetch_add(1, Ordering::Relaxed);
            return None;
        }
    };

    if !response.status().is_success() {
        debug!(status = %response.status(), "request rejected");
        stats.request_failures.fetch_add(1, Ordering::Relaxed);
        return None;
    }

    response.json().await.ok()
}

async fn think(rng: &mut StdRng) {
    let millis = rng.gen_range(500..=2500);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
