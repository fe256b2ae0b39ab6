// virtual-tryon - try clothes on before you buy them
//
// This is the main entry point. Parses CLI args and dispatches to handlers.

use anyhow::{anyhow, Context};
use base64::Engine as _;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use virtual_tryon_lib::{
    api::{ApiServer, Router},
    catalog::{Product, ProductFilter, RecommendationContext},
    session::{
        Capabilities, CaptureSession, GestureCommand, SyntheticMediaSource, TryOnSelection,
    },
    AppConfig, Catalog,
};

#[derive(Parser)]
#[command(name = "virtual-tryon", version, about = "Virtual try-on storefront")]
struct Cli {
    /// Config file (defaults to $TRYON_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the mock storefront API
    Serve {
        /// Listen address, overrides the config
        #[arg(long)]
        addr: Option<String>,
    },
    /// List products, optionally filtered
    Products {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, requires = "max_price")]
        min_price: Option<f64>,
        #[arg(long, requires = "min_price")]
        max_price: Option<f64>,
        /// Comma separated colour names
        #[arg(long, value_delimiter = ',')]
        colors: Vec<String>,
        /// Comma separated size names
        #[arg(long, value_delimiter = ',')]
        sizes: Vec<String>,
    },
    /// Show one product
    Product { id: String },
    /// Show recommended products
    Recommend {
        #[arg(long)]
        user: Option<String>,
    },
    /// Run a try-on session against a synthetic camera
    Session {
        /// Number of detection ticks to watch
        #[arg(long, default_value_t = 20)]
        ticks: u32,
        /// Pretend the user refused camera access
        #[arg(long)]
        deny: bool,
        /// Save a PNG snapshot here when done
        #[arg(long)]
        capture: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref()).map_err(|e| anyhow!(e.user_message()))?;

    match cli.command {
        Command::Serve { addr } => handle_serve(&cfg, addr).await,
        Command::Products {
            category,
            search,
            min_price,
            max_price,
            colors,
            sizes,
        } => {
            let mut filter = ProductFilter::default().colors(colors).sizes(sizes);
            if let Some(category) = category.filter(|c| c != "all") {
                filter = filter.category(category);
            }
            if let Some(search) = search {
                filter = filter.search(search);
            }
            if let (Some(min), Some(max)) = (min_price, max_price) {
                filter = filter.price_range(min, max);
            }
            handle_products(&cfg, filter).await
        }
        Command::Product { id } => handle_product(&cfg, &id).await,
        Command::Recommend { user } => handle_recommend(&cfg, user.as_deref()).await,
        Command::Session {
            ticks,
            deny,
            capture,
        } => handle_session(&cfg, ticks, deny, capture).await,
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            Ok(())
        }
    }
}

fn build_catalog(cfg: &AppConfig) -> anyhow::Result<Catalog> {
    cfg.catalog.build().context("failed to load catalog")
}

async fn handle_serve(cfg: &AppConfig, addr: Option<String>) -> anyhow::Result<()> {
    let catalog = build_catalog(cfg)?;
    let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());

    let server = ApiServer::bind(&addr, Router::new(catalog))
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    println!("Serving try-on API on http://{}", server.local_addr()?);
    println!("Press Ctrl+C to stop.");

    server
        .run_until(async {
            // a failed signal handler just means we run until killed
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

fn print_product_line(i: usize, product: &Product) {
    println!(
        "{:3}. [{}] {} - ${:.2} ({}, {:.1}★)",
        i + 1,
        product.id,
        product.name,
        product.price,
        product.category.name,
        product.rating
    );
}

async fn handle_products(cfg: &AppConfig, filter: ProductFilter) -> anyhow::Result<()> {
    let catalog = build_catalog(cfg)?;
    let products = catalog.query(Some(&filter)).await?;

    if products.is_empty() {
        println!("No products match.");
        return Ok(());
    }

    println!("\nFound {} product(s):", products.len());
    println!("{}", "=".repeat(60));
    for (i, product) in products.iter().enumerate() {
        print_product_line(i, product);
    }
    println!("{}", "=".repeat(60));

    Ok(())
}

async fn handle_product(cfg: &AppConfig, id: &str) -> anyhow::Result<()> {
    let catalog = build_catalog(cfg)?;

    match catalog.get_by_id(id).await? {
        Some(product) => println!("{}", serde_json::to_string_pretty(&product)?),
        None => eprintln!("Product not found: {}", id),
    }

    Ok(())
}

async fn handle_recommend(cfg: &AppConfig, user: Option<&str>) -> anyhow::Result<()> {
    let catalog = build_catalog(cfg)?;
    let picks = catalog
        .recommend(user, &RecommendationContext::default())
        .await?;

    println!("\nRecommended for {}:", user.unwrap_or("you"));
    println!("{}", "=".repeat(60));
    for (i, product) in picks.iter().enumerate() {
        print_product_line(i, product);
    }
    println!("{}", "=".repeat(60));

    Ok(())
}

async fn handle_session(
    cfg: &AppConfig,
    ticks: u32,
    deny: bool,
    capture: Option<PathBuf>,
) -> anyhow::Result<()> {
    let catalog = build_catalog(cfg)?;
    let recommendations = catalog
        .recommend(None, &RecommendationContext::default())
        .await?;

    let caps = if deny {
        Capabilities::with_media(Arc::new(SyntheticMediaSource::denying()))
    } else {
        Capabilities::synthetic()
    };
    let settings = cfg.session.settings();
    let interval = settings.detection_interval;
    let session = CaptureSession::new(caps, settings);

    println!("\nStarting try-on session...\n");

    if let Err(e) = session.initialize_engine().await {
        eprintln!("✗ {}", e.user_message());
    }

    if let Err(e) = session.request_permissions().await {
        eprintln!("✗ {}", e.user_message());
        return Ok(());
    }
    println!("✓ Camera streaming");

    let mut selection = TryOnSelection::default();
    if let Some(first) = recommendations.first() {
        selection.add(first.clone());
    }

    let detection = session.start_session().await?;
    let mut face_seen = false;

    for _ in 0..ticks {
        tokio::time::sleep(interval).await;

        let snapshot = session.snapshot();
        if let (Some(face), false) = (&snapshot.face_detection, face_seen) {
            face_seen = true;
            println!(
                "  Face: {:?} shape, {:?} skin tone ({:.0}% sure)",
                face.face_shape,
                face.skin_tone,
                face.confidence.value() * 100.0
            );
        }

        let Some(gesture) = snapshot.gesture_detection else {
            continue;
        };
        match GestureCommand::from_gesture(&gesture) {
            Some(GestureCommand::Instruction(hint)) => println!("  {:?}: {}", gesture.kind, hint),
            Some(command) => {
                if selection.apply(command, &recommendations) {
                    println!("  {:?}: now wearing {}", gesture.kind, describe(&selection));
                }
            }
            None => {}
        }
    }

    detection.cancel().await;

    if let Some(path) = capture {
        save_capture(&session, &path)?;
    }

    session.stop_stream();

    println!("\n{}", "=".repeat(60));
    println!("Trying on: {}", describe(&selection));
    println!("Total:     ${:.2}", selection.total_price());
    println!("{}", "=".repeat(60));

    Ok(())
}

fn describe(selection: &TryOnSelection) -> String {
    if selection.is_empty() {
        return "nothing".to_string();
    }
    selection
        .products()
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn save_capture(session: &CaptureSession, path: &Path) -> anyhow::Result<()> {
    let data_url = session
        .capture_frame()
        .ok_or_else(|| anyhow!("no frame available to capture"))?;
    let encoded = data_url
        .split_once(',')
        .map(|(_, data)| data)
        .ok_or_else(|| anyhow!("snapshot is not a data URL"))?;
    let png = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .context("snapshot is not valid base64")?;

    std::fs::write(path, png)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("✓ Snapshot saved to {}", path.display());
    Ok(())
}
