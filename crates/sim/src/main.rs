mod sim;

use anyhow::{Context, Result};
use std::{env, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pump_engine::{config, FieldEngine};
use sim::{FieldSim, Scenario};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // ── Env config ──────────────────────────────────────────────────
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let sample_every_s: u64 = env::var("SAMPLE_EVERY_S")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);
    let scenario = Scenario::from_str_lossy(
        &env::var("SIM_SCENARIO").unwrap_or_else(|_| "drying".to_string()),
    );

    // ── Engine config ───────────────────────────────────────────────
    let cfg = config::load(&config_path).with_context(|| format!("loading {config_path}"))?;
    let settings = cfg.settings();
    let registry = cfg.registry();

    let mut fields: Vec<(String, String)> = cfg
        .fields
        .iter()
        .map(|f| (f.field_id.clone(), f.crop.clone()))
        .collect();
    if fields.is_empty() {
        warn!("no fields configured — simulating a single Tomatoes field");
        fields.push(("1".to_string(), "Tomatoes".to_string()));
    }

    info!(
        fields = fields.len(),
        %scenario,
        sample_every_s,
        predictive = settings.predictive,
        "sim started"
    );

    // ── One engine + simulator per field, each on its own task ──────
    let mut handles = Vec::new();
    for (field_id, crop) in fields {
        let mut engine = FieldEngine::new(&field_id, registry.clone(), settings.clone())
            .with_context(|| format!("building engine for field '{field_id}'"))?;
        let mut field_sim = FieldSim::new(scenario, &field_id, &crop);

        // The sim exists to watch the engine act, so run it in auto mode.
        engine.toggle_mode();

        let interval = Duration::from_secs(sample_every_s);
        handles.push(tokio::spawn(async move {
            run_field(engine, &mut field_sim, interval).await;
        }));
    }

    for handle in handles {
        handle.await?;
    }
    Ok(())
}

/// Drive one field: sample telemetry, evaluate, accrue usage, emit the
/// persistence record as a JSON line on stdout.
async fn run_field(mut engine: FieldEngine, field_sim: &mut FieldSim, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        let reading = field_sim.sample();
        match engine.evaluate(&reading) {
            Ok(decision) => {
                info!(
                    field = %engine.field_id(),
                    moisture = reading.soil_moisture,
                    action = %decision.action,
                    running = engine.state().running,
                    "evaluated"
                );
            }
            Err(e) => {
                error!(field = %engine.field_id(), "evaluation failed: {e}");
                continue;
            }
        }

        engine.tick(interval);
        field_sim.set_watering(engine.state().running);

        // Boundary record for the external persistence collaborator.
        match serde_json::to_string(&engine.persist_record()) {
            Ok(line) => println!("{line}"),
            Err(e) => error!(field = %engine.field_id(), "record serialization failed: {e}"),
        }
    }
}
