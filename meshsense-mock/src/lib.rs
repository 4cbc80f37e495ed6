use std::time::Duration;

use meshsense_api::{ManualClock, TimeProvider};
use tokio::sync::mpsc;
use tokio::time;

use crate::deployment::{Deployment, Snapshot};
use crate::error::SimulationError;
use crate::link::SimulatedAir;
use crate::settings::Settings;
use crate::simulate::Environment;

pub mod deployment;
pub mod error;
pub mod link;
pub mod settings;
pub mod simulate;

/// Runs the deployment in simulated time, paced against the wall clock by
/// `simulation.speed`. Returns once `simulation.duration_ms` has elapsed, or
/// never when no duration is set.
pub async fn run(settings: &Settings) -> Result<(), SimulationError> {
    let simulation = &settings.simulation;
    let clock = ManualClock::new(0);
    let mut environment = Environment::new(simulation.scenario.clone());

    let air = SimulatedAir::new(&settings.network, &settings.link.loss);
    let mut deployment = Deployment::new(settings, air, &environment.sample(0))?;

    let (snapshot_tx, snapshot_rx) = mpsc::channel(16);
    let reporter = tokio::spawn(report_snapshots(snapshot_rx));

    let period = Duration::from_micros(simulation.tick_ms * 1000 / simulation.speed)
        .max(Duration::from_micros(1));
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    let mut next_snapshot = simulation.snapshot_interval_ms;

    tracing::info!(
        "Simulation started: tick {} ms, speed x{}",
        simulation.tick_ms,
        simulation.speed
    );

    loop {
        interval.tick().await;
        clock.advance(simulation.tick_ms);
        let now = clock.uptime_ms();

        let readings = environment.sample(now);
        deployment.step(now, &readings);

        if simulation.snapshot_interval_ms > 0 && now >= next_snapshot {
            next_snapshot += simulation.snapshot_interval_ms;
            if snapshot_tx.send(deployment.snapshot(now)).await.is_err() {
                tracing::warn!("Snapshot reporter stopped");
            }
        }

        if simulation.duration_ms.is_some_and(|duration| now >= duration) {
            break;
        }
    }

    snapshot_tx
        .send(deployment.snapshot(clock.uptime_ms()))
        .await
        .ok();
    drop(snapshot_tx);

    match reporter.await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!("Snapshot reporter failed: {}", err);
            Ok(())
        }
    }
}

async fn report_snapshots(mut snapshot_rx: mpsc::Receiver<Snapshot>) -> Result<(), SimulationError> {
    while let Some(snapshot) = snapshot_rx.recv().await {
        let labels = snapshot
            .labels
            .iter()
            .map(|(role, label)| format!("{role}: {label}"))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!("[{} ms] {}", snapshot.uptime_ms, labels);

        println!("{}", serde_json::to_string(&snapshot)?);
    }
    Ok(())
}
