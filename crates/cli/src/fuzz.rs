//! Randomized load generator
//!
//! Each worker issues random, well-formed calls straight through the method
//! registry using server indices. Calls that end the session or the server
//! (`CLOSE_CONNECTION`, `CLOSE_SERVER`) and `DEBUG_PRINT` are never drawn.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use weightmap_core::{BorderPlacement, Result};
use weightmap_network::{MapService, SessionConfig, WeightMapClient};
use weightmap_protocol::{Arg, Opcode};

/// Grid bounds used to draw arguments
#[derive(Debug, Clone, Copy)]
pub struct MapBounds {
    pub width: i64,
    pub height: i64,
    pub min_weight: i64,
    pub max_weight: i64,
}

impl MapBounds {
    pub async fn query(client: &WeightMapClient) -> Result<Self> {
        Ok(Self {
            width: i64::from(client.get_width().await?).max(1),
            height: i64::from(client.get_height().await?).max(1),
            min_weight: i64::from(client.get_min_weight().await?),
            max_weight: i64::from(client.get_max_weight().await?),
        })
    }
}

/// Outcome counts for one worker
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerReport {
    pub worker: usize,
    pub ok: u64,
    pub remote_failures: u64,
    pub decode_errors: u64,
    /// Set when the worker stopped early on a fatal error
    pub aborted: Option<String>,
}

pub fn candidate_calls() -> Vec<Opcode> {
    Opcode::ALL
        .iter()
        .copied()
        .filter(|op| {
            !matches!(
                op,
                Opcode::CloseConnection | Opcode::CloseServer | Opcode::DebugPrint
            )
        })
        .collect()
}

fn point(rng: &mut StdRng, bounds: &MapBounds) -> (Arg, Arg) {
    (
        Arg::Int(rng.gen_range(0..bounds.width)),
        Arg::Int(rng.gen_range(0..bounds.height)),
    )
}

fn weight(rng: &mut StdRng, bounds: &MapBounds) -> Arg {
    let hi = bounds.max_weight.max(bounds.min_weight);
    Arg::Int(rng.gen_range(bounds.min_weight..=hi))
}

/// Draw one call with arguments valid for `bounds`
pub fn random_call(rng: &mut StdRng, calls: &[Opcode], bounds: &MapBounds) -> (Opcode, Vec<Arg>) {
    let opcode = *calls.choose(rng).unwrap_or(&Opcode::GetWidth);

    let args = match opcode {
        Opcode::AddBorder => {
            let place = *[
                BorderPlacement::TOP,
                BorderPlacement::BOTTOM,
                BorderPlacement::RIGHT,
                BorderPlacement::LEFT,
            ]
            .choose(rng)
            .unwrap_or(&BorderPlacement::TOP);
            let (x, y) = point(rng, bounds);
            let width = if place == BorderPlacement::LEFT || place == BorderPlacement::RIGHT {
                x
            } else {
                y
            };
            vec![width, weight(rng, bounds), Arg::Int(place.bits() as i64)]
        }
        Opcode::AddObstacle => {
            let (x, y) = point(rng, bounds);
            let radius = Arg::Int(rng.gen_range(0..bounds.width));
            vec![x, y, radius, weight(rng, bounds), Arg::Bool(rng.gen())]
        }
        Opcode::GetPath => {
            let (x1, y1) = point(rng, bounds);
            let (x2, y2) = point(rng, bounds);
            vec![x1, y1, x2, y2]
        }
        Opcode::SetWeight => {
            let (x, y) = point(rng, bounds);
            vec![x, y, weight(rng, bounds)]
        }
        Opcode::GetWeight | Opcode::SetPos | Opcode::PathTo => {
            let (x, y) = point(rng, bounds);
            vec![x, y]
        }
        Opcode::PathToLine => {
            let (x, y) = point(rng, bounds);
            vec![x, y, Arg::Int(rng.gen_range(0..bounds.width))]
        }
        Opcode::SetRollPitchYaw => (0..3)
            .map(|_| Arg::Float(rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI)))
            .collect(),
        _ => Vec::new(),
    };
    (opcode, args)
}

async fn run_worker(
    worker: usize,
    client: Arc<WeightMapClient>,
    bounds: MapBounds,
    calls: usize,
    seed: u64,
) -> WorkerReport {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));
    let candidates = candidate_calls();
    let mut report = WorkerReport {
        worker,
        ..Default::default()
    };

    for _ in 0..calls {
        let (opcode, args) = random_call(&mut rng, &candidates, &bounds);
        match client.invoke(opcode, &args).await {
            Ok(_) => report.ok += 1,
            Err(err) if err.is_fatal_to_session() || err.is_programming_error() => {
                warn!("Worker {} stopping after {}: {}", worker, opcode, err);
                report.aborted = Some(err.to_string());
                break;
            }
            Err(err) if err.is_decode_error() => {
                debug!("Worker {}: {} returned an undecodable payload: {}", worker, opcode, err);
                report.decode_errors += 1;
            }
            Err(err) => {
                debug!("Worker {}: {} failed: {}", worker, opcode, err);
                report.remote_failures += 1;
            }
        }
    }
    report
}

/// Run `workers` concurrent workers of `calls` random calls each
///
/// With `shared` every worker uses one session, exercising call
/// serialization; otherwise each worker opens its own connection.
pub async fn run(
    config: SessionConfig,
    workers: usize,
    calls: usize,
    shared: bool,
    seed: u64,
) -> Result<Vec<WorkerReport>> {
    let first = Arc::new(WeightMapClient::connect(config.clone()).await?);
    let bounds = MapBounds::query(&first).await?;
    info!(
        "Fuzzing {}x{} map with {} worker(s), {} call(s) each, seed {}",
        bounds.width, bounds.height, workers, calls, seed
    );

    let mut clients = vec![first.clone()];
    for _ in 1..workers {
        let client = if shared {
            first.clone()
        } else {
            Arc::new(WeightMapClient::connect(config.clone()).await?)
        };
        clients.push(client);
    }

    let handles: Vec<_> = clients
        .iter()
        .cloned()
        .enumerate()
        .map(|(worker, client)| tokio::spawn(run_worker(worker, client, bounds, calls, seed)))
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (worker, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(report) => reports.push(report),
            Err(e) => reports.push(WorkerReport {
                worker,
                aborted: Some(format!("worker task failed: {}", e)),
                ..Default::default()
            }),
        }
    }

    for client in clients.iter().take(if shared { 1 } else { workers }) {
        if let Err(e) = client.close().await {
            debug!("Closing fuzz session failed: {}", e);
        }
    }
    Ok(reports)
}
