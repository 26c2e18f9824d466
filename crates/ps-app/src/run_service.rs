//! Run execution service.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use ps_core::Timer;
use ps_project::schema::RunConfig;
use ps_results::Sample;
use ps_sim::{
    GaussianNoise, NoNoise, NoiseSource, Plant, PlantModel, SimProgress, SimResult,
    run_closed_loop_with_progress,
};

use crate::error::AppResult;
use crate::metrics::{ControlMetrics, StepMetrics, compute_control_metrics, compute_step_metrics};
use crate::progress::{RunProgressEvent, RunStage, SimulationProgress};
use crate::run_compile::{CompiledRun, compile_run};

/// Options for executing a run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions<'a> {
    /// Replaces the configured noise seed when set.
    pub seed_override: Option<u64>,
    /// Checked once per step; setting it abandons the run.
    pub cancel: Option<&'a AtomicBool>,
    /// Emit a simulation progress event every this many steps.
    pub progress_every: usize,
}

impl Default for RunOptions<'_> {
    fn default() -> Self {
        Self {
            seed_override: None,
            cancel: None,
            progress_every: 100,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub config: &'a RunConfig,
    pub options: RunOptions<'a>,
}

impl<'a> RunRequest<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            options: RunOptions::default(),
        }
    }
}

/// Concise timing and execution summary for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub simulate_time_s: f64,
    pub metrics_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub samples: Vec<Sample>,
    /// Setpoint the step metrics were measured against.
    pub metric_target: f64,
    pub metrics: StepMetrics,
    pub control_metrics: ControlMetrics,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    simulation: Option<SimulationProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            simulation,
        });
    }
}

/// Execute a run.
pub fn execute_run(request: &RunRequest) -> AppResult<RunResponse> {
    execute_run_with_progress(request, None)
}

/// Execute a run and stream progress events.
pub fn execute_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::CompilingRun,
        started,
        Some(format!("Compiling '{}'", request.config.name)),
        None,
    );
    let compile_timer = Timer::start("compile");
    let mut compiled = compile_run(request.config)?;
    if request.options.seed_override.is_some() {
        compiled.seed = request.options.seed_override;
    }
    timing.compile_time_s = compile_timer.stop();
    timing.steps = compiled.options.steps();

    tracing::info!(
        name = %request.config.name,
        plant = %compiled.plant.kind(),
        steps = timing.steps,
        noise_std = compiled.noise_std,
        seed = ?compiled.seed,
        "starting run"
    );

    let simulate_timer = Timer::start("simulate");
    let samples = {
        let every = request.options.progress_every.max(1);
        let cancel = request.options.cancel;
        let mut observer = |p: &SimProgress| {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return ControlFlow::Break(());
            }
            if p.step % every == 0 || p.step == p.steps {
                emit_progress(
                    &mut progress_cb,
                    RunStage::Simulating,
                    started,
                    None,
                    Some(SimulationProgress::from(p)),
                );
            }
            ControlFlow::Continue(())
        };
        simulate(&compiled, &mut observer)?
    };
    timing.simulate_time_s = simulate_timer.stop();

    emit_progress(
        &mut progress_cb,
        RunStage::ComputingMetrics,
        started,
        None,
        None,
    );
    let metrics_timer = Timer::start("metrics");
    let metric_target = compiled.metric_target();
    let metrics = compute_step_metrics(&samples, metric_target);
    let control_metrics = compute_control_metrics(&samples, compiled.controller.limits());
    timing.metrics_time_s = metrics_timer.stop();
    timing.total_time_s = started.elapsed().as_secs_f64();

    tracing::info!(
        samples = samples.len(),
        total_time_s = timing.total_time_s,
        "run finished"
    );
    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some(format!("{} samples", samples.len())),
        None,
    );

    Ok(RunResponse {
        samples,
        metric_target,
        metrics,
        control_metrics,
        timing,
    })
}

/// Dispatch on the plant variant once and run the monomorphized driver.
fn simulate(
    compiled: &CompiledRun,
    observer: &mut dyn FnMut(&SimProgress) -> ControlFlow<()>,
) -> SimResult<Vec<Sample>> {
    let mut noise: Box<dyn NoiseSource> = if compiled.noise_std > 0.0 {
        Box::new(GaussianNoise::new(compiled.seed))
    } else {
        Box::new(NoNoise)
    };

    match &compiled.plant {
        Plant::FirstOrderLag(p) => drive(p, compiled, noise.as_mut(), observer),
        Plant::MassSpringDamper(p) => drive(p, compiled, noise.as_mut(), observer),
        Plant::DcMotor(p) => drive(p, compiled, noise.as_mut(), observer),
    }
}

fn drive<P: PlantModel>(
    plant: &P,
    compiled: &CompiledRun,
    noise: &mut dyn NoiseSource,
    observer: &mut dyn FnMut(&SimProgress) -> ControlFlow<()>,
) -> SimResult<Vec<Sample>> {
    run_closed_loop_with_progress(
        plant,
        &compiled.controller,
        &compiled.reference,
        compiled.noise_std,
        noise,
        &compiled.options,
        observer,
    )
}
