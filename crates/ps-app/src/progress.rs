//! Progress events emitted while a run executes.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    CompilingRun,
    Simulating,
    ComputingMetrics,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::CompilingRun => "compiling",
            RunStage::Simulating => "simulating",
            RunStage::ComputingMetrics => "metrics",
            RunStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    pub sim_time_s: f64,
    pub t_end_s: f64,
    pub fraction_complete: f64,
    pub step: usize,
    pub steps: usize,
}

impl From<&ps_sim::SimProgress> for SimulationProgress {
    fn from(p: &ps_sim::SimProgress) -> Self {
        Self {
            sim_time_s: p.t,
            t_end_s: p.t_end,
            fraction_complete: p.fraction(),
            step: p.step,
            steps: p.steps,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub simulation: Option<SimulationProgress>,
}
