//! Timer-driven run loop around a [`Simulation`].
//!
//! A [`Scheduler`] is a tokio task that exclusively owns the simulation.
//! Commands arrive over an mpsc channel and every state change is published
//! as a [`SimulationSnapshot`] on a watch channel. While running, the next
//! cycle is a single pending deadline; pausing or resetting clears it, so a
//! stale cycle can never fire against reset state.

use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, info};

use crate::{
    Error, Result,
    grid::{CellKind, Location},
    simulation::{CycleReport, Phase, Simulation, SimulationParams, SimulationSnapshot},
};

const COMMAND_BUFFER: usize = 64;

#[derive(Debug)]
enum Command {
    Run,
    Pause,
    Step {
        reply: oneshot::Sender<Option<CycleReport>>,
    },
    Reset,
    SetDelay(Duration),
    SetParams {
        params: SimulationParams,
        reply: oneshot::Sender<Result<()>>,
    },
    Place {
        kind: CellKind,
        location: Location,
        reply: oneshot::Sender<Result<()>>,
    },
    ToggleWeather,
    Shutdown,
}

/// Actor state; lives inside the spawned task.
pub struct Scheduler {
    simulation: Simulation,
    delay: Duration,
    deadline: Option<Instant>,
    snapshots: watch::Sender<SimulationSnapshot>,
}

/// Client side of a running [`Scheduler`].
#[derive(Debug)]
pub struct SchedulerHandle {
    commands: mpsc::Sender<Command>,
    updates: watch::Receiver<SimulationSnapshot>,
    task: JoinHandle<Simulation>,
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl Scheduler {
    /// Move `simulation` into a new task and return its handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(simulation: Simulation) -> SchedulerHandle {
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let (snapshots, updates) = watch::channel(simulation.snapshot());
        let scheduler = Scheduler {
            delay: simulation.params().step_delay(),
            simulation,
            deadline: None,
            snapshots,
        };
        let task = tokio::spawn(scheduler.run(inbox));
        SchedulerHandle {
            commands,
            updates,
            task,
        }
    }

    async fn run(mut self, mut inbox: mpsc::Receiver<Command>) -> Simulation {
        info!(delay = ?self.delay, "scheduler started");
        loop {
            // Commands win over a due deadline so a pause is never overtaken.
            tokio::select! {
                biased;
                command = inbox.recv() => match command {
                    Some(command) => {
                        if !self.handle(command) {
                            break;
                        }
                    }
                    None => break,
                },
                () = wait_for(self.deadline) => self.tick(),
            }
        }
        self.deadline = None;
        info!(cycles = self.simulation.cycle(), "scheduler stopped");
        self.simulation
    }

    fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    fn schedule_next(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
        self.simulation.set_phase(Phase::Scheduled);
    }

    fn stop(&mut self) {
        self.deadline = None;
        let phase = if self.simulation.cycle() == 0 {
            Phase::Idle
        } else {
            Phase::Paused
        };
        self.simulation.set_phase(phase);
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.simulation.snapshot());
    }

    fn tick(&mut self) {
        let report = self.simulation.step();
        debug!(cycle = report.cycle, "scheduled cycle");
        self.schedule_next();
        self.publish();
    }

    /// Apply one command; `false` once the actor should stop.
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Run => {
                if !self.is_running() {
                    info!("run");
                    self.schedule_next();
                }
            }
            Command::Pause => {
                if self.is_running() {
                    info!(cycle = self.simulation.cycle(), "pause");
                }
                self.stop();
            }
            Command::Step { reply } => {
                let report = if self.is_running() {
                    debug!("step ignored while running");
                    None
                } else {
                    Some(self.simulation.step())
                };
                let _ = reply.send(report);
            }
            Command::Reset => {
                self.deadline = None;
                self.simulation.reset();
            }
            Command::SetDelay(delay) => {
                self.delay = delay;
            }
            Command::SetParams { params, reply } => {
                let delay = params.step_delay();
                let result = self.simulation.set_params(params);
                if result.is_ok() {
                    self.delay = delay;
                }
                let _ = reply.send(result);
            }
            Command::Place {
                kind,
                location,
                reply,
            } => {
                let _ = reply.send(self.simulation.place(kind, location));
            }
            Command::ToggleWeather => {
                self.simulation.toggle_weather();
            }
            Command::Shutdown => return false,
        }
        self.publish();
        true
    }
}

impl SchedulerHandle {
    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::SchedulerClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.send(command(reply)).await?;
        response.await.map_err(|_| Error::SchedulerClosed)
    }

    /// Start scheduling cycles; the first one fires after the step delay.
    pub async fn run(&self) -> Result<()> {
        self.send(Command::Run).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(Command::Pause).await
    }

    /// One synchronous cycle; `None` while the scheduler is running.
    pub async fn step(&self) -> Result<Option<CycleReport>> {
        self.request(|reply| Command::Step { reply }).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(Command::Reset).await
    }

    pub async fn set_delay(&self, delay: Duration) -> Result<()> {
        self.send(Command::SetDelay(delay)).await
    }

    pub async fn set_params(&self, params: SimulationParams) -> Result<()> {
        self.request(|reply| Command::SetParams { params, reply })
            .await?
    }

    pub async fn place(&self, kind: CellKind, location: Location) -> Result<()> {
        self.request(|reply| Command::Place {
            kind,
            location,
            reply,
        })
        .await?
    }

    pub async fn toggle_weather(&self) -> Result<()> {
        self.send(Command::ToggleWeather).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SimulationSnapshot {
        self.updates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SimulationSnapshot> {
        self.updates.clone()
    }

    /// Stop the actor and take the simulation back.
    pub async fn shutdown(self) -> Result<Simulation> {
        self.send(Command::Shutdown).await?;
        self.task.await.map_err(|_| Error::SchedulerClosed)
    }
}
