//! Accessory platform: lifecycle controller for one emulated device.
//!
//! The platform walks through `initialize → start → configure → shutdown`.
//! `start` creates and registers the device and its history store,
//! `configure` writes the baseline state and arms the tick timer, and
//! `shutdown` disarms the timer and closes the history store.
//!
//! The device state, the history store and the random source live together
//! in one `EmulatorCore` behind an async mutex shared by the timer task
//! and the command handlers, so a tick and a history dump never interleave.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;

use evesim_domain::device::DeviceKind;
use evesim_domain::error::{
    EmulatorError, InvalidTransitionError, StoreClosedError, UnsupportedHostVersionError,
};
use evesim_domain::history::HistoryEntry;
use evesim_domain::id::{DeviceHandle, PlatformId};
use evesim_domain::lifecycle::{LifecycleState, Transition};
use evesim_domain::reading::{DeviceState, Reading};
use evesim_domain::telemetry;
use evesim_domain::time::{self, Timestamp};

use crate::attribute_sync::{AttributeSync, BATTERY_PERCENT};
use crate::config::PlatformConfig;
use crate::history_store::HistoryStore;
use crate::ports::{Command, CommandFuture, CommandHandler, CommandRequest, HostPlatform};
use crate::timer::{self, TimerHandle};

/// Mutable emulation state shared between the timer and command handlers.
struct EmulatorCore<H> {
    host: Arc<H>,
    device: DeviceHandle,
    state: DeviceState,
    history: HistoryStore,
    rng: StdRng,
}

impl<H: HostPlatform> EmulatorCore<H> {
    /// Reset the device to its baseline and publish it.
    ///
    /// The history store, and with it the door opening count, is kept.
    async fn apply_baseline(&mut self) {
        self.state = DeviceState::baseline(self.state.kind());

        let reading = self.state.as_reading();
        if let Err(err) = AttributeSync::new(self.host.as_ref(), self.device)
            .write_attributes(&reading)
            .await
        {
            tracing::error!(device = %self.device, error = %err, "failed to write baseline state");
        }
        log_reading(&reading);
    }

    /// One emulation step: derive, publish, record.
    async fn tick(&mut self) {
        match self.step(time::now()).await {
            Ok(reading) => log_reading(&reading),
            Err(err) => {
                tracing::warn!(device = %self.device, error = %err, "tick abandoned");
            }
        }
    }

    async fn step(&mut self, now: Timestamp) -> Result<Reading, StoreClosedError> {
        if self.history.is_closed() {
            return Err(StoreClosedError {
                store: self.history.name().to_string(),
            });
        }

        let (next, reading) = telemetry::next_reading(&self.state, &mut self.rng);

        // Host failures are reported but do not stop the emulation.
        if let Err(err) = AttributeSync::new(self.host.as_ref(), self.device)
            .write_reading(&reading)
            .await
        {
            tracing::error!(device = %self.device, error = %err, "failed to publish reading");
        }

        self.history
            .add_entry(HistoryEntry::from_reading(now, &reading))?;
        if let Reading::Door { opened: true, .. } = reading {
            self.history.add_to_times_opened();
        }
        self.history.set_last_event(now);
        self.state = next;
        Ok(reading)
    }
}

fn log_reading(reading: &Reading) {
    match *reading {
        Reading::Motion {
            occupied,
            lux,
            illuminance,
        } => {
            tracing::info!(illuminance, "Set motion to {occupied} and lux to {lux:.2}");
        }
        Reading::Door { contact, .. } => tracing::info!("Set contact to {contact}"),
    }
}

/// Handler shared by `identify` and `triggerEffect`: logs the request and
/// dumps the recent history.
fn history_dump_handler<H>(core: &SharedCore<H>) -> CommandHandler
where
    H: HostPlatform + 'static,
{
    let core = Arc::clone(core);
    Arc::new(move |request: CommandRequest| -> CommandFuture {
        let core = Arc::clone(&core);
        Box::pin(async move {
            match request {
                CommandRequest::Identify { identify_time } => {
                    tracing::info!("Command identify called identifyTime: {identify_time}");
                }
                CommandRequest::TriggerEffect {
                    effect_identifier,
                    effect_variant,
                } => {
                    tracing::info!(
                        "Command triggerEffect called effect {effect_identifier} variant {effect_variant}"
                    );
                }
            }
            core.lock().await.history.log_history(false);
        })
    })
}

type SharedCore<H> = Arc<Mutex<EmulatorCore<H>>>;

/// Lifecycle controller for one emulated accessory.
pub struct AccessoryPlatform<H> {
    id: PlatformId,
    host: Arc<H>,
    kind: DeviceKind,
    config: PlatformConfig,
    state: LifecycleState,
    device: Option<DeviceHandle>,
    core: Option<SharedCore<H>>,
    timer: Option<TimerHandle>,
}

impl<H: HostPlatform + 'static> AccessoryPlatform<H> {
    /// Build an uninitialized platform. Nothing touches the host yet.
    pub fn new(host: Arc<H>, kind: DeviceKind, config: PlatformConfig) -> Self {
        Self {
            id: PlatformId::new(),
            host,
            kind,
            config,
            state: LifecycleState::Uninitialized,
            device: None,
            core: None,
            timer: None,
        }
    }

    /// Check that the host is recent enough to run this accessory.
    ///
    /// On failure the platform stays uninitialized and the host is untouched.
    ///
    /// # Errors
    ///
    /// - [`EmulatorError::UnsupportedHostVersion`] if the host is older than
    ///   `minimum` or reports an unreadable version.
    /// - [`EmulatorError::InvalidTransition`] if already initialized.
    pub fn initialize(&mut self, minimum: &str) -> Result<(), EmulatorError> {
        let next = self.state.apply(Transition::Initialize)?;
        if !self.host.verify(minimum) {
            return Err(UnsupportedHostVersionError {
                current: self.host.current_version().to_string(),
                minimum: minimum.to_string(),
            }
            .into());
        }

        tracing::info!(
            platform = %self.id,
            kind = %self.kind,
            host_version = self.host.current_version(),
            "Initializing platform: {}",
            self.config.display_name(self.kind)
        );
        self.state = next;
        Ok(())
    }

    /// Create the device, register it with the host and wire its commands.
    ///
    /// Either every step succeeds or the host is left without any device of
    /// this platform and `start` may be retried.
    ///
    /// # Errors
    ///
    /// - [`EmulatorError::InvalidTransition`] unless freshly initialized.
    /// - [`EmulatorError::Adapter`] if the host refuses the device.
    #[tracing::instrument(skip(self), fields(platform = %self.id, kind = %self.kind))]
    pub async fn start(&mut self, reason: Option<&str>) -> Result<(), EmulatorError> {
        let next = self.state.apply(Transition::Start)?;
        tracing::info!("onStart called with reason: {}", reason.unwrap_or("none"));

        let name = self.config.display_name(self.kind);
        let identity = self.kind.identity().with_name(name.clone());
        let history = HistoryStore::new(name, self.config.history_capacity)
            .with_debug(self.config.debug);

        let device = self.host.create_device(self.id, self.kind, &identity)?;
        let core = match self.attach(device, history).await {
            Ok(core) => core,
            Err(err) => {
                tracing::warn!(%device, error = %err, "start failed, releasing device");
                self.release_devices().await;
                return Err(err);
            }
        };

        tracing::debug!(%device, "device registered");
        self.device = Some(device);
        self.core = Some(core);
        self.state = next;
        Ok(())
    }

    /// Register `device`, publish its battery level and install the command
    /// handlers.
    async fn attach(
        &self,
        device: DeviceHandle,
        history: HistoryStore,
    ) -> Result<SharedCore<H>, EmulatorError> {
        self.host.register_device(device).await?;

        if let Err(err) = AttributeSync::new(self.host.as_ref(), device)
            .write_battery(BATTERY_PERCENT)
            .await
        {
            tracing::error!(%device, error = %err, "failed to write battery level");
        }

        let rng = match self.config.seed {
            0 => StdRng::from_entropy(),
            seed => StdRng::seed_from_u64(seed),
        };
        let core = Arc::new(Mutex::new(EmulatorCore {
            host: Arc::clone(&self.host),
            device,
            state: DeviceState::baseline(self.kind),
            history,
            rng,
        }));

        for command in [Command::Identify, Command::TriggerEffect] {
            self.host
                .add_command_handler(device, command, history_dump_handler(&core))?;
        }
        Ok(core)
    }

    async fn release_devices(&self) {
        if let Err(err) = self.host.unregister_all_devices(self.id).await {
            tracing::error!(error = %err, "failed to unregister devices");
        }
    }

    /// Publish the baseline state and arm the tick timer.
    ///
    /// Calling it again re-arms the timer; at most one timer is ever armed.
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::InvalidTransition`] before `start` or after
    /// `shutdown`.
    #[tracing::instrument(skip(self), fields(platform = %self.id, kind = %self.kind))]
    pub async fn configure(&mut self) -> Result<(), EmulatorError> {
        let next = self.state.apply(Transition::Configure)?;
        let Some(core) = self.core.as_ref().map(Arc::clone) else {
            return Err(InvalidTransitionError {
                from: self.state,
                operation: Transition::Configure.name(),
            }
            .into());
        };
        tracing::info!("onConfigure called");

        if let Some(previous) = self.timer.take() {
            tracing::debug!("re-arming tick timer");
            previous.disarm().await;
        }

        core.lock().await.apply_baseline().await;

        let ticker = Arc::clone(&core);
        self.timer = Some(timer::arm(self.kind.tick_period(), move || {
            let core = Arc::clone(&ticker);
            async move { core.lock().await.tick().await }
        }));
        self.state = next;
        Ok(())
    }

    /// Stop the emulation. Safe to call in any state, and more than once.
    ///
    /// Disarms the timer (letting an in-flight tick finish), closes the
    /// history store and, if configured, unregisters this platform's device.
    #[tracing::instrument(skip(self), fields(platform = %self.id, kind = %self.kind))]
    pub async fn shutdown(&mut self, reason: Option<&str>) {
        if self.state == LifecycleState::Stopped {
            tracing::debug!("already stopped");
            return;
        }
        tracing::info!("onShutdown called with reason: {}", reason.unwrap_or("none"));
        if let Ok(next) = self.state.apply(Transition::Shutdown) {
            self.state = next;
        }

        if let Some(timer) = self.timer.take() {
            timer.disarm().await;
        }

        if let Some(core) = &self.core {
            core.lock().await.history.close();
        }
        if self.config.unregister_on_shutdown && self.device.is_some() {
            self.release_devices().await;
        }

        self.state = LifecycleState::Stopped;
    }

    // ── Queries ────────────────────────────────────────────────────

    #[must_use]
    pub fn id(&self) -> PlatformId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    #[must_use]
    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Host handle of the device, once started.
    #[must_use]
    pub fn device(&self) -> Option<DeviceHandle> {
        self.device
    }

    pub async fn device_state(&self) -> Option<DeviceState> {
        match &self.core {
            Some(core) => Some(core.lock().await.state),
            None => None,
        }
    }

    /// Snapshot of the recorded history, oldest first.
    pub async fn history_entries(&self) -> Vec<HistoryEntry> {
        match &self.core {
            Some(core) => core.lock().await.history.entries().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Dump the history to the log and return it.
    pub async fn history_dump(&self, verbose: bool) -> Option<String> {
        match &self.core {
            Some(core) => Some(core.lock().await.history.log_history(verbose)),
            None => None,
        }
    }

    pub async fn last_event(&self) -> Option<Timestamp> {
        match &self.core {
            Some(core) => core.lock().await.history.last_event(),
            None => None,
        }
    }

    /// Door openings recorded since start.
    pub async fn times_opened(&self) -> u32 {
        match &self.core {
            Some(core) => core.lock().await.history.times_opened(),
            None => 0,
        }
    }
}
