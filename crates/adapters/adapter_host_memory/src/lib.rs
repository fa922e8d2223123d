//! # evesim-adapter-host-memory
//!
//! In-process implementation of the host port. Devices, their cluster
//! attributes, raised events and command handlers are all kept in memory,
//! which makes it suitable for the daemon's standalone mode and for tests.
//!
//! | Capability | Behaviour |
//! |------------|-----------|
//! | Devices | Created per kind on behalf of an owning platform, unregistered per owner |
//! | Attributes | Last written value per `(cluster, attribute)`, plus a bounded write log |
//! | Events | Appended to a bounded event log |
//! | Commands | Dispatched to registered handlers via [`InMemoryHost::execute_command`] |
//! | Failures | [`InMemoryHost::set_fail_writes`] makes every attribute write fail |
//!
//! ## Dependency rule
//!
//! Depends on `evesim-app` (port traits) and `evesim-domain` only.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use evesim_app::ports::{Command, CommandHandler, CommandRequest, HostPlatform, VersionGate};
use evesim_domain::cluster::{AttributeValue, ClusterId};
use evesim_domain::device::{DeviceIdentity, DeviceKind};
use evesim_domain::error::AdapterError;
use evesim_domain::id::{DeviceHandle, PlatformId};

/// Entries kept in each of the write and event logs unless configured
/// otherwise. The oldest entries are evicted first.
pub const DEFAULT_LOG_CAPACITY: NonZeroUsize = match NonZeroUsize::new(4096) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// One recorded attribute write.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeWrite {
    pub device: DeviceHandle,
    pub cluster: ClusterId,
    pub attribute: String,
    pub value: AttributeValue,
}

/// One event raised on a device cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    pub device: DeviceHandle,
    pub cluster: ClusterId,
    pub event: String,
    pub payload: serde_json::Value,
}

/// Public view of a device known to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub handle: DeviceHandle,
    pub owner: PlatformId,
    pub kind: DeviceKind,
    pub identity: DeviceIdentity,
    pub registered: bool,
}

struct DeviceRecord {
    owner: PlatformId,
    kind: DeviceKind,
    identity: DeviceIdentity,
    registered: bool,
    attributes: HashMap<(ClusterId, String), AttributeValue>,
    handlers: HashMap<Command, CommandHandler>,
}

struct HostState {
    devices: HashMap<DeviceHandle, DeviceRecord>,
    order: Vec<DeviceHandle>,
    log_capacity: usize,
    writes: VecDeque<AttributeWrite>,
    events: VecDeque<HostEvent>,
}

impl HostState {
    fn new(log_capacity: NonZeroUsize) -> Self {
        Self {
            devices: HashMap::new(),
            order: Vec::new(),
            log_capacity: log_capacity.get(),
            writes: VecDeque::new(),
            events: VecDeque::new(),
        }
    }

    fn device_mut(&mut self, handle: DeviceHandle) -> Result<&mut DeviceRecord, AdapterError> {
        self.devices
            .get_mut(&handle)
            .ok_or(AdapterError::UnknownDevice(handle))
    }
}

fn push_bounded<T>(log: &mut VecDeque<T>, entry: T, capacity: usize) {
    if log.len() == capacity {
        log.pop_front();
    }
    log.push_back(entry);
}

/// Host platform living entirely in process memory.
pub struct InMemoryHost {
    version: String,
    state: Mutex<HostState>,
    fail_writes: AtomicBool,
}

impl InMemoryHost {
    /// A host reporting `version` with no devices.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            state: Mutex::new(HostState::new(DEFAULT_LOG_CAPACITY)),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Keep at most `capacity` entries in each of the write and event logs.
    ///
    /// Entries already logged beyond the new capacity are evicted.
    #[must_use]
    pub fn with_log_capacity(self, capacity: NonZeroUsize) -> Self {
        {
            let mut state = self.lock();
            state.log_capacity = capacity.get();
            let excess = state.writes.len().saturating_sub(capacity.get());
            state.writes.drain(..excess);
            let excess = state.events.len().saturating_sub(capacity.get());
            state.events.drain(..excess);
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent attribute write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Invoke the handler registered for `request`'s command on `device`,
    /// the way a controller on the network would.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::UnknownDevice`] if `device` was never created.
    /// - [`AdapterError::Rejected`] if no handler is registered.
    pub async fn execute_command(
        &self,
        device: DeviceHandle,
        request: CommandRequest,
    ) -> Result<(), AdapterError> {
        let command = request.command();
        let handler = {
            let mut state = self.lock();
            let record = state.device_mut(device)?;
            record.handlers.get(&command).cloned().ok_or_else(|| {
                AdapterError::Rejected(format!("no {command} handler on device {device}"))
            })?
        };

        tracing::debug!(%device, %command, "executing command");
        handler(request).await;
        Ok(())
    }

    /// Logged attribute writes, oldest first.
    #[must_use]
    pub fn attribute_writes(&self) -> Vec<AttributeWrite> {
        self.lock().writes.iter().cloned().collect()
    }

    /// Logged events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        self.lock().events.iter().cloned().collect()
    }

    #[must_use]
    pub fn is_registered(&self, device: DeviceHandle) -> bool {
        self.lock()
            .devices
            .get(&device)
            .is_some_and(|record| record.registered)
    }

    /// Every device created on this host, in creation order.
    #[must_use]
    pub fn devices(&self) -> Vec<DeviceInfo> {
        let state = self.lock();
        state
            .order
            .iter()
            .filter_map(|handle| {
                state.devices.get(handle).map(|record| DeviceInfo {
                    handle: *handle,
                    owner: record.owner,
                    kind: record.kind,
                    identity: record.identity.clone(),
                    registered: record.registered,
                })
            })
            .collect()
    }
}

impl VersionGate for InMemoryHost {
    fn current_version(&self) -> &str {
        &self.version
    }
}

impl HostPlatform for InMemoryHost {
    fn create_device(
        &self,
        owner: PlatformId,
        kind: DeviceKind,
        identity: &DeviceIdentity,
    ) -> Result<DeviceHandle, AdapterError> {
        let handle = DeviceHandle::new();
        let mut state = self.lock();
        state.devices.insert(
            handle,
            DeviceRecord {
                owner,
                kind,
                identity: identity.clone(),
                registered: false,
                attributes: HashMap::new(),
                handlers: HashMap::new(),
            },
        );
        state.order.push(handle);
        tracing::debug!(device = %handle, %owner, %kind, name = %identity.name, "device created");
        Ok(handle)
    }

    fn register_device(
        &self,
        device: DeviceHandle,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        let result = self.lock().device_mut(device).map(|record| {
            record.registered = true;
            tracing::info!(%device, name = %record.identity.name, "device registered");
        });
        async { result }
    }

    fn unregister_all_devices(
        &self,
        owner: PlatformId,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        let mut state = self.lock();
        let mut count = 0usize;
        for record in state.devices.values_mut().filter(|r| r.owner == owner) {
            record.handlers.clear();
            if record.registered {
                record.registered = false;
                count += 1;
            }
        }
        drop(state);
        tracing::info!(%owner, count, "devices unregistered");
        async { Ok(()) }
    }

    fn set_attribute(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        attribute: &str,
        value: AttributeValue,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        let result = self.write(device, cluster, attribute, value);
        async { result }
    }

    fn get_attribute(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        attribute: &str,
    ) -> Option<AttributeValue> {
        self.lock()
            .devices
            .get(&device)?
            .attributes
            .get(&(cluster, attribute.to_string()))
            .cloned()
    }

    fn trigger_event(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        event: &str,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        let mut state = self.lock();
        let result = state
            .device_mut(device)
            .and_then(|record| ensure_cluster(record, device, cluster));
        if result.is_ok() {
            tracing::debug!(%device, %cluster, event, %payload, "event raised");
            let capacity = state.log_capacity;
            let entry = HostEvent {
                device,
                cluster,
                event: event.to_string(),
                payload,
            };
            push_bounded(&mut state.events, entry, capacity);
        }
        drop(state);
        async { result }
    }

    fn add_command_handler(
        &self,
        device: DeviceHandle,
        command: Command,
        handler: CommandHandler,
    ) -> Result<(), AdapterError> {
        let mut state = self.lock();
        let record = state.device_mut(device)?;
        ensure_cluster(record, device, ClusterId::IDENTIFY)?;
        record.handlers.insert(command, handler);
        Ok(())
    }
}

impl InMemoryHost {
    fn write(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        attribute: &str,
        value: AttributeValue,
    ) -> Result<(), AdapterError> {
        let mut state = self.lock();
        let record = state.device_mut(device)?;
        ensure_cluster(record, device, cluster)?;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AdapterError::WriteFailed {
                cluster: cluster.to_string(),
                attribute: attribute.to_string(),
            });
        }

        record
            .attributes
            .insert((cluster, attribute.to_string()), value.clone());
        let capacity = state.log_capacity;
        let entry = AttributeWrite {
            device,
            cluster,
            attribute: attribute.to_string(),
            value,
        };
        push_bounded(&mut state.writes, entry, capacity);
        Ok(())
    }
}

fn ensure_cluster(
    record: &DeviceRecord,
    device: DeviceHandle,
    cluster: ClusterId,
) -> Result<(), AdapterError> {
    if record.kind.clusters().contains(&cluster) {
        Ok(())
    } else {
        Err(AdapterError::Rejected(format!(
            "device {device} has no {cluster} cluster"
        )))
    }
}
