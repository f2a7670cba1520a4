/// Routing engine.
///
/// Owns the compiled split table, the admitted input connections and the
/// single virtual output connection. Each admitted input gets a receive
/// callback that applies the transformer and sends the result through the
/// shared output handle.
///
/// midir delivers every port's callbacks on its own thread, so the output
/// handle is shared behind a mutex; the split table is immutable and
/// shared without synchronization. Messages from one port are forwarded
/// in arrival order; no ordering exists across ports.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use split_core::admission::{AdmissionPolicy, Verdict};
use split_core::split_table::SplitTable;
use split_core::transform;

use crate::transport::{InputConnection, MidiTransport, OutputConnection};

/// Lifecycle of the engine. Shutdown states absorb repeated shutdown
/// requests; `OutputFailed` is a terminal state, not an error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    OutputResolving,
    OutputReady,
    OutputFailed,
    InputsAttaching,
    Running,
    ShuttingDown,
    Closed,
}

type SharedOutput = Arc<Mutex<Box<dyn OutputConnection>>>;

struct AttachedInput {
    name: String,
    connection: Box<dyn InputConnection>,
}

pub struct RoutingEngine {
    state: EngineState,
    table: Arc<SplitTable>,
    policy: AdmissionPolicy,
    virtual_output: String,
    output: Option<SharedOutput>,
    inputs: Vec<AttachedInput>,
}

impl RoutingEngine {
    pub fn new(table: SplitTable, policy: AdmissionPolicy, virtual_output: impl Into<String>) -> Self {
        Self {
            state: EngineState::Uninitialized,
            table: Arc::new(table),
            policy,
            virtual_output: virtual_output.into(),
            output: None,
            inputs: Vec::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Number of input ports currently attached.
    pub fn attached_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Names of the attached input ports.
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|i| i.name.as_str()).collect()
    }

    /// Resolve the virtual output, then attach every admitted input.
    ///
    /// If no output port carries the configured name the engine lands in
    /// `OutputFailed` and attaches nothing; that outcome is a state, not
    /// an `Err` (the caller maps it to its exit policy). When several
    /// ports share the name, the first one in enumeration order wins.
    /// An input port that fails to open is skipped; the rest attach.
    pub fn start(&mut self, transport: &dyn MidiTransport) -> Result<()> {
        if self.state != EngineState::Uninitialized {
            bail!("routing engine already started (state {:?})", self.state);
        }

        self.state = EngineState::OutputResolving;
        let output_names = transport.output_ports()?;
        let output_index = match output_names.iter().position(|n| n == &self.virtual_output) {
            Some(index) => index,
            None => {
                warn!(
                    output = %self.virtual_output,
                    available = output_names.len(),
                    "virtual output port not found"
                );
                self.state = EngineState::OutputFailed;
                return Ok(());
            }
        };

        let output = transport.open_output(output_index)?;
        info!(output = %self.virtual_output, index = output_index, "virtual output opened");
        let shared = Arc::new(Mutex::new(output));
        self.output = Some(Arc::clone(&shared));
        self.state = EngineState::OutputReady;

        self.state = EngineState::InputsAttaching;
        let input_names = transport.input_ports()?;
        for (index, name) in input_names.iter().enumerate() {
            match self.policy.verdict(name) {
                Verdict::MatchesVirtualOutput => {
                    debug!(port = %name, "skipping own virtual output");
                    continue;
                }
                Verdict::MatchesExclusion { pattern } => {
                    info!(port = %name, pattern = %pattern, "input port excluded");
                    continue;
                }
                Verdict::Admitted => {}
            }

            let table = Arc::clone(&self.table);
            let output = Arc::clone(&shared);
            let port = name.clone();
            let callback = move |_timestamp: u64, message: &[u8]| {
                forward(&port, &table, &output, message);
            };

            match transport.open_input(index, Box::new(callback)) {
                Ok(connection) => {
                    info!(port = %name, index = index, "input port attached");
                    self.inputs.push(AttachedInput {
                        name: name.clone(),
                        connection,
                    });
                }
                Err(e) => {
                    warn!(port = %name, "failed to open input port, skipping: {}", e);
                }
            }
        }

        self.state = EngineState::Running;
        info!(
            inputs = self.inputs.len(),
            mapped_notes = self.table.mapped_notes(),
            "routing engine running"
        );
        Ok(())
    }

    /// Close every attached input, then the output. Idempotent: repeated
    /// calls while `ShuttingDown`/`Closed` are no-ops.
    pub fn shutdown(&mut self) {
        if matches!(self.state, EngineState::ShuttingDown | EngineState::Closed) {
            debug!("shutdown already done");
            return;
        }
        self.state = EngineState::ShuttingDown;

        for input in self.inputs.drain(..) {
            debug!(port = %input.name, "closing input port");
            input.connection.close();
        }

        if let Some(output) = self.output.take() {
            match Arc::try_unwrap(output) {
                Ok(mutex) => {
                    if let Ok(connection) = mutex.into_inner() {
                        connection.close();
                        debug!(output = %self.virtual_output, "output port closed");
                    }
                }
                Err(_) => {
                    // A callback still holds a clone; the handle closes
                    // when the last clone drops.
                    warn!("output handle still shared at shutdown");
                }
            }
        }

        self.state = EngineState::Closed;
        info!("routing engine closed");
    }
}

/// Transform-then-send hot path, run on the input port's callback thread.
fn forward(
    port: &str,
    table: &SplitTable,
    output: &Mutex<Box<dyn OutputConnection>>,
    message: &[u8],
) {
    let routed;
    let outgoing: &[u8] = match <[u8; 3]>::try_from(message) {
        Ok(bytes) => {
            routed = transform::route(table, bytes);
            if routed[0] != bytes[0] {
                debug!(
                    port = %port,
                    note = bytes[1],
                    channel = (routed[0] & 0x0F) + 1,
                    "note message rerouted"
                );
            }
            &routed
        }
        // Program change, SysEx, realtime: forwarded verbatim.
        Err(_) => message,
    };

    let mut connection = output.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = connection.send(outgoing) {
        warn!(port = %port, "failed to forward MIDI message: {}", e);
    }
}
