/// Native MIDI transport boundary.
///
/// The engine talks to MIDI hardware through these object-safe traits:
/// list ports, open a port, send bytes, receive bytes via callback, close.
/// `MidirTransport` is the production implementation; engine tests drive
/// a mock instead.

use anyhow::{anyhow, Result};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

/// Receive callback: (timestamp in microseconds, raw message bytes).
pub type MessageCallback = Box<dyn FnMut(u64, &[u8]) + Send + 'static>;

pub trait MidiTransport {
    /// Names of the available input ports, in enumeration order.
    fn input_ports(&self) -> Result<Vec<String>>;

    /// Names of the available output ports, in enumeration order.
    fn output_ports(&self) -> Result<Vec<String>>;

    /// Open the input port at `index` and subscribe `callback` to its
    /// message stream. The subscription lives until the handle is closed.
    fn open_input(&self, index: usize, callback: MessageCallback)
        -> Result<Box<dyn InputConnection>>;

    /// Open the output port at `index`.
    fn open_output(&self, index: usize) -> Result<Box<dyn OutputConnection>>;
}

pub trait InputConnection: Send {
    fn close(self: Box<Self>);
}

pub trait OutputConnection: Send {
    fn send(&mut self, message: &[u8]) -> Result<()>;
    fn close(self: Box<Self>);
}

/// Transport over midir (ALSA / CoreMIDI / WinMM behind one API).
pub struct MidirTransport {
    client_name: String,
}

impl MidirTransport {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn input_client(&self) -> Result<MidiInput> {
        let mut input = MidiInput::new(&self.client_name)
            .map_err(|e| anyhow!("failed to create MIDI input client: {}", e))?;
        input.ignore(Ignore::None);
        Ok(input)
    }

    fn output_client(&self) -> Result<MidiOutput> {
        MidiOutput::new(&self.client_name)
            .map_err(|e| anyhow!("failed to create MIDI output client: {}", e))
    }
}

impl MidiTransport for MidirTransport {
    fn input_ports(&self) -> Result<Vec<String>> {
        let input = self.input_client()?;
        input
            .ports()
            .iter()
            .map(|port| {
                input
                    .port_name(port)
                    .map_err(|e| anyhow!("failed to read input port name: {}", e))
            })
            .collect()
    }

    fn output_ports(&self) -> Result<Vec<String>> {
        let output = self.output_client()?;
        output
            .ports()
            .iter()
            .map(|port| {
                output
                    .port_name(port)
                    .map_err(|e| anyhow!("failed to read output port name: {}", e))
            })
            .collect()
    }

    fn open_input(
        &self,
        index: usize,
        mut callback: MessageCallback,
    ) -> Result<Box<dyn InputConnection>> {
        let input = self.input_client()?;
        let ports = input.ports();
        let port = ports
            .get(index)
            .ok_or_else(|| anyhow!("input port {} disappeared during enumeration", index))?;
        let name = input
            .port_name(port)
            .unwrap_or_else(|_| format!("input {}", index));
        let connection = input
            .connect(
                port,
                "split-router-in",
                move |timestamp, message, _| callback(timestamp, message),
                (),
            )
            .map_err(|e| anyhow!("failed to open input port '{}': {}", name, e))?;
        Ok(Box::new(MidirInput { connection }))
    }

    fn open_output(&self, index: usize) -> Result<Box<dyn OutputConnection>> {
        let output = self.output_client()?;
        let ports = output.ports();
        let port = ports
            .get(index)
            .ok_or_else(|| anyhow!("output port {} disappeared during enumeration", index))?;
        let name = output
            .port_name(port)
            .unwrap_or_else(|_| format!("output {}", index));
        let connection = output
            .connect(port, "split-router-out")
            .map_err(|e| anyhow!("failed to open output port '{}': {}", name, e))?;
        Ok(Box::new(MidirOutput { connection }))
    }
}

struct MidirInput {
    connection: MidiInputConnection<()>,
}

impl InputConnection for MidirInput {
    fn close(self: Box<Self>) {
        self.connection.close();
    }
}

struct MidirOutput {
    connection: MidiOutputConnection,
}

impl OutputConnection for MidirOutput {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        self.connection
            .send(message)
            .map_err(|e| anyhow!("MIDI send failed: {}", e))
    }

    fn close(self: Box<Self>) {
        self.connection.close();
    }
}
