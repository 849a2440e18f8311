use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info};
use zbus::blocking::{connection, Connection};

use crate::ShellError;

pub const BUS_NAME: &str = "it.mijorus.smile";
pub const OBJECT_PATH: &str = "/it/mijorus/smile";
const INTERFACE: &str = "it.mijorus.smile.Picker";

struct Activator {
    tx: Sender<()>,
}

#[zbus::interface(name = "it.mijorus.smile.Picker")]
impl Activator {
    fn activate(&self) {
        debug!("activation requested over D-Bus");
        let _ = self.tx.send(());
    }
}

/// Requests from later launches to show the picker. Dropping this releases
/// the bus name.
pub struct Activations {
    _connection: Connection,
    rx: Receiver<()>,
}

impl Activations {
    /// Drains queued requests; true when at least one arrived.
    pub fn take_pending(&self) -> bool {
        let mut any = false;
        while self.rx.try_recv().is_ok() {
            any = true;
        }
        any
    }
}

pub enum Instance {
    Primary(Activations),
    /// Another process owns the name and has been asked to show itself.
    AlreadyRunning,
}

pub fn claim_or_activate() -> Result<Instance, ShellError> {
    let (tx, rx) = mpsc::channel();
    let claimed = connection::Builder::session()?
        .name(BUS_NAME)?
        .serve_at(OBJECT_PATH, Activator { tx })?
        .build();

    match claimed {
        Ok(connection) => {
            info!(name = BUS_NAME, "claimed application bus name");
            Ok(Instance::Primary(Activations {
                _connection: connection,
                rx,
            }))
        }
        Err(zbus::Error::NameTaken) => {
            let bus = Connection::session()?;
            bus.call_method(Some(BUS_NAME), OBJECT_PATH, Some(INTERFACE), "Activate", &())?;
            info!("activated running instance");
            Ok(Instance::AlreadyRunning)
        }
        Err(err) => Err(err.into()),
    }
}
