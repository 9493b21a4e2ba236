use std::{
    fmt::Debug,
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    thread::{self, JoinHandle},
};

/// A GPIO line that reports falling edges.
pub trait InterruptLine: Send + 'static {
    type Error: Debug;

    /// Block until the next falling edge.
    fn wait_falling_edge(&mut self) -> Result<(), Self::Error>;
}

/// Every `()` received counts as one edge.
impl InterruptLine for mpsc::Receiver<()> {
    type Error = mpsc::RecvError;

    fn wait_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.recv()
    }
}

/// Run `handler` on a new thread for every edge of `line`.
///
/// The thread exits once `running` is cleared (checked after each edge)
/// or when the line fails.
pub fn spawn_listener<L, F>(
    name: String,
    mut line: L,
    running: Arc<AtomicBool>,
    mut handler: F,
) -> io::Result<JoinHandle<()>>
where
    L: InterruptLine,
    F: FnMut() + Send + 'static,
{
    let label = name.clone();
    thread::Builder::new().name(name).spawn(move || {
        while running.load(Ordering::Acquire) {
            if let Err(e) = line.wait_falling_edge() {
                log::debug!("{label}: interrupt line closed: {e:?}");
                break;
            }
            if !running.load(Ordering::Acquire) {
                break;
            }
            handler();
        }
    })
}
