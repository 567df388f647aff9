mod balance;
mod login;
mod transfer;

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        watch,
    },
    task::JoinHandle,
};

use crate::models::Toast;

pub use balance::{BalanceScreen, BalanceState};
pub use login::{LoginScreen, LoginState};
pub use transfer::{TransferScreen, TransferState};

pub const DEFAULT_EVENTS_CAPACITY: usize = 16;

// goes quiet once a newer action begins
#[derive(Debug)]
pub struct Publisher<S> {
    state: Arc<watch::Sender<S>>,
    events: mpsc::Sender<Toast>,
    generation: u64,
    current: Arc<AtomicU64>,
}

impl<S> Clone for Publisher<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            events: self.events.clone(),
            generation: self.generation,
            current: Arc::clone(&self.current),
        }
    }
}

impl<S> Publisher<S> {
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    pub fn update(&self, modify: impl FnOnce(&mut S)) -> bool {
        self.publish(modify, None)
    }

    pub fn publish(&self, modify: impl FnOnce(&mut S), toast: Option<Toast>) -> bool {
        // the generation is checked under the watch lock, so a stale action
        // can never write after the newer action's first update
        let published = self.state.send_if_modified(|state| {
            if !self.is_current() {
                return false;
            }
            modify(state);
            if let Some(toast) = toast {
                self.queue(toast);
            }
            true
        });
        if !published {
            log::debug!("dropped update of superseded action {}", self.generation);
        }
        published
    }

    // drop-new: a full queue or a missing observer loses the toast
    fn queue(&self, toast: Toast) {
        match self.events.try_send(toast) {
            Ok(()) => log::debug!("queued toast {:?}", toast),
            Err(TrySendError::Full(dropped)) => {
                log::warn!("event queue full, dropped toast {:?}", dropped)
            }
            Err(TrySendError::Closed(dropped)) => {
                log::warn!("no event observer, dropped toast {:?}", dropped)
            }
        }
    }
}

#[derive(Debug)]
pub struct StateHolder<S> {
    state: Arc<watch::Sender<S>>,
    events_tx: mpsc::Sender<Toast>,
    events: Option<mpsc::Receiver<Toast>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
}

impl<S> StateHolder<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(initial: S, events_capacity: usize) -> Self {
        let (state, _) = watch::channel(initial);
        let (events_tx, events_rx) = mpsc::channel(events_capacity.max(1));
        Self {
            state: Arc::new(state),
            events_tx,
            events: Some(events_rx),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub fn current(&self) -> S {
        self.state.borrow().clone()
    }

    // only one observer ever gets the queue
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<Toast>> {
        self.events.take()
    }

    // form fields belong to no action and are never superseded
    pub fn modify(&self, modify: impl FnOnce(&mut S)) {
        self.state.send_modify(modify);
    }

    pub fn begin(&mut self) -> Publisher<S> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel();
        Publisher {
            state: Arc::clone(&self.state),
            events: self.events_tx.clone(),
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_finished() {
                previous.abort();
                log::info!("superseded in-flight action");
            }
        }
    }

    pub fn launch<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.in_flight = Some(tokio::spawn(action));
    }

    pub async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::error!("action task failed: {}", e);
                }
            }
        }
    }
}

impl<S> Drop for StateHolder<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
