//! The input state machine.
//!
//! ```text
//! Idle --submit--> Resolving --+--> Error --acknowledge--> Idle
//!                              +--> Done
//!                              +--> PendingConfirmation --confirm--> Done
//!                                                       --decline--> Idle
//! ```
//!
//! A submit while resolving is dropped, so at most one resolution is ever in
//! flight. A submit from `Done` or `Error` starts over.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use lightning::util::logger::Logger;
use lightning::{log_debug, log_warn};

use crate::context::WalletContext;
use crate::error::ScanError;
use crate::gateway::{DecodeFailure, DecoderGateway};
use crate::logging::ScanLogger;
use crate::state::{PaymentMode, ReadDone, ReadError, ReadState};
use crate::utils;
use crate::validator::{self, Outcome};

#[cfg(test)]
use mockall::{automock, predicate::*};

/// The camera or paste source feeding the reader.
#[cfg_attr(test, automock)]
pub trait ScanGate {
    fn pause(&self);
    fn resume(&self);
}

pub struct ReadInputBuilder<G: DecoderGateway> {
    context: WalletContext,
    gateway: G,
    scan_gate: Option<Arc<dyn ScanGate + Send + Sync>>,
    logger: Option<Arc<ScanLogger>>,
}

impl<G: DecoderGateway> ReadInputBuilder<G> {
    pub fn new(context: WalletContext, gateway: G) -> ReadInputBuilder<G> {
        ReadInputBuilder {
            context,
            gateway,
            scan_gate: None,
            logger: None,
        }
    }

    pub fn with_scan_gate(mut self, scan_gate: Arc<dyn ScanGate + Send + Sync>) -> Self {
        self.scan_gate = Some(scan_gate);
        self
    }

    pub fn with_logger(mut self, logger: Arc<ScanLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> ReadInput<G> {
        ReadInput {
            context: self.context,
            gateway: self.gateway,
            scan_gate: self.scan_gate,
            logger: self.logger.unwrap_or_default(),
            state: Mutex::new(ReadState::Idle),
            listeners: Mutex::new(vec![]),
        }
    }
}

/// Reads one payment input at a time and tells the caller what it is.
pub struct ReadInput<G: DecoderGateway> {
    context: WalletContext,
    gateway: G,
    scan_gate: Option<Arc<dyn ScanGate + Send + Sync>>,
    logger: Arc<ScanLogger>,
    state: Mutex<ReadState>,
    listeners: Mutex<Vec<UnboundedSender<ReadState>>>,
}

impl<G: DecoderGateway> ReadInput<G> {
    pub fn context(&self) -> &WalletContext {
        &self.context
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> ReadState {
        self.lock_state().clone()
    }

    /// Receives every state the reader enters from now on.
    pub fn subscribe(&self) -> UnboundedReceiver<ReadState> {
        let (sender, receiver) = unbounded();
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        receiver
    }

    // the state only ever holds a whole value, so a poisoned lock is still usable
    fn lock_state(&self) -> MutexGuard<'_, ReadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Walks `path` under the lock, then tells the gate and the listeners
    /// about every state entered.
    fn transition(&self, mut state: MutexGuard<'_, ReadState>, path: Vec<ReadState>) {
        for next in &path {
            log_debug!(self.logger, "read state {:?} -> {:?}", *state, next);
            *state = next.clone();
        }
        // gate callbacks may call back into the reader
        drop(state);

        for next in path {
            self.notify(next);
        }
    }

    fn notify(&self, entered: ReadState) {
        if let Some(gate) = &self.scan_gate {
            match entered {
                ReadState::Idle => gate.resume(),
                ReadState::Resolving
                | ReadState::Error(_)
                | ReadState::PendingConfirmation { .. } => gate.pause(),
                ReadState::Done(_) => {}
            }
        }

        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|l| l.unbounded_send(entered.clone()).is_ok());
    }

    fn state_for(outcome: Outcome) -> ReadState {
        match outcome {
            Outcome::Accept(done) => ReadState::Done(done),
            Outcome::AcceptPending(invoice, reason) => {
                ReadState::PendingConfirmation { invoice, reason }
            }
            Outcome::Reject(err) => ReadState::Error(err),
        }
    }

    /// Reads raw text from the scanner or the clipboard.
    ///
    /// Ignored while another input is resolving or a warning is waiting for a
    /// decision. Starts over from `Done` or `Error`. If the returned future is
    /// dropped before it finishes, or the decoder panics, the reader goes back
    /// to `Idle`.
    pub async fn submit(&self, raw: &str) {
        {
            let state = self.lock_state();
            let mut path = vec![];
            match *state {
                ReadState::Resolving | ReadState::PendingConfirmation { .. } => {
                    log_debug!(self.logger, "dropping input, reader is busy");
                    return;
                }
                ReadState::Error(_) | ReadState::Done(_) => path.push(ReadState::Idle),
                ReadState::Idle => {}
            }
            path.push(ReadState::Resolving);
            self.transition(state, path);
        }

        let mut in_flight = InFlight {
            reader: self,
            finished: false,
        };

        let next = match self.gateway.decode(raw).await {
            Ok(parsed) => Self::state_for(validator::validate_at(
                &parsed,
                &self.context,
                utils::now(),
            )),
            Err(DecodeFailure::NotRecognized) => {
                log_warn!(self.logger, "could not decode input");
                ReadState::Error(ReadError::UnhandledInput)
            }
            Err(DecodeFailure::Service(failure)) => {
                log_warn!(self.logger, "LNURL service failed: {}", failure);
                ReadState::Error(ReadError::LnUrlResponseError(failure))
            }
        };

        in_flight.finished = true;
        self.transition(self.lock_state(), vec![next]);
    }

    /// Accepts the warning on a pending invoice.
    pub fn confirm_pending(&self) -> Result<(), ScanError> {
        let state = self.lock_state();
        let ReadState::PendingConfirmation { invoice, .. } = &*state else {
            return Err(ScanError::InvalidState);
        };
        let next = ReadState::Done(ReadDone::Lightning(invoice.clone()));
        self.transition(state, vec![next]);
        Ok(())
    }

    /// Refuses the warning on a pending invoice and goes back to scanning
    /// without reporting an error.
    pub fn decline_pending(&self) -> Result<(), ScanError> {
        let state = self.lock_state();
        if !matches!(*state, ReadState::PendingConfirmation { .. }) {
            return Err(ScanError::InvalidState);
        }
        self.transition(state, vec![ReadState::Idle]);
        Ok(())
    }

    pub fn acknowledge_error(&self) -> Result<(), ScanError> {
        let state = self.lock_state();
        if !matches!(*state, ReadState::Error(_)) {
            return Err(ScanError::InvalidState);
        }
        self.transition(state, vec![ReadState::Idle]);
        Ok(())
    }

    /// Picks how to pay an on-chain request that also offers lightning.
    /// Choosing lightning runs the invoice checks on the embedded invoice.
    pub fn choose_payment_mode(&self, mode: PaymentMode) -> Result<(), ScanError> {
        let state = self.lock_state();
        let ReadState::Done(ReadDone::OnchainWithLightningOption(request)) = &*state else {
            return Err(ScanError::InvalidState);
        };
        let outcome =
            validator::resolve_payment_mode(request, mode, &self.context, utils::now());
        self.transition(state, vec![Self::state_for(outcome)]);
        Ok(())
    }

    /// Goes back to idle from anything but an in-flight resolution, for when
    /// the host restarts its scanner.
    pub fn reset(&self) -> Result<(), ScanError> {
        let state = self.lock_state();
        match *state {
            ReadState::Resolving => return Err(ScanError::InvalidState),
            ReadState::Idle => return Ok(()),
            _ => {}
        }
        self.transition(state, vec![ReadState::Idle]);
        Ok(())
    }
}

/// Marks a submit that has entered `Resolving`. Dropped before the result is
/// in, it puts the reader back to `Idle`.
struct InFlight<'a, G: DecoderGateway> {
    reader: &'a ReadInput<G>,
    finished: bool,
}

impl<G: DecoderGateway> Drop for InFlight<'_, G> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let state = self.reader.lock_state();
        if *state == ReadState::Resolving {
            log_warn!(self.reader.logger, "submit stopped before a result, back to idle");
            self.reader.transition(state, vec![ReadState::Idle]);
        }
    }
}
