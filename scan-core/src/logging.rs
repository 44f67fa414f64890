use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use hex_conservative::DisplayHex;
use lightning::util::logger::{Level, Logger, Record};
use log::*;

const MAX_LOG_ITEMS: usize = 10_000;

#[derive(Clone)]
pub struct ScanLogger {
    pub session_id: String,
    should_keep_in_memory: bool,
    memory_logs: Arc<Mutex<Vec<String>>>,
}

impl ScanLogger {
    /// A logger that also keeps the most recent lines in memory so a host
    /// can attach them to a bug report.
    pub fn with_memory(session_id: Option<String>) -> Self {
        ScanLogger {
            session_id: session_id.unwrap_or_else(gen_session_id),
            should_keep_in_memory: true,
            memory_logs: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Returns `None` when the logger was not asked to keep lines in memory.
    pub fn get_logs(&self) -> Option<Vec<String>> {
        if !self.should_keep_in_memory {
            return None;
        }
        let logs = self
            .memory_logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Some(logs.clone())
    }
}

impl Default for ScanLogger {
    fn default() -> Self {
        Self {
            session_id: gen_session_id(),
            should_keep_in_memory: Default::default(),
            memory_logs: Arc::new(Mutex::new(vec![])),
        }
    }
}

fn gen_session_id() -> String {
    let mut entropy = vec![0u8; 2];
    if getrandom::getrandom(&mut entropy).is_err() {
        warn!("Failed to get entropy for the session id, using zeros.");
    }
    entropy.to_lower_hex_string()
}

impl Logger for ScanLogger {
    fn log(&self, record: Record) {
        let raw_log = record.args.to_string();
        let log = format!(
            "{} {} {:<5} [{}:{}] {}\n",
            // the session id ties lines to one reader when several are alive
            self.session_id,
            Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level,
            record.module_path,
            record.line,
            raw_log
        );

        if self.should_keep_in_memory && record.level >= Level::Trace {
            if let Ok(mut memory_logs) = self.memory_logs.lock() {
                memory_logs.push(log.clone());
                if memory_logs.len() > MAX_LOG_ITEMS {
                    let start_index = memory_logs.len() - MAX_LOG_ITEMS;
                    memory_logs.drain(..start_index);
                }
            } else {
                warn!("Failed to lock memory_logs, log entry may be lost.");
            }
        }

        match record.level {
            Level::Gossip => trace!("{}", log),
            Level::Trace => trace!("{}", log),
            Level::Debug => debug!("{}", log),
            Level::Info => info!("{}", log),
            Level::Warn => warn!("{}", log),
            Level::Error => error!("{}", log),
        }
    }
}
