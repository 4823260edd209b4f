use std::path::Path;
use std::sync::Arc;

use geoprofile_core::{Config, JobExecutor, Processor, TicketStore};

/// Shared application state, constructed once in `main` and injected into
/// every handler.
pub struct AppState {
    config: Config,
    ticket_store: Arc<dyn TicketStore>,
    processor: Arc<dyn Processor>,
    executor: JobExecutor,
}

impl AppState {
    pub fn new(
        config: Config,
        ticket_store: Arc<dyn TicketStore>,
        processor: Arc<dyn Processor>,
        executor: JobExecutor,
    ) -> Self {
        Self {
            config,
            ticket_store,
            processor,
            executor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ticket_store(&self) -> &dyn TicketStore {
        self.ticket_store.as_ref()
    }

    pub fn processor(&self) -> &dyn Processor {
        self.processor.as_ref()
    }

    pub fn executor(&self) -> &JobExecutor {
        &self.executor
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.storage.output_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.config.storage.temp_dir
    }

    pub fn input_dir(&self) -> &Path {
        &self.config.storage.input_dir
    }
}
