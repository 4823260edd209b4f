pub mod config;
pub mod executor;
pub mod exporter;
pub mod metrics;
pub mod params;
pub mod processor;
pub mod testing;
pub mod ticket;
pub mod workspace;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, CorsConfig,
    DatabaseConfig, ServerConfig, StorageConfig,
};
pub use executor::{
    create_executor, ExecutorConfig, Job, JobExecutor, JobOutcome, JobRunner, ResultPublisher,
};
pub use exporter::{store_dataset, ExportFormat, ExporterError};
pub use params::{
    FieldMap, NormalizeParams, ProfileParams, ResponseMode, SamplingMethod, SummarizeParams,
    ValidationError,
};
pub use processor::{
    CliProcessor, DatasetOutput, Processor, ProcessorConfig, ProcessorError, ProcessorInvocation,
    ProcessorOutput, ResourceKind,
};
pub use ticket::{new_ticket_id, SqliteTicketStore, TerminalUpdate, TicketError, TicketRecord, TicketStore};
pub use workspace::{check_directory_writable, unpack_if_archive, TempWorkspace, WorkspaceError};
