pub mod category;
pub mod config;
pub mod issue;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod scanner;
pub mod testing;
pub mod ticket;

pub use category::{Block, Categorizer, Category, Entry};
pub use config::{
    load_config, load_config_from_str, validate_config, ChangelogConfig, Config, ConfigError,
    JiraConfig, MetricsConfig, SanitizedConfig, TypeMarkers, ENV_PREFIX,
};
pub use issue::{IssueLookup, IssueLookupError, IssueMap, IssueResolver, JiraClient};
pub use pipeline::{GenerateStats, Pipeline, PipelineError, RunSummary, StreamError};
pub use render::Renderer;
pub use scanner::{BlockScanner, LineKind, ScanState, ScanStep};
pub use ticket::{PatternError, ReferencePattern, TicketExtractor, TicketId, TicketSet};
