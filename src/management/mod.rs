mod debounce;
mod orchestrator;
mod token;

pub use debounce::Debouncer;
pub use orchestrator::OrchestratorSettings;
pub use orchestrator::SearchOrchestrator;
pub use orchestrator::SearchOutcome;
pub use orchestrator::SearchResults;
pub use orchestrator::SearchState;
pub use token::ACCESS_TOKEN_KEY;
pub use token::AUTH_STATE_KEY;
pub use token::FileTokenStore;
pub use token::MemoryTokenStore;
pub use token::TokenProvider;
