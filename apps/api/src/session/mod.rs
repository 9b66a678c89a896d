// Conversation sessions: ordered chat turns, career selection, cached
// reports and per-session credentials, kept in memory only.

pub mod credentials;
pub mod handlers;
pub mod models;
pub mod store;
