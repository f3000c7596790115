//! Shared constants for end-to-end tests

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for a spawned server to answer `/health`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Per-request timeout of the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Stub Backend Data
// ============================================================================

/// Names returned by the recording backend's metric search
pub const SEARCH_RESULTS: [&str; 2] = ["system.cpu.user", "system.cpu.idle"];

/// Query used across tests
pub const CPU_QUERY: &str = "avg:system.cpu.user{*}";

/// Metric used across tag lookups
pub const CPU_METRIC: &str = "system.cpu.user";

/// Credentials handed to the Datadog client under test
pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_APP_KEY: &str = "test-app-key";
