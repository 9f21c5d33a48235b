//! Default values for every setting the service reads from the environment.

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_PROVIDER: &str = "openai";

/// Providers the service knows how to build.
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "gemini"];

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Largest accepted design document body (2 MB).
pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;
