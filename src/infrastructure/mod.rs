//! Adapters for the domain ports: hosted services and local stand-ins.

pub mod in_memory;
pub mod stripe;
pub mod supabase;
pub mod tracing_reporter;
