//! # Cliniko Demo
//!
//! Command-line walkthrough of the [`cliniko_client`] crate against a real
//! Cliniko account.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `test` | Connection test, account summary, recent patients, today's appointments, demo patient |
//! | `patients` | List patients with contact details |
//! | `appointments` | List appointments |
//! | `examples` | Full walkthrough, including filters and booking an appointment |
//!
//! Anything else prints usage.
//!
//! ## Configuration
//!
//! Settings are read from the file named by `CLINIKO_CONFIG`, or from
//! `cliniko.toml` in the working directory when present:
//!
//! ```toml
//! [api]
//! api_key = "..."
//! base_url = "https://api.au1.cliniko.com/v1"
//! email = "ops@example.com"
//! timeout_secs = 30
//!
//! [demo]
//! page_size_preview = 5
//! ```
//!
//! Values missing from the file fall back to `CLINIKO_API_KEY`,
//! `CLINIKO_BASE_URL` and `CLINIKO_EMAIL`.
//!
//! ## Example Usage
//!
//! ```bash
//! CLINIKO_API_KEY=... CLINIKO_BASE_URL=https://api.au1.cliniko.com/v1 cargo run -- test
//!
//! # Verbose client logging
//! RUST_LOG=cliniko_client=debug cargo run -- examples
//! ```
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML settings and client configuration |
//! | [`demo`] | Demo scenarios |

pub mod config;
pub mod demo;
