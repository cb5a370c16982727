//! # Hearth POS API Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hearth POS                                       │
//! │                                                                         │
//! │  Till / Captain app / KDS ──► HTTP JSON ──► hearth-api ──► SQLite      │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                                          hearth-core                    │
//! │                                   (bill math, settlement rules)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All setup lives in [`hearth_api::run`].

#[tokio::main]
async fn main() {
    if let Err(e) = hearth_api::run().await {
        eprintln!("hearth-api: {e}");
        std::process::exit(1);
    }
}
