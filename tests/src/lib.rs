//! # Settlement Ledger Test Suite
//!
//! Cross-crate tests that drive the settlement service and the claims
//! gateway together.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── settlement_benchmarks.rs  # Claim key, validation, submission
//! └── src/
//!     ├── fixtures.rs               # Seeded ledger + recording dispatcher
//!     └── integration/
//!         ├── scenarios.rs          # Settlement flows end to end
//!         ├── concurrency.rs        # Racing submitters
//!         └── http.rs               # Gateway over the runtime wiring
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ledger-tests
//! cargo test -p ledger-tests integration::concurrency
//! cargo bench -p ledger-tests
//! ```

pub mod integration;
