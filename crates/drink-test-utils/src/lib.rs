//! # Drink Test Utilities
//!
//! Shared test utilities for the drink service.
//!
//! This crate provides:
//! - Deterministic key fixtures (Ed25519 from a seed, one fixed RSA key)
//! - Claims builder (`TestClaimsBuilder`)
//! - Mock JWKS endpoint (`MockJwksServer`)
//! - Server test harness (`TestDrinkServer`) backed by in-memory storage
//!
//! ## Usage
//!
//! ```rust,ignore
//! use drink_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let key = RsaTestKey::new("rsa-key-01");
//!     let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
//!     let server = TestDrinkServer::spawn(&jwks.jwks_url()).await?;
//!
//!     let token = key.sign(&TestClaimsBuilder::new()
//!         .with_permissions(&["get:drinks-detail"])
//!         .build());
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/drinks-detail", server.url()))
//!         .bearer_auth(token)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod crypto_fixtures;
pub mod jwks_mock;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use crypto_fixtures::*;
pub use jwks_mock::*;
pub use server_harness::*;
pub use token_builders::*;
