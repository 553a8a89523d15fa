#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Credential storage, password hashing, token issuance, session store"]
#![doc = "selection, routing, and error handling for the TaskVault backend."]
#![doc = "The main binary (`main.rs`) wires these pieces into a running server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod store;
