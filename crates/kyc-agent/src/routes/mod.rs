//! # API Route Modules
//!
//! - `agent`: `POST /agent`, the iden3comm message endpoint.
//! - `offers`: `GET /offers`, session polling by external session id.

pub mod agent;
pub mod offers;
