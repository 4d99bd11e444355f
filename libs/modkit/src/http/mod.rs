//! HTTP plumbing shared by the server and module tests.

pub mod ingress;
pub mod request_id;
