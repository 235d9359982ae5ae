#![allow(dead_code)]

pub mod env_guard;
pub mod http_stub;
pub mod mock_service;
