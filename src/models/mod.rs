// src/models/mod.rs

pub mod approval;
pub mod handbook;
pub mod session;
