// src/store/mod.rs

pub mod sessions;
