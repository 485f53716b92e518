// Concept Simplifier - iterative explain-critique-refine service
// Library exports

// Core modules
pub mod agent;
pub mod config;
pub mod generators;
pub mod server;
