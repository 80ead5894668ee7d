// Core game logic modules
pub mod core;

// Environment configuration
pub mod config;

// Wire events (client requests / server broadcasts)
pub mod models;

// HTTP and WebSocket routes
pub mod routes;

// Application state
pub mod state;
