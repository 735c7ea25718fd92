pub mod aggregate;
pub mod config;
pub mod db;
pub mod emission;
pub mod environment;
pub mod errors;
pub mod export;
pub mod info;
pub mod log;
pub mod normalization;
pub mod render;
pub mod report;
pub mod routes;
pub mod submission;
pub mod survey;
pub mod transport;
