#![forbid(unsafe_code)]

//! Page controllers for server-rendered hypermedia pages.
//!
//! This crate provides:
//! - [`Controller`] and [`Flow`], the contract every page behavior implements
//! - [`Dispatcher`], an ordered event bus with a bounded dispatch trace
//! - [`Runtime`], which binds a [`Document`](hxui_core::Document) adapter,
//!   configuration and capabilities to a dispatcher
//! - the six standard controllers in [`controllers`]

pub mod controller;
pub mod controllers;
pub mod dispatcher;
pub mod runtime;

pub use controller::{Context, Controller, Flow};
pub use dispatcher::{DispatchOutcome, DispatchTrace, Dispatcher, TRACE_CAPACITY, TraceRecord};
pub use runtime::{BootState, Runtime};
