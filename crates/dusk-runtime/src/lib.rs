#![forbid(unsafe_code)]

//! Duskfall runtime: system color signals, the UI-thread dispatcher, and
//! the theme manager orchestrator.
//!
//! # Role in Duskfall
//! `dusk-runtime` is the control plane. It owns the sequencing that
//! `dusk-tree` deliberately knows nothing about: two-phase startup,
//! marshalling OS change notifications onto the owner thread, deciding
//! when effective values recompute, and fanning accent palette refreshes
//! out to every cached theme dictionary.
//!
//! # Key components
//!
//! - [`ThemeManager`] - the explicitly constructed, process-wide orchestrator
//! - [`SystemColorsProvider`] - the host-supplied system colors capability
//! - [`UiDispatcher`] / [`DispatchHandle`] - the cooperative UI-thread queue
//! - [`SystemSignals`] - query degradation and the shared snapshot cache
//!
//! # Threading model
//!
//! All engine state is confined to one logical owner thread. The only
//! cross-thread boundary is posting a [`SystemSignal`] through a
//! [`SignalHandle`]; everything else is synchronous, non-blocking, and
//! idempotent, so interleaved or duplicated signals converge.

/// The cooperative UI-thread message queue.
pub mod dispatcher;
/// The theme manager orchestrator.
pub mod manager;
/// The system colors provider boundary.
pub mod signals;

pub use dispatcher::{DispatchHandle, UiDispatcher};
pub use manager::{ThemeError, ThemeManager};
#[cfg(any(test, feature = "test-support"))]
pub use signals::FakeColorsProvider;
pub use signals::{
    SignalHandle, SystemColorSnapshot, SystemColorsProvider, SystemQueryError, SystemSignal,
    SystemSignals,
};
