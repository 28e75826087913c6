//! Window, tab and navigation lifecycle for the offline archive reader.
//!
//! The desktop host feeds platform notifications into [`shell::Shell`] as
//! typed [`events::ShellEvent`]s and executes the [`effect::Effect`]s it
//! returns. Archive indexing, catalog persistence and downloads live behind
//! the collaborator traits in [`services`].

pub mod config;
pub mod effect;
pub mod events;
pub mod lifecycle;
pub mod navigation;
pub mod queue;
pub mod services;
pub mod session;
pub mod shell;
pub mod tabs;
pub mod termination;
pub mod window;

pub use effect::{Effect, PlatformRequest, ServiceCall, ServiceRunner};
pub use events::{OpenRequest, ShellEvent};
pub use lifecycle::{AppLifecycleCoordinator, LaunchOptions, LaunchReport};
pub use navigation::{NavigationItem, NavigationState};
pub use queue::{Dispatcher, EventQueue, Platform};
pub use session::{SessionSnapshot, WindowSnapshot};
pub use shell::{LaunchPhase, Shell, ShellContext, ShellWindow};
pub use tabs::{TabId, TabRecord, TabStore};
pub use termination::TerminationFlag;
pub use window::{LiveWindows, WindowId, WindowSet, WindowTracker};
