//! # Events Module
//!
//! Progress events for planning, resolving and applying a batch.
//!
//! ## Design
//! The core library emits events through channels, allowing any front end
//! to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Plan(PlanEvent::Progress(p)) = event {
//!             println!("Planned {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! let draft = renamer.plan_batch_with_events(&paths, &sender);
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
