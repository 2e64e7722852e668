//! Ready-made observable stores for vmbind containers.
//!
//! [ModalStore] holds a modal's visibility and payload. Hiding keeps the payload around
//! for a delay, scheduled on a [Timer]:
//!
//! ```rust
//! use std::{sync::Arc, time::Duration};
//! use vmbind_stores::{ClearOutcome, ManualTimer, ModalStore};
//!
//! let timer = ManualTimer::new();
//! let modal = ModalStore::default().with_timer(Arc::new(timer.clone()));
//!
//! modal.show(Some("are you sure?"));
//! let mut pending = modal.hide(Duration::from_millis(300));
//! assert!(!modal.is_visible());
//! assert_eq!(modal.current_payload(), Some("are you sure?"));
//!
//! timer.advance(Duration::from_millis(300));
//! assert_eq!(modal.current_payload(), None);
//! assert_eq!(pending.try_outcome(), Some(ClearOutcome::Cleared));
//! ```

pub mod modal;
pub mod timer;

pub use modal::{ClearOutcome, ClearPolicy, ModalStore, PendingClear, DEFAULT_HIDE_DELAY};
pub use timer::{ManualTimer, SharedTimer, Task, ThreadTimer, Timer};
