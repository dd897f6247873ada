//! Room hub: the single-writer event loop and its producer handle.
//!
//! ```text
//! connection tasks / HTTP handlers
//!     │  register · unregister · submit_message · queries
//!     ▼
//! HubHandle ──mpsc──▶ Hub::run (sole owner of RoomRegistry)
//!                        │  try_send per member
//!                        ▼
//!                  client outbound queues
//! ```

pub mod encoder;
pub mod event_loop;
pub mod handle;
pub mod stats;

pub use encoder::{EnvelopeEncoder, JsonEncoder};
pub use event_loop::Hub;
pub use handle::HubHandle;
pub use stats::HubStats;
