// Calendar layout engine
// Exports all modules for the preview tool, tests and benches

pub mod models;
pub mod services;
pub mod utils;

pub use models::event::{CalendarEvent, EventPatch, NewEvent};
pub use models::layout::LayoutError;
pub use models::view::{Navigation, ViewKind, ViewState};
pub use services::compose::{compose_view, ViewLayout};
pub use services::controller::ViewController;
pub use services::event_store::EventStore;
pub use utils::date::CalendarFrame;
