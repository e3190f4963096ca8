pub mod guest;

pub use guest::{CreateGuestRequest, Guest, GuestCreated, RsvpStatus};
