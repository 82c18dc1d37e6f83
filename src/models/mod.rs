pub mod booking;
pub mod user;
pub mod worker;

pub use booking::{Booking, BookingStatus};
pub use user::{Admin, User};
pub use worker::{Worker, WorkerStatus};
