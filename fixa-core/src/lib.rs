/// Fixa marketplace core
/// Pure domain logic shared by the tool server and the session client:
/// catalog filtering, quotes, booking records and the booking flow machine

pub mod booking;
pub mod catalog;
pub mod fixtures;
pub mod flow;
pub mod model;

pub use booking::{quote, Booking, BookingStatus, PaymentStatus, Quote, CONVENIENCE_FEE};
pub use catalog::{filter_providers, Category};
pub use fixtures::{find_provider, providers};
pub use flow::{BookingFlow, FlowError, FlowStep};
pub use model::{Availability, Provider, Transaction, TransactionStatus, User, UserRole};
