//! Concrete marketplace entities and their state graphs

mod order;
mod rental;
mod ticket;
mod wallet;

pub use order::{Order, OrderState};
pub use rental::{Rental, RentalState};
pub use ticket::{Ticket, TicketState};
pub use wallet::{WalletTransaction, WalletTxState};
