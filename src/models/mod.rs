pub mod booking;
pub mod movie;
pub mod review;
pub mod room;
pub mod schedule;
pub mod seat;
pub mod theater;
pub mod user;

pub use booking::Booking;
pub use movie::{Movie, MovieStatus};
pub use review::Review;
pub use room::{Room, SeatRowDeclaration};
pub use schedule::Schedule;
pub use seat::{Seat, SeatStatus, SeatType};
pub use theater::Theater;
pub use user::{Account, UserProfile};
