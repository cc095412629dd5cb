pub mod payment;

mod router;
pub use router::{get_notification_router, get_router};
