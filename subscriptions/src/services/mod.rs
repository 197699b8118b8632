pub mod cost;
pub mod subscription;

pub use subscription::SubscriptionService;
