pub mod subscription;

pub use subscription::configure_subscription_routes;
