pub mod link_click;
pub mod tracked_link;

pub use link_click::Entity as LinkClickEntity;
pub use tracked_link::Entity as TrackedLinkEntity;
