//! Stateless repository structs, one per aggregate or table.

pub mod device_token_repo;
pub mod inspection_repo;
pub mod message_repo;
pub mod notification_repo;
pub mod request_repo;
pub mod staff_repo;

pub use device_token_repo::DeviceTokenRepo;
pub use inspection_repo::InspectionRepo;
pub use message_repo::MessageRepo;
pub use notification_repo::NotificationRepo;
pub use request_repo::RequestRepo;
pub use staff_repo::StaffRepo;
