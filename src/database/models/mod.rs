pub mod appointment;
pub mod client;
pub mod client_document;
pub mod communication_log;
pub mod property;
pub mod property_interest;
pub mod user;
pub mod user_settings;

pub use appointment::Appointment;
pub use client::Client;
pub use client_document::ClientDocument;
pub use communication_log::CommunicationLog;
pub use property::Property;
pub use property_interest::PropertyInterest;
pub use user::User;
pub use user_settings::UserSettings;
