//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Tenant-scoped methods take
//! an `org: Option<DbId>` filter (`None` = every organization).

pub mod alert_repo;
pub mod device_repo;
pub mod measurement_repo;
pub mod organization_repo;
pub mod password_reset_repo;
pub mod profile_repo;
pub mod session_repo;
pub mod user_repo;
pub mod zone_repo;

pub use alert_repo::AlertRepo;
pub use device_repo::DeviceRepo;
pub use measurement_repo::MeasurementRepo;
pub use organization_repo::OrganizationRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use profile_repo::ProfileRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use zone_repo::ZoneRepo;
