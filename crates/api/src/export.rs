//! CSV rendering of the device inventory.

use ecoenergy_db::models::device::Device;

/// Column headers of the device export, in order.
pub const DEVICE_CSV_HEADERS: [&str; 6] = ["id", "name", "category", "zone", "organization", "watts"];

/// Render `devices` as CSV with a header row.
pub fn devices_to_csv(devices: &[Device]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(DEVICE_CSV_HEADERS)?;
    for device in devices {
        writer.write_record([
            device.id.to_string(),
            device.name.clone(),
            device.category.to_string(),
            device.zone_name.clone(),
            device.organization_name.clone(),
            device.watts.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
