//! `ecoenergy seed-data`: demo zones, devices and daily readings.

use std::fmt;

use anyhow::{bail, Context};
use chrono::{Duration, Utc};
use ecoenergy_core::device::DeviceCategory;
use ecoenergy_core::types::DbId;
use ecoenergy_db::models::device::CreateDevice;
use ecoenergy_db::models::measurement::CreateMeasurement;
use ecoenergy_db::repositories::{DeviceRepo, MeasurementRepo, OrganizationRepo, ZoneRepo};
use ecoenergy_db::DbPool;
use rand::Rng;

use super::{GREENENERGY, TECHCORP};

/// Range of generated daily consumption, in kWh.
const MIN_KWH: f64 = 10.0;
const MAX_KWH: f64 = 150.0;

struct SeedDevice {
    name: &'static str,
    category: DeviceCategory,
    zone: &'static str,
    watts: f64,
}

const fn device(
    name: &'static str,
    category: DeviceCategory,
    zone: &'static str,
    watts: f64,
) -> SeedDevice {
    SeedDevice {
        name,
        category,
        zone,
        watts,
    }
}

/// Zones and devices per organization.
const INVENTORY: [(&str, &[&str], &[SeedDevice]); 2] = [
    (
        TECHCORP,
        &["Main Office", "Server Room", "Laboratory"],
        &[
            device("Temperature Sensor 01", DeviceCategory::Sensor, "Main Office", 15.5),
            device("Central Air Conditioning", DeviceCategory::Actuator, "Main Office", 2500.0),
            device("Main Server", DeviceCategory::General, "Server Room", 800.0),
            device("Server Room UPS", DeviceCategory::General, "Server Room", 1200.0),
            device("Digital Microscope", DeviceCategory::General, "Laboratory", 150.0),
        ],
    ),
    (
        GREENENERGY,
        &["Solar Plant", "Control Center"],
        &[
            device("Solar Panel A1", DeviceCategory::Sensor, "Solar Plant", 300.0),
            device("Solar Panel A2", DeviceCategory::Sensor, "Solar Plant", 300.0),
            device("Main Inverter", DeviceCategory::Actuator, "Solar Plant", 50.0),
            device("Central Monitor", DeviceCategory::General, "Control Center", 120.0),
        ],
    ),
];

/// What a `seed-data` run created.
#[derive(Debug, Default)]
pub struct SeedDataReport {
    pub zones_created: usize,
    pub devices_created: usize,
    pub measurements_created: usize,
    pub alerts_raised: usize,
}

impl fmt::Display for SeedDataReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "* Zones created: {}", self.zones_created)?;
        writeln!(f, "* Devices created: {}", self.devices_created)?;
        writeln!(f, "* Readings created: {}", self.measurements_created)?;
        writeln!(f, "* Alerts raised: {}", self.alerts_raised)
    }
}

/// Populate the seeded organizations.
///
/// Zones and devices are matched by name, so re-running adds nothing that
/// already exists. Readings are only generated for devices created by this
/// run, one per day going back `days` days.
pub async fn run(pool: &DbPool, days: u32) -> anyhow::Result<SeedDataReport> {
    let mut report = SeedDataReport::default();
    let mut new_devices: Vec<DbId> = Vec::new();

    for (org_name, zones, devices) in INVENTORY {
        let Some(org) = OrganizationRepo::find_by_name(pool, org_name).await? else {
            bail!("organization '{org_name}' not found; run `ecoenergy seed-users` first");
        };

        let mut zone_ids = Vec::with_capacity(zones.len());
        for zone_name in zones {
            let (zone, created) = ZoneRepo::get_or_create(pool, zone_name, org.id)
                .await
                .with_context(|| format!("failed to create zone '{zone_name}'"))?;
            if created {
                report.zones_created += 1;
            }
            zone_ids.push((*zone_name, zone.id));
        }

        for seed in devices {
            let Some(&(_, zone_id)) = zone_ids.iter().find(|(name, _)| *name == seed.zone) else {
                bail!("device '{}' references unknown zone '{}'", seed.name, seed.zone);
            };
            if DeviceRepo::find_by_name_in_zone(pool, zone_id, seed.name)
                .await?
                .is_some()
            {
                continue;
            }
            let created = DeviceRepo::create(
                pool,
                &CreateDevice {
                    name: seed.name.to_string(),
                    category: seed.category,
                    zone_id,
                    watts: seed.watts,
                },
            )
            .await
            .with_context(|| format!("failed to create device '{}'", seed.name))?;
            report.devices_created += 1;
            new_devices.push(created.id);
        }
    }

    let now = Utc::now();
    for device_id in new_devices {
        for day in 0..days {
            let input = CreateMeasurement {
                device_id,
                consumption_kwh: random_consumption(),
                recorded_at: Some(now - Duration::days(i64::from(day))),
            };
            let (_, alert) = MeasurementRepo::record(pool, &input).await?;
            report.measurements_created += 1;
            if alert.is_some() {
                report.alerts_raised += 1;
            }
        }
    }

    tracing::info!(
        zones = report.zones_created,
        devices = report.devices_created,
        measurements = report.measurements_created,
        alerts = report.alerts_raised,
        "Demo data seeded",
    );
    Ok(report)
}

/// A reading in `[MIN_KWH, MAX_KWH]`, rounded to two decimals.
fn random_consumption() -> f64 {
    let raw = rand::rng().random_range(MIN_KWH..=MAX_KWH);
    (raw * 100.0).round() / 100.0
}
