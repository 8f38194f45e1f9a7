// ── Status transition detection ──
//
// The previous device snapshot is kept only to notice devices coming back
// online between two refreshes.

use std::collections::HashMap;

use crate::model::{Device, DeviceId, DeviceStatus};

/// Devices in `current` that were offline in `previous` and are online now.
///
/// Devices absent from `previous` never count, so a first load is silent.
/// `previous` is whatever snapshot was cached last. Right after a company
/// switch that is the old company's list, so only ids present in both lists
/// can produce a transition.
pub fn came_online<'a>(previous: &[Device], current: &'a [Device]) -> Vec<&'a Device> {
    let before: HashMap<&DeviceId, DeviceStatus> =
        previous.iter().map(|d| (&d.id, d.status)).collect();

    current
        .iter()
        .filter(|d| d.is_online() && before.get(&d.id) == Some(&DeviceStatus::Offline))
        .collect()
}

/// Toast text for a device that came back online.
pub fn online_message(device: &Device) -> String {
    format!("{} is now online", device.display_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, status: DeviceStatus) -> Device {
        Device {
            id: DeviceId::new(id),
            name: format!("Sensor {id}"),
            status,
            last_read_at: None,
        }
    }

    #[test]
    fn offline_to_online_is_reported_once() {
        let previous = vec![device("1", DeviceStatus::Offline)];
        let current = vec![device("1", DeviceStatus::Online)];

        let changed = came_online(&previous, &current);

        assert_eq!(changed.len(), 1);
        assert_eq!(online_message(changed[0]), "Sensor 1 is now online");
    }

    #[test]
    fn online_to_online_is_silent() {
        let previous = vec![device("1", DeviceStatus::Online)];
        let current = vec![device("1", DeviceStatus::Online)];
        assert!(came_online(&previous, &current).is_empty());
    }

    #[test]
    fn new_devices_are_silent() {
        let current = vec![device("9", DeviceStatus::Online)];
        assert!(came_online(&[], &current).is_empty());
    }

    #[test]
    fn going_offline_is_silent() {
        let previous = vec![device("1", DeviceStatus::Online)];
        let current = vec![device("1", DeviceStatus::Offline)];
        assert!(came_online(&previous, &current).is_empty());
    }
}
