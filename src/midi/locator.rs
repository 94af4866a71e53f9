use tracing::debug;

use crate::midi::model::{MidiDevice, MidiTransport};

/// Resolves `name` to the first input-capable device whose display name is
/// exactly `name`. Enumeration stops at the first index without device info.
pub fn locate(transport: &dyn MidiTransport, name: &str) -> Option<MidiDevice> {
    let count = transport.count_devices();
    debug!("Scanning {count} MIDI devices for '{name}'");

    for index in 0..count {
        let device = transport.device_info(index)?;
        if device.name == name && device.supports_input {
            debug!("Found '{}' at index {}", device.name, device.index);
            return Some(device);
        }
    }
    None
}

/// Every device the transport exposes, in enumeration order.
pub fn list_devices(transport: &dyn MidiTransport) -> Vec<MidiDevice> {
    (0..transport.count_devices())
        .map_while(|index| transport.device_info(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::controller::stubs::ScriptedTransport;

    fn device(name: &str, supports_input: bool) -> MidiDevice {
        MidiDevice {
            index: 0,
            name: name.to_string(),
            supports_input,
        }
    }

    #[test]
    fn finds_first_matching_input() {
        let transport = ScriptedTransport::new(vec![
            Some(device("Midi Through", true)),
            Some(device("MIX5R Pro ", true)),
            Some(device("MIX5R Pro ", true)),
        ]);

        let found = locate(&transport, "MIX5R Pro ").unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn skips_output_only_device_with_matching_name() {
        let transport = ScriptedTransport::new(vec![
            Some(device("MIX5R Pro ", false)),
            Some(device("MIX5R Pro ", true)),
        ]);

        assert_eq!(locate(&transport, "MIX5R Pro ").map(|d| d.index), Some(1));
    }

    #[test]
    fn output_only_match_is_never_selected() {
        let transport = ScriptedTransport::new(vec![Some(device("MIX5R Pro ", false))]);

        assert!(locate(&transport, "MIX5R Pro ").is_none());
    }

    #[test]
    fn name_match_is_exact() {
        let transport = ScriptedTransport::new(vec![
            Some(device("MIX5R Pro", true)),
            Some(device("mix5r pro ", true)),
            Some(device("MIX5R Pro  ", true)),
        ]);

        assert!(locate(&transport, "MIX5R Pro ").is_none());
    }

    #[test]
    fn missing_info_aborts_the_scan() {
        let transport = ScriptedTransport::new(vec![
            Some(device("Midi Through", true)),
            None,
            Some(device("MIX5R Pro ", true)),
        ]);

        assert!(locate(&transport, "MIX5R Pro ").is_none());
        assert_eq!(list_devices(&transport).len(), 1);
    }

    #[test]
    fn empty_enumeration_is_not_found() {
        let transport = ScriptedTransport::new(Vec::new());

        assert!(locate(&transport, "MIX5R Pro ").is_none());
        assert!(list_devices(&transport).is_empty());
    }
}
