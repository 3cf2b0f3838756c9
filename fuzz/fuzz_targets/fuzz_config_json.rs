#![no_main]

use hxui_core::ControllerConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(config) = ControllerConfig::from_json_str(data) {
        assert_eq!(config.validate(), Ok(()));
    }
});
