#![no_main]

use hxui_runtime::controllers::progress::parse_percent;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw: &str| {
    let percent = parse_percent(Some(raw));
    assert!(percent <= 100);
    if let Ok(n) = raw.trim_start().parse::<i64>() {
        assert_eq!(i64::from(percent), n.clamp(0, 100));
    }
});
