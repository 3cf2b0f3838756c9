#![no_main]

use hxui_core::cookie::read_cookie;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (&str, &str)| {
    let (jar, name) = input;
    if let Some(value) = read_cookie(jar, name) {
        // A decoded value never grows past its encoded form.
        assert!(value.len() <= jar.len());
    }
});
