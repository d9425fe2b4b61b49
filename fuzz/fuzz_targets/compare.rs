#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    jcmp_fuzz::fuzz_compare(data);
});
