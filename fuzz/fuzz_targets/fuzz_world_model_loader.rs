#![no_main]

use em5_lane_navigation::WorldModelSerializer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = WorldModelSerializer::deserialize_bytes(data);
});
